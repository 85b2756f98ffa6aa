//! Article records and the store aggregate persisted as `articles.json`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::Date;

use super::{
    artwork::{SvgGradient, SvgIcon},
    categories::{CategoryDef, CategoryId, catalogue},
    error::DomainError,
};
use crate::util::dates;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub id: String,
    pub title: String,
    pub category: CategoryId,
    pub category_label: String,
    #[serde(with = "dates::iso_date")]
    pub date: Date,
    pub excerpt: String,
    pub path: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg_gradient: Option<SvgGradient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg_icon: Option<SvgIcon>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleStore {
    pub articles: Vec<ArticleRecord>,
    pub categories: Vec<CategoryDef>,
}

impl ArticleStore {
    /// Assemble a store over the closed catalogue, newest article first.
    ///
    /// The sort is stable, so articles sharing a date keep the order in which
    /// they were supplied.
    pub fn new(mut articles: Vec<ArticleRecord>) -> Self {
        articles.sort_by(|a, b| b.date.cmp(&a.date));
        Self {
            articles,
            categories: catalogue().to_vec(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::with_capacity(self.articles.len());
        for article in &self.articles {
            if article.id.trim().is_empty() {
                return Err(DomainError::EmptyArticleId {
                    path: article.path.clone(),
                });
            }
            if !seen.insert(article.id.as_str()) {
                return Err(DomainError::DuplicateArticleId {
                    id: article.id.clone(),
                });
            }
        }

        let declared: Vec<CategoryId> = self.categories.iter().map(|def| def.id).collect();
        if declared != CategoryId::ALL {
            return Err(DomainError::CatalogueMismatch);
        }

        if let Some(pair) = self.articles.windows(2).find(|pair| pair[0].date < pair[1].date) {
            return Err(DomainError::OutOfOrder {
                first: pair[0].id.clone(),
                first_date: pair[0].date,
                second: pair[1].id.clone(),
                second_date: pair[1].date,
            });
        }

        Ok(())
    }

    pub fn find(&self, id: &str) -> Option<&ArticleRecord> {
        self.articles.iter().find(|article| article.id == id)
    }

    pub fn category(&self, id: CategoryId) -> Result<&CategoryDef, DomainError> {
        self.categories
            .iter()
            .find(|def| def.id == id)
            .ok_or(DomainError::UndeclaredCategory(id))
    }

    pub fn count_by_category(&self, id: CategoryId) -> usize {
        self.articles
            .iter()
            .filter(|article| article.category == id)
            .count()
    }

    /// Newest article date within a category, if it has any articles.
    pub fn latest_in_category(&self, id: CategoryId) -> Option<Date> {
        self.articles
            .iter()
            .filter(|article| article.category == id)
            .map(|article| article.date)
            .max()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn record(id: &str, date: Date, category: CategoryId) -> ArticleRecord {
        ArticleRecord {
            id: id.to_string(),
            title: format!("Title {id}"),
            category,
            category_label: category.label().to_string(),
            date,
            excerpt: format!("Excerpt {id}"),
            path: format!("blog/posts/{id}.html"),
            featured: true,
            svg_gradient: None,
            svg_icon: None,
        }
    }
}
