//! Pure projections of the article store used by every rendered page.

use std::{fmt, str::FromStr};

use crate::domain::{
    articles::{ArticleRecord, ArticleStore},
    categories::CategoryId,
    error::DomainError,
};

/// Number of cards on the home page.
pub const HOME_LIMIT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Only(CategoryId),
}

impl CategoryFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(id) => id.as_str(),
        }
    }

    pub fn matches(self, category: CategoryId) -> bool {
        match self {
            Self::All => true,
            Self::Only(id) => id == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryFilter {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == "all" {
            Ok(Self::All)
        } else {
            value.parse().map(Self::Only)
        }
    }
}

/// Articles newest first, optionally truncated.
pub fn latest(store: &ArticleStore, limit: Option<usize>) -> Vec<&ArticleRecord> {
    let mut articles: Vec<&ArticleRecord> = store.articles.iter().collect();
    articles.sort_by(|a, b| b.date.cmp(&a.date));
    if let Some(limit) = limit {
        articles.truncate(limit);
    }
    articles
}

pub fn by_category(store: &ArticleStore, filter: CategoryFilter) -> Vec<&ArticleRecord> {
    latest(store, None)
        .into_iter()
        .filter(|article| filter.matches(article.category))
        .collect()
}

pub fn count(store: &ArticleStore, filter: CategoryFilter) -> usize {
    store
        .articles
        .iter()
        .filter(|article| filter.matches(article.category))
        .count()
}

/// Up to `limit` articles for the article `current_id`.
///
/// Same-category articles come first, then the remaining articles backfill
/// the list. Both pools keep recency order and the current article is never
/// included.
pub fn related<'a>(
    store: &'a ArticleStore,
    current_id: &str,
    category: CategoryId,
    limit: usize,
) -> Vec<&'a ArticleRecord> {
    let candidates: Vec<&ArticleRecord> = latest(store, None)
        .into_iter()
        .filter(|article| article.id != current_id)
        .collect();

    let (same, others): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|article| article.category == category);

    same.into_iter().chain(others).take(limit).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPill {
    pub filter: CategoryFilter,
    pub label: String,
    pub count: usize,
    pub is_active: bool,
}

/// The "all" pill followed by one pill per category in catalogue order.
/// With `omit_empty`, categories without articles get no pill.
pub fn category_pills(
    store: &ArticleStore,
    active: CategoryFilter,
    omit_empty: bool,
) -> Vec<CategoryPill> {
    let mut pills = vec![CategoryPill {
        filter: CategoryFilter::All,
        label: "すべて".to_string(),
        count: count(store, CategoryFilter::All),
        is_active: active == CategoryFilter::All,
    }];

    for def in &store.categories {
        let filter = CategoryFilter::Only(def.id);
        let count = count(store, filter);
        if omit_empty && count == 0 {
            continue;
        }
        pills.push(CategoryPill {
            filter,
            label: def.label.clone(),
            count,
            is_active: active == filter,
        });
    }

    pills
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCard {
    pub id: String,
    /// `None` for cards rendered without a category attribute; a specific
    /// category filter hides them.
    pub category: Option<CategoryId>,
    pub visible: bool,
}

/// Already-rendered cards and the current category filter. Filtering only
/// toggles visibility; the card list itself never changes.
#[derive(Debug, Clone)]
pub struct CardGrid {
    cards: Vec<GridCard>,
    active: CategoryFilter,
}

impl CardGrid {
    pub fn new<'a>(articles: impl IntoIterator<Item = &'a ArticleRecord>, filterable: bool) -> Self {
        let cards = articles
            .into_iter()
            .map(|article| GridCard {
                id: article.id.clone(),
                category: filterable.then_some(article.category),
                visible: true,
            })
            .collect();
        Self {
            cards,
            active: CategoryFilter::All,
        }
    }

    pub fn filter(&mut self, filter: CategoryFilter) {
        self.active = filter;
        for card in &mut self.cards {
            card.visible = match (filter, card.category) {
                (CategoryFilter::All, _) => true,
                (CategoryFilter::Only(id), Some(category)) => id == category,
                (CategoryFilter::Only(_), None) => false,
            };
        }
    }

    pub fn active(&self) -> CategoryFilter {
        self.active
    }

    pub fn cards(&self) -> &[GridCard] {
        &self.cards
    }

    pub fn visible_ids(&self) -> Vec<&str> {
        self.cards
            .iter()
            .filter(|card| card.visible)
            .map(|card| card.id.as_str())
            .collect()
    }
}
