//! The closed category catalogue.
//!
//! Categories are never created at runtime. Every id the pipeline accepts is
//! listed in [`CategoryId`], and the display metadata for each lives in
//! [`catalogue`].

use std::{fmt, str::FromStr};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryId {
    Ai,
    Seo,
    Ads,
    Sns,
    Marketing,
    WebProduction,
    Misc,
}

impl CategoryId {
    /// Display order used for the `categories` array and category pills.
    pub const ALL: [CategoryId; 7] = [
        CategoryId::Ai,
        CategoryId::Seo,
        CategoryId::Ads,
        CategoryId::Sns,
        CategoryId::Marketing,
        CategoryId::WebProduction,
        CategoryId::Misc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CategoryId::Ai => "ai",
            CategoryId::Seo => "seo",
            CategoryId::Ads => "ads",
            CategoryId::Sns => "sns",
            CategoryId::Marketing => "marketing",
            CategoryId::WebProduction => "web-production",
            CategoryId::Misc => "misc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryId::Ai => "AI",
            CategoryId::Seo => "SEO",
            CategoryId::Ads => "広告運用",
            CategoryId::Sns => "SNS",
            CategoryId::Marketing => "マーケティング",
            CategoryId::WebProduction => "Web制作",
            CategoryId::Misc => "雑記",
        }
    }

    /// Resolve the visible badge text of an article page back to its id.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|id| id.label() == label)
    }

    pub fn definition(self) -> &'static CategoryDef {
        let index = Self::ALL
            .iter()
            .position(|candidate| *candidate == self)
            .unwrap_or(Self::ALL.len() - 1);
        &CATALOGUE[index]
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryId {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == value)
            .ok_or_else(|| DomainError::UnknownCategory(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub id: CategoryId,
    pub label: String,
    pub description: String,
    pub color: String,
    pub icon: String,
}

static CATALOGUE: Lazy<Vec<CategoryDef>> = Lazy::new(|| {
    CategoryId::ALL
        .into_iter()
        .map(|id| {
            let (description, color, icon) = details(id);
            CategoryDef {
                id,
                label: id.label().to_string(),
                description: description.to_string(),
                color: color.to_string(),
                icon: icon.to_string(),
            }
        })
        .collect()
});

fn details(id: CategoryId) -> (&'static str, &'static str, &'static str) {
    match id {
        CategoryId::Ai => (
            "AI活用に関する記事をまとめています。ChatGPT、Claudeなどの生成AIツールの使い方、プロンプトエンジニアリング、AIを活用したコンテンツマーケティング、業務効率化など、実践的なテクニックを紹介します。",
            "#8B5CF6",
            "robot",
        ),
        CategoryId::Seo => (
            "検索エンジン最適化に関する記事をまとめています。最新のアルゴリズム対応、内部対策、外部対策、コンテンツSEOなど、実践的なSEO対策を解説します。",
            "#10B981",
            "search",
        ),
        CategoryId::Ads => (
            "Web広告運用に関する記事をまとめています。Google広告、Meta広告などの運用テクニック、費用対効果の最大化、広告戦略の立案方法を紹介します。",
            "#F59E0B",
            "bullhorn",
        ),
        CategoryId::Sns => (
            "SNSマーケティングに関する記事をまとめています。Instagram、X、FacebookなどのSNS運用テクニック、エンゲージメント向上施策、コンテンツ戦略を解説します。",
            "#06B6D4",
            "share-nodes",
        ),
        CategoryId::Marketing => (
            "デジタルマーケティング全般に関する記事をまとめています。戦略立案、データ分析、カスタマージャーニー設計など、実践的なマーケティング手法を紹介します。",
            "#EC4899",
            "chart-line",
        ),
        CategoryId::WebProduction => (
            "Webサイト制作に関する記事をまとめています。UI/UXデザイン、フロントエンド開発、サイト改善など、実践的なWeb制作のテクニックを解説します。",
            "#6366F1",
            "code",
        ),
        CategoryId::Misc => (
            "日々の気づきや考え、業界トレンドなど、様々なトピックを自由に綴っています。",
            "#8B7355",
            "pen",
        ),
    }
}

/// The full catalogue in display order.
pub fn catalogue() -> &'static [CategoryDef] {
    &CATALOGUE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_their_wire_spelling() {
        for id in CategoryId::ALL {
            assert_eq!(id.as_str().parse::<CategoryId>().expect("known id"), id);
            let json = serde_json::to_string(&id).expect("serialize");
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
    }

    #[test]
    fn legacy_web_spelling_is_rejected() {
        assert!("web".parse::<CategoryId>().is_err());
        assert!(serde_json::from_str::<CategoryId>("\"web\"").is_err());
    }

    #[test]
    fn catalogue_follows_display_order() {
        let ids: Vec<_> = catalogue().iter().map(|def| def.id).collect();
        assert_eq!(ids, CategoryId::ALL.to_vec());
        assert_eq!(CategoryId::WebProduction.definition().icon, "code");
        assert_eq!(CategoryId::Misc.definition().label, "雑記");
    }

    #[test]
    fn labels_resolve_back_to_ids() {
        assert_eq!(CategoryId::from_label(" 広告運用 "), Some(CategoryId::Ads));
        assert_eq!(CategoryId::from_label("Unknown"), None);
    }
}
