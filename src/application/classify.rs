//! Keyword-based category inference.
//!
//! Priority is explicit: rules carry a rank and are evaluated lowest rank
//! first, so a text matching several categories resolves to the rule with
//! the smallest rank. `misc` is never matched and serves as the fallback.

use crate::domain::categories::CategoryId;

#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub rank: u8,
    pub category: CategoryId,
    pub keywords: &'static [&'static str],
}

pub const CATEGORY_RULES: [CategoryRule; 6] = [
    CategoryRule {
        rank: 1,
        category: CategoryId::Seo,
        keywords: &["seo", "検索エンジン", "検索順位", "google", "ahrefs"],
    },
    CategoryRule {
        rank: 2,
        category: CategoryId::Ads,
        keywords: &["広告", "google ads", "meta広告", "リスティング", "ppc"],
    },
    CategoryRule {
        rank: 3,
        category: CategoryId::Sns,
        keywords: &["sns", "instagram", "facebook", "twitter", "x", "ソーシャル"],
    },
    CategoryRule {
        rank: 4,
        category: CategoryId::Marketing,
        keywords: &[
            "マーケティング",
            "webマーケ",
            "crm",
            "hubspot",
            "コンテンツマーケ",
            "プランナー",
            "pm",
        ],
    },
    CategoryRule {
        rank: 5,
        category: CategoryId::WebProduction,
        keywords: &["web制作", "ディレクター", "デザイン", "ui", "ux", "vitals"],
    },
    CategoryRule {
        rank: 6,
        category: CategoryId::Ai,
        keywords: &["ai", "chatgpt", "claude", "生成ai", "人工知能", "ターミナル"],
    },
];

pub fn detect_category(keywords: &str, title: &str, body: &str) -> CategoryId {
    detect_with(&CATEGORY_RULES, keywords, title, body)
}

/// Evaluate `rules` in ascending rank; the first keyword contained in the
/// lower-cased `keywords title body` text wins.
pub fn detect_with(rules: &[CategoryRule], keywords: &str, title: &str, body: &str) -> CategoryId {
    let haystack = format!("{keywords} {title} {body}").to_lowercase();

    let mut ordered: Vec<&CategoryRule> = rules.iter().collect();
    ordered.sort_by_key(|rule| rule.rank);

    ordered
        .into_iter()
        .find(|rule| rule.keywords.iter().any(|keyword| haystack.contains(keyword)))
        .map(|rule| rule.category)
        .unwrap_or(CategoryId::Misc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_misc() {
        assert_eq!(detect_category("", "日々の雑感", "今日は晴れ"), CategoryId::Misc);
    }

    #[test]
    fn earliest_rank_wins_on_overlap() {
        // Matches both seo ("google") and ads ("広告").
        assert_eq!(
            detect_category("google広告", "運用のコツ", ""),
            CategoryId::Seo
        );
        assert_eq!(detect_category("", "リスティング広告入門", ""), CategoryId::Ads);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(detect_category("", "ChatGPT活用術", ""), CategoryId::Ai);
        assert_eq!(detect_category("HubSpot", "", ""), CategoryId::Marketing);
    }

    #[test]
    fn rank_not_declaration_order_decides() {
        let rules = [
            CategoryRule {
                rank: 2,
                category: CategoryId::Seo,
                keywords: &["shared"],
            },
            CategoryRule {
                rank: 1,
                category: CategoryId::Ai,
                keywords: &["shared"],
            },
        ];
        assert_eq!(detect_with(&rules, "shared", "", ""), CategoryId::Ai);
    }

    #[test]
    fn detection_is_deterministic() {
        let first = detect_category("crm", "顧客管理", "本文");
        for _ in 0..10 {
            assert_eq!(detect_category("crm", "顧客管理", "本文"), first);
        }
    }
}
