//! Metadata extraction from published article pages.
//!
//! A single streaming pass collects the `<title>`, the description and
//! keywords meta tags, JSON-LD blocks, the visible category badge and the
//! visible body text. Missing pieces degrade to empty values and are
//! reported through [`Extraction::missing`] instead of failing the file.

use std::{cell::RefCell, rc::Rc};

use lol_html::{
    RewriteStrSettings, doc_text, element, html_content::TextType, rewrite_str, text,
};
use serde_json::Value;
use thiserror::Error;
use time::Date;

use crate::{
    application::classify::detect_category,
    domain::{
        articles::ArticleRecord,
        artwork::{gradient_for, icon_for},
        categories::CategoryId,
    },
    util::dates::parse_iso_date,
};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("file name `{0}` does not yield an article id")]
    InvalidFileName(String),
    #[error("failed to scan document: {message}")]
    Document { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Title,
    Description,
    DatePublished,
}

impl MissingField {
    pub fn as_str(self) -> &'static str {
        match self {
            MissingField::Title => "title",
            MissingField::Description => "description",
            MissingField::DatePublished => "datePublished",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Site-relative directory prepended to the file name to form `path`.
    pub posts_prefix: String,
    /// Date used when the page carries no parseable `datePublished`.
    pub fallback_date: Date,
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub record: ArticleRecord,
    pub missing: Vec<MissingField>,
    pub explicit_category: bool,
}

impl Extraction {
    pub fn is_degraded(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// Raw values collected from one document.
#[derive(Debug, Clone, Default)]
pub struct PageScan {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub json_ld: Vec<String>,
    pub category_label: Option<String>,
    pub body_text: String,
    in_title: bool,
}

impl PageScan {
    /// First `datePublished` found across the JSON-LD blocks.
    pub fn date_published(&self) -> Option<String> {
        self.json_ld.iter().find_map(|block| {
            match serde_json::from_str::<Value>(block) {
                Ok(value) => find_key(&value, "datePublished"),
                Err(_) => scan_quoted_field(block, "datePublished"),
            }
        })
    }
}

pub fn scan_page(html: &str) -> Result<PageScan, ExtractError> {
    let state = Rc::new(RefCell::new(PageScan::default()));

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("title", {
                    let state = Rc::clone(&state);
                    move |_| {
                        let mut state = state.borrow_mut();
                        if state.title.is_none() {
                            state.title = Some(String::new());
                            state.in_title = true;
                        }
                        Ok(())
                    }
                }),
                text!("title", {
                    let state = Rc::clone(&state);
                    move |chunk| {
                        let mut state = state.borrow_mut();
                        if state.in_title {
                            if let Some(title) = state.title.as_mut() {
                                title.push_str(chunk.as_str());
                            }
                            if chunk.last_in_text_node() {
                                state.in_title = false;
                            }
                        }
                        Ok(())
                    }
                }),
                element!("meta[name]", {
                    let state = Rc::clone(&state);
                    move |el| {
                        let name = el.get_attribute("name").unwrap_or_default();
                        let content = el.get_attribute("content").unwrap_or_default();
                        let mut state = state.borrow_mut();
                        match name.to_ascii_lowercase().as_str() {
                            "description" if state.description.is_none() => {
                                state.description = Some(content);
                            }
                            "keywords" if state.keywords.is_none() => {
                                state.keywords = Some(content);
                            }
                            _ => {}
                        }
                        Ok(())
                    }
                }),
                element!(r#"script[type="application/ld+json"]"#, {
                    let state = Rc::clone(&state);
                    move |_| {
                        state.borrow_mut().json_ld.push(String::new());
                        Ok(())
                    }
                }),
                text!(r#"script[type="application/ld+json"]"#, {
                    let state = Rc::clone(&state);
                    move |chunk| {
                        if let Some(block) = state.borrow_mut().json_ld.last_mut() {
                            block.push_str(chunk.as_str());
                        }
                        Ok(())
                    }
                }),
                element!(".article__category", {
                    let state = Rc::clone(&state);
                    move |_| {
                        let mut state = state.borrow_mut();
                        if state.category_label.is_none() {
                            state.category_label = Some(String::new());
                        }
                        Ok(())
                    }
                }),
                text!(".article__category", {
                    let state = Rc::clone(&state);
                    move |chunk| {
                        if let Some(label) = state.borrow_mut().category_label.as_mut() {
                            label.push_str(chunk.as_str());
                        }
                        Ok(())
                    }
                }),
            ],
            document_content_handlers: vec![doc_text!({
                let state = Rc::clone(&state);
                move |chunk| {
                    if matches!(chunk.text_type(), TextType::Data) {
                        let mut state = state.borrow_mut();
                        state.body_text.push_str(chunk.as_str());
                        if chunk.last_in_text_node() {
                            state.body_text.push(' ');
                        }
                    }
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| ExtractError::Document {
        message: err.to_string(),
    })?;

    let scan = Rc::try_unwrap(state)
        .map(|cell| cell.into_inner())
        .unwrap_or_else(|rc| rc.borrow().clone());
    Ok(scan)
}

/// Build the store record for one article page.
pub fn extract(
    html: &str,
    file_name: &str,
    options: &ExtractOptions,
) -> Result<Extraction, ExtractError> {
    let id = file_name
        .strip_suffix(".html")
        .unwrap_or(file_name)
        .trim()
        .to_string();
    if id.is_empty() {
        return Err(ExtractError::InvalidFileName(file_name.to_string()));
    }

    let scan = scan_page(html)?;
    let mut missing = Vec::new();

    let title = match scan.title.as_deref() {
        Some(raw) => article_title(raw),
        None => String::new(),
    };
    if title.is_empty() {
        missing.push(MissingField::Title);
    }

    let excerpt = scan.description.as_deref().unwrap_or("").trim().to_string();
    if excerpt.is_empty() {
        missing.push(MissingField::Description);
    }

    let date = match scan.date_published().as_deref().and_then(parse_iso_date) {
        Some(date) => date,
        None => {
            missing.push(MissingField::DatePublished);
            options.fallback_date
        }
    };

    let explicit = scan
        .category_label
        .as_deref()
        .and_then(CategoryId::from_label);
    let category = explicit.unwrap_or_else(|| {
        detect_category(
            &scan.keywords.as_deref().unwrap_or("").to_lowercase(),
            &title,
            &scan.body_text,
        )
    });

    let prefix = options.posts_prefix.trim_end_matches('/');
    let path = if prefix.is_empty() {
        file_name.to_string()
    } else {
        format!("{prefix}/{file_name}")
    };

    let record = ArticleRecord {
        id,
        title,
        category,
        category_label: category.label().to_string(),
        date,
        excerpt,
        path,
        featured: true,
        svg_gradient: Some(gradient_for(category)),
        svg_icon: Some(icon_for(category)),
    };

    Ok(Extraction {
        record,
        missing,
        explicit_category: explicit.is_some(),
    })
}

/// Title text before the first `|`, or the whole text when there is none.
pub fn article_title(raw: &str) -> String {
    raw.split('|').next().unwrap_or(raw).trim().to_string()
}

fn find_key(value: &Value, key: &str) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(found)) = map.get(key) {
                return Some(found.clone());
            }
            map.values().find_map(|nested| find_key(nested, key))
        }
        Value::Array(items) => items.iter().find_map(|item| find_key(item, key)),
        _ => None,
    }
}

/// Fallback for JSON-LD that does not parse: `"key": "value"`.
fn scan_quoted_field(text: &str, key: &str) -> Option<String> {
    let needle = format!("\"{key}\"");
    let start = text.find(&needle)? + needle.len();
    let rest = text[start..].trim_start().strip_prefix(':')?.trim_start();
    let rest = rest.strip_prefix('"')?;
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn options() -> ExtractOptions {
        ExtractOptions {
            posts_prefix: "blog/posts".to_string(),
            fallback_date: date!(2030 - 01 - 01),
        }
    }

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="ja">
<head>
<title>SEO内部対策の基本 | 余日（ヨジツ）</title>
<meta name="description" content="  内部対策のチェックリスト。 ">
<meta name="keywords" content="SEO,内部対策">
<script type="application/ld+json">
{"@context":"https://schema.org","@type":"BlogPosting","datePublished":"2025-01-22T09:00:00+09:00"}
</script>
<script>var google = "ignored";</script>
</head>
<body><article class="article"><div class="article__content"><p>本文です。</p></div></article></body>
</html>"#;

    #[test]
    fn extracts_complete_record() {
        let extraction = extract(PAGE, "seo-basics.html", &options()).expect("extract");
        let record = extraction.record;
        assert_eq!(record.id, "seo-basics");
        assert_eq!(record.title, "SEO内部対策の基本");
        assert_eq!(record.excerpt, "内部対策のチェックリスト。");
        assert_eq!(record.date, date!(2025 - 01 - 22));
        assert_eq!(record.category, CategoryId::Seo);
        assert_eq!(record.category_label, "SEO");
        assert_eq!(record.path, "blog/posts/seo-basics.html");
        assert!(record.featured);
        assert_eq!(record.svg_gradient.expect("gradient").id, "seo-gradient");
        assert!(extraction.missing.is_empty());
        assert!(!extraction.explicit_category);
    }

    #[test]
    fn missing_fields_degrade_and_are_reported() {
        let extraction =
            extract("<html><body><p>雑感</p></body></html>", "note.html", &options())
                .expect("extract");
        assert_eq!(extraction.record.title, "");
        assert_eq!(extraction.record.excerpt, "");
        assert_eq!(extraction.record.date, date!(2030 - 01 - 01));
        assert_eq!(extraction.record.category, CategoryId::Misc);
        assert_eq!(
            extraction.missing,
            [
                MissingField::Title,
                MissingField::Description,
                MissingField::DatePublished
            ]
        );
        assert!(extraction.is_degraded());
    }

    #[test]
    fn title_without_delimiter_is_used_whole() {
        assert_eq!(article_title("  広告運用入門 "), "広告運用入門");
        assert_eq!(article_title("A | B | C"), "A");
    }

    #[test]
    fn visible_category_badge_takes_precedence() {
        let html = r#"<html><head><title>Google検索の話 | 余日</title></head>
<body><span class="article__category">AI</span><p>本文</p></body></html>"#;
        let extraction = extract(html, "x.html", &options()).expect("extract");
        assert_eq!(extraction.record.category, CategoryId::Ai);
        assert!(extraction.explicit_category);
    }

    #[test]
    fn script_text_is_not_body_text() {
        let scan = scan_page(PAGE).expect("scan");
        assert!(scan.body_text.contains("本文です。"));
        assert!(!scan.body_text.contains("ignored"));
        assert!(!scan.body_text.contains("余日"));
    }

    #[test]
    fn malformed_json_ld_still_yields_date() {
        let html = r#"<head><script type="application/ld+json">{"datePublished": "2024-11-02", broken</script></head>"#;
        let scan = scan_page(html).expect("scan");
        assert_eq!(scan.date_published().as_deref(), Some("2024-11-02"));
    }

    #[test]
    fn empty_file_name_is_rejected() {
        assert!(matches!(
            extract("<p></p>", ".html", &options()),
            Err(ExtractError::InvalidFileName(_))
        ));
    }
}
