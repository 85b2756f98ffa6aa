//! Read-only verification that an article page carries every required block.

use std::{cell::RefCell, fs, path::Path, rc::Rc};

use lol_html::{RewriteStrSettings, element, rewrite_str};
use metrics::counter;
use tracing::{info, warn};

use super::{
    error::AppError,
    patch::{PatchError, catalog::REQUIRED_SCRIPTS},
};
use crate::infra::{
    fs::{file_name, list_html_files},
    telemetry::{FILES_PROCESSED, STRUCTURE_VIOLATIONS},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub name: &'static str,
    pub selector: &'static str,
}

const fn req(name: &'static str, selector: &'static str) -> Requirement {
    Requirement { name, selector }
}

pub const REQUIREMENTS: [Requirement; 20] = [
    req("Breadcrumb", "nav.breadcrumb"),
    req("Article Container", "article.article"),
    req("Article Main", "div.article__main"),
    req("Article Header", "header.article__header"),
    req("Article Meta", "div.article__meta"),
    req("Article Title (H1)", "h1.article__title"),
    req("Article Excerpt", "p.article__excerpt"),
    req("Featured Image", "div.article__featured-image"),
    req("Table of Contents", "nav.article__toc"),
    req("Article Content", "div.article__content"),
    req("Share Buttons", "div.article__share"),
    req("Related Posts", "aside.related-posts"),
    req("Sidebar TOC", "aside.article__sidebar"),
    req("Floating TOC Button", "button.floating-toc-btn"),
    req("Mobile TOC Modal", "div.mobile-toc-modal"),
    req("Footer", "footer.footer"),
    req("Scripts (blog-loader.js)", REQUIRED_SCRIPTS[0].marker),
    req("Scripts (main.js)", REQUIRED_SCRIPTS[1].marker),
    req("Scripts (blog.js)", REQUIRED_SCRIPTS[2].marker),
    req("Scripts (article-template.js)", REQUIRED_SCRIPTS[3].marker),
];

/// Requirements the document does not satisfy, in declaration order.
pub fn check_structure(html: &str) -> Result<Vec<Requirement>, PatchError> {
    let found = Rc::new(RefCell::new([false; REQUIREMENTS.len()]));

    let handlers = REQUIREMENTS
        .iter()
        .enumerate()
        .map(|(index, requirement)| {
            element!(requirement.selector, {
                let found = Rc::clone(&found);
                move |_| {
                    found.borrow_mut()[index] = true;
                    Ok(())
                }
            })
        })
        .collect();

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::default()
        },
    )
    .map_err(PatchError::document)?;

    let found = *found.borrow();
    Ok(REQUIREMENTS
        .iter()
        .zip(found)
        .filter(|(_, present)| !present)
        .map(|(requirement, _)| *requirement)
        .collect())
}

#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub checked: usize,
    /// Files with at least one missing block, with the blocks' names.
    pub incomplete: Vec<(String, Vec<&'static str>)>,
    pub failures: Vec<(String, String)>,
}

impl CheckReport {
    pub fn violations(&self) -> usize {
        self.incomplete.iter().map(|(_, missing)| missing.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.incomplete.is_empty() && self.failures.is_empty()
    }
}

/// Check every page in `posts_dir` without modifying anything.
pub fn check_posts(posts_dir: &Path) -> Result<CheckReport, AppError> {
    let mut report = CheckReport::default();

    for path in list_html_files(posts_dir)? {
        let Some(name) = file_name(&path) else {
            continue;
        };
        counter!(FILES_PROCESSED).increment(1);
        report.checked += 1;

        let missing = match fs::read_to_string(&path)
            .map_err(|err| err.to_string())
            .and_then(|html| check_structure(&html).map_err(|err| err.to_string()))
        {
            Ok(missing) => missing,
            Err(reason) => {
                warn!(target = "yojitsu::check", file = name, error = %reason, "Skipping file");
                report.failures.push((name.to_string(), reason));
                continue;
            }
        };

        if missing.is_empty() {
            info!(target = "yojitsu::check", file = name, "All required blocks present");
            continue;
        }

        counter!(STRUCTURE_VIOLATIONS).increment(missing.len() as u64);
        let names: Vec<&'static str> = missing.iter().map(|requirement| requirement.name).collect();
        warn!(target = "yojitsu::check", file = name, missing = ?names, "Required blocks missing");
        report.incomplete.push((name.to_string(), names));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_misses_everything() {
        let missing = check_structure("<html><body></body></html>").expect("check");
        assert_eq!(missing.len(), REQUIREMENTS.len());
        assert_eq!(missing[0].name, "Breadcrumb");
    }

    #[test]
    fn reports_only_absent_blocks() {
        let html = r#"<nav class="breadcrumb"></nav><article class="article"><div class="article__main"></div></article>
<footer class="footer"></footer><script src="src/js/main.js"></script>"#;
        let missing: Vec<_> = check_structure(html)
            .expect("check")
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert!(!missing.contains(&"Breadcrumb"));
        assert!(!missing.contains(&"Footer"));
        assert!(!missing.contains(&"Scripts (main.js)"));
        assert!(missing.contains(&"Scripts (blog.js)"));
        assert_eq!(missing.len(), REQUIREMENTS.len() - 5);
    }

    #[test]
    fn batch_check_counts_violations_per_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("a.html"), "<html><body></body></html>").expect("write");
        fs::write(dir.path().join("b.html"), r#"<nav class="breadcrumb"></nav>"#).expect("write");

        let report = check_posts(dir.path()).expect("check");
        assert_eq!(report.checked, 2);
        assert_eq!(report.incomplete.len(), 2);
        assert_eq!(report.violations(), REQUIREMENTS.len() * 2 - 1);
        assert!(!report.is_clean());
    }
}
