//! The `fix` batch: normalize and complete every article page in place.

use std::{fs, path::Path};

use metrics::counter;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    application::{
        error::AppError,
        extract::{article_title, scan_page},
        patch::{
            PatchError, Skipped, apply_rules,
            catalog::{PageContext, article_rules},
            normalize::{normalize_base_tag, normalize_inline_styles, replace_static_related},
        },
    },
    infra::{
        fs::{backup_directory, file_name, list_html_files, write_atomic},
        telemetry::{FILES_CHANGED, FILES_PROCESSED},
    },
    util::dates::backup_stamp,
};

#[derive(Debug, Clone)]
pub struct FixOptions {
    pub base_href: String,
    pub public_url: String,
    pub posts_prefix: String,
    pub dry_run: bool,
    /// Copy the posts directory here (under a timestamped folder) before
    /// writing anything.
    pub backup_dir: Option<std::path::PathBuf>,
}

#[derive(Debug, Clone)]
pub struct PageFix {
    pub html: String,
    pub changed: bool,
    pub applied: Vec<&'static str>,
    pub skipped: Vec<Skipped>,
}

#[derive(Debug, Clone, Default)]
pub struct FixReport {
    pub processed: usize,
    pub changed: Vec<String>,
    pub skipped: Vec<(String, Skipped)>,
    pub failures: Vec<(String, String)>,
    pub backup: Option<std::path::PathBuf>,
}

/// Run every fixer over one page: base tag, static related cards, inline
/// styles, then the canonical block rules.
pub fn fix_page(html: &str, ctx: &PageContext, base_href: &str) -> Result<PageFix, PatchError> {
    let normalized = normalize_base_tag(html, base_href)?;
    let normalized = replace_static_related(&normalized)?;
    let normalized = normalize_inline_styles(&normalized)?;
    let outcome = apply_rules(&normalized, &article_rules(ctx))?;

    Ok(PageFix {
        changed: outcome.html != html,
        html: outcome.html,
        applied: outcome.applied,
        skipped: outcome.skipped,
    })
}

pub fn page_context(html: &str, file: &str, options: &FixOptions) -> PageContext {
    let title = scan_page(html)
        .ok()
        .and_then(|scan| scan.title)
        .map(|raw| article_title(&raw))
        .unwrap_or_default();
    let prefix = options.posts_prefix.trim_matches('/');
    let page_url = if prefix.is_empty() {
        format!("{}/{file}", options.public_url.trim_end_matches('/'))
    } else {
        format!("{}/{prefix}/{file}", options.public_url.trim_end_matches('/'))
    };
    PageContext { page_url, title }
}

/// Fix every page in `posts_dir`. Files are written back only when their
/// content changed, and never in a dry run.
pub fn fix_posts(posts_dir: &Path, options: &FixOptions) -> Result<FixReport, AppError> {
    let files = list_html_files(posts_dir)?;
    let mut report = FixReport::default();

    if !options.dry_run
        && let Some(backup_root) = options.backup_dir.as_deref()
    {
        let stamp = backup_stamp(OffsetDateTime::now_utc());
        report.backup = Some(backup_directory(posts_dir, backup_root, &stamp)?);
    }

    for path in files {
        let Some(name) = file_name(&path) else {
            continue;
        };
        counter!(FILES_PROCESSED).increment(1);
        report.processed += 1;

        let html = match fs::read_to_string(&path) {
            Ok(html) => html,
            Err(err) => {
                warn!(target = "yojitsu::fix", file = name, error = %err, "Skipping unreadable file");
                report.failures.push((name.to_string(), err.to_string()));
                continue;
            }
        };

        let ctx = page_context(&html, name, options);
        let fixed = match fix_page(&html, &ctx, &options.base_href) {
            Ok(fixed) => fixed,
            Err(err) => {
                warn!(target = "yojitsu::fix", file = name, error = %err, "Skipping file");
                report.failures.push((name.to_string(), err.to_string()));
                continue;
            }
        };

        for skipped in &fixed.skipped {
            let Skipped::MissingAnchor { rule, anchor } = skipped;
            warn!(
                target = "yojitsu::fix",
                file = name,
                rule = *rule,
                anchor = *anchor,
                "Anchor missing, block not inserted"
            );
            report.skipped.push((name.to_string(), skipped.clone()));
        }

        if fixed.changed {
            if !options.dry_run {
                if let Err(err) = write_atomic(&path, &fixed.html) {
                    warn!(target = "yojitsu::fix", file = name, error = %err, "Failed to write file");
                    report.failures.push((name.to_string(), err.to_string()));
                    continue;
                }
                counter!(FILES_CHANGED).increment(1);
            }
            report.changed.push(name.to_string());
        }

        info!(
            target = "yojitsu::fix",
            file = name,
            changed = fixed.changed,
            applied = ?fixed.applied,
            dry_run = options.dry_run,
            "Processed article page"
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::structure::check_structure;
    use tempfile::tempdir;

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="ja">
<head>
    <base href="/">
    <title>SEOの基本 | 余日</title>
</head>
<body>
    <nav class="breadcrumb"></nav>
    <article class="article">
        <div class="article__container">
            <div class="article__main">
                <header class="article__header">
                    <div class="article__meta"></div>
                    <h1 class="article__title">SEOの基本</h1>
                    <p class="article__excerpt">概要</p>
                </header>
                <div class="article__featured-image"></div>
                <div class="article__content"><h2>はじめに</h2></div>
            </div>
        </div>
    </article>
</body>
</html>
"#;

    fn options() -> FixOptions {
        FixOptions {
            base_href: "/yojitsu-website/".to_string(),
            public_url: "https://yamada1001.github.io/yojitsu-website/".to_string(),
            posts_prefix: "blog/posts".to_string(),
            dry_run: false,
            backup_dir: None,
        }
    }

    #[test]
    fn context_links_back_to_the_page() {
        let ctx = page_context(PAGE, "seo-basics.html", &options());
        assert_eq!(
            ctx.page_url,
            "https://yamada1001.github.io/yojitsu-website/blog/posts/seo-basics.html"
        );
        assert_eq!(ctx.title, "SEOの基本");
    }

    #[test]
    fn fixing_is_idempotent() {
        let ctx = page_context(PAGE, "seo-basics.html", &options());
        let once = fix_page(PAGE, &ctx, "/yojitsu-website/").expect("first");
        assert!(once.changed);
        assert!(once.html.contains(r#"<base href="/yojitsu-website/">"#));
        assert!(!once.html.contains(r#"<base href="/">"#));

        let twice = fix_page(&once.html, &ctx, "/yojitsu-website/").expect("second");
        assert!(!twice.changed);
        assert!(twice.applied.is_empty());
        assert_eq!(once.html, twice.html);
    }

    #[test]
    fn fixed_page_passes_structure_check() {
        let ctx = page_context(PAGE, "seo-basics.html", &options());
        let fixed = fix_page(PAGE, &ctx, "/yojitsu-website/").expect("fix");
        let missing = check_structure(&fixed.html).expect("check");
        assert!(missing.is_empty(), "missing: {missing:?}");
    }

    #[test]
    fn dry_run_leaves_files_untouched() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("seo-basics.html");
        fs::write(&path, PAGE).expect("write");

        let report = fix_posts(
            dir.path(),
            &FixOptions {
                dry_run: true,
                ..options()
            },
        )
        .expect("fix");

        assert_eq!(report.changed, ["seo-basics.html"]);
        assert_eq!(fs::read_to_string(&path).expect("read"), PAGE);
        assert!(report.backup.is_none());
    }

    #[test]
    fn backup_precedes_writes() {
        let dir = tempdir().expect("tempdir");
        let posts = dir.path().join("posts");
        fs::create_dir(&posts).expect("mkdir");
        fs::write(posts.join("seo-basics.html"), PAGE).expect("write");

        let report = fix_posts(
            &posts,
            &FixOptions {
                backup_dir: Some(dir.path().join("backup")),
                ..options()
            },
        )
        .expect("fix");

        let backup = report.backup.expect("backup dir");
        assert_eq!(
            fs::read_to_string(backup.join("seo-basics.html")).expect("backup copy"),
            PAGE
        );
        assert_ne!(
            fs::read_to_string(posts.join("seo-basics.html")).expect("fixed"),
            PAGE
        );
    }
}
