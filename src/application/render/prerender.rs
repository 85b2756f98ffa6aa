//! Static prerendering of the sections the blog fills from the article
//! store: related articles and tables of contents on article pages, card
//! grids, category tabs and counts on listing pages.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use lol_html::{RewriteStrSettings, element, html_content::ContentType, rewrite_str};
use metrics::counter;
use tracing::{info, warn};

use super::{
    RenderError,
    augment::{AugmentStats, augment},
    cards::{
        render_blog_cards, render_category_cards, render_category_tabs, render_mobile_toc,
        render_sidebar_toc,
    },
    loader::{ArticleLoader, LoaderError},
    routes::PageKind,
    toc::TableOfContents,
    views::{CategoryFilter, HOME_LIMIT, by_category, category_pills, latest, related},
};
use crate::{
    application::{error::AppError, extract::scan_page},
    domain::{articles::ArticleStore, categories::CategoryId},
    infra::{
        error::InfraError,
        fs::{file_name, list_html_files},
        telemetry::{FILES_CHANGED, FILES_PROCESSED},
    },
};

/// Category assumed for an article that is neither in the store nor carries
/// a category badge.
const DEFAULT_ARTICLE_CATEGORY: CategoryId = CategoryId::Marketing;

#[derive(Debug, Clone)]
pub struct PrerenderOptions {
    pub related_limit: usize,
    pub load_timeout: Duration,
    /// Links under this URL are treated as internal.
    pub public_url: String,
    pub base_href: String,
    /// Posts directory relative to the site root, such as `blog/posts`.
    pub posts_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HiddenReason {
    NoCandidates,
    Unavailable(LoaderError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelatedSection {
    Rendered { count: usize },
    Hidden(HiddenReason),
}

#[derive(Debug, Clone)]
pub struct PrerenderOutcome {
    pub html: String,
    pub kind: PageKind,
    /// Set for article pages only.
    pub related: Option<RelatedSection>,
    pub toc_entries: usize,
    /// `false` when a listing page was left as is because the store was
    /// unavailable.
    pub store_used: bool,
    pub stats: AugmentStats,
}

/// Prerender one page served at `site_path` (for example
/// `blog/posts/seo-basics.html`).
pub async fn prerender_page(
    html: &str,
    site_path: &str,
    loader: &ArticleLoader,
    options: &PrerenderOptions,
) -> Result<PrerenderOutcome, RenderError> {
    let kind = PageKind::from_path(
        &format!("/{}", site_path.trim_start_matches('/')),
        &options.base_href,
        &options.posts_prefix,
    );

    let (html, related, toc_entries, store_used) = match &kind {
        PageKind::Article(id) => {
            let (html, related, toc_entries) = prerender_article(html, id, loader, options).await?;
            let used = matches!(related, RelatedSection::Rendered { .. })
                || related == RelatedSection::Hidden(HiddenReason::NoCandidates);
            (html, Some(related), toc_entries, used)
        }
        PageKind::Home | PageKind::Index | PageKind::Category(_) => {
            match loader.load_within(options.load_timeout).await {
                Ok(store) => (fill_listing(html, &kind, &store)?, None, 0, true),
                Err(err) => {
                    warn!(
                        target = "yojitsu::prerender",
                        page = site_path,
                        error = %err,
                        "Listing left unrendered"
                    );
                    (html.to_string(), None, 0, false)
                }
            }
        }
        PageKind::Other => (html.to_string(), None, 0, false),
    };

    let augmented = augment(&html, &options.public_url)?;
    Ok(PrerenderOutcome {
        html: augmented.html,
        kind,
        related,
        toc_entries,
        store_used,
        stats: augmented.stats,
    })
}

async fn prerender_article(
    html: &str,
    id: &str,
    loader: &ArticleLoader,
    options: &PrerenderOptions,
) -> Result<(String, RelatedSection, usize), RenderError> {
    let toc = TableOfContents::build(html)?;
    let badge = scan_page(html)
        .map_err(|err| RenderError::Document {
            message: err.to_string(),
        })?
        .category_label
        .as_deref()
        .and_then(CategoryId::from_label);

    let (related_cards, section) = match loader.load_within(options.load_timeout).await {
        Ok(store) => {
            let category = badge
                .or_else(|| store.find(id).map(|article| article.category))
                .unwrap_or(DEFAULT_ARTICLE_CATEGORY);
            let picks = related(&store, id, category, options.related_limit);
            if picks.is_empty() {
                (Some(String::new()), RelatedSection::Hidden(HiddenReason::NoCandidates))
            } else {
                let count = picks.len();
                (
                    Some(render_blog_cards(picks, false)?),
                    RelatedSection::Rendered { count },
                )
            }
        }
        Err(err) => (None, RelatedSection::Hidden(HiddenReason::Unavailable(err))),
    };

    let (sidebar, mobile) = if toc.is_empty() {
        (None, None)
    } else {
        (
            Some(render_sidebar_toc(&toc.entries)?),
            Some(render_mobile_toc(&toc.entries)?),
        )
    };

    let hide_related = matches!(section, RelatedSection::Hidden(_));
    let filled = fill_article(
        &toc.html,
        ArticleFill {
            related_cards,
            hide_related,
            sidebar,
            mobile,
        },
    )?;

    Ok((filled, section, toc.entries.len()))
}

struct ArticleFill {
    related_cards: Option<String>,
    hide_related: bool,
    sidebar: Option<String>,
    mobile: Option<String>,
}

fn fill_article(html: &str, fill: ArticleFill) -> Result<String, RenderError> {
    let ArticleFill {
        related_cards,
        hide_related,
        sidebar,
        mobile,
    } = fill;

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("#relatedArticles", move |el| {
                    if let Some(cards) = &related_cards {
                        el.set_inner_content(cards, ContentType::Html);
                    }
                    Ok(())
                }),
                element!(".related-posts, .article__related", move |el| {
                    if hide_related {
                        el.set_attribute("hidden", "")?;
                    } else {
                        el.remove_attribute("hidden");
                    }
                    Ok(())
                }),
                element!("#sidebarToc", move |el| {
                    if let Some(sidebar) = &sidebar {
                        el.set_inner_content(sidebar, ContentType::Html);
                    }
                    Ok(())
                }),
                element!("#mobileTocList", move |el| {
                    if let Some(mobile) = &mobile {
                        el.set_inner_content(mobile, ContentType::Html);
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| RenderError::Document {
        message: err.to_string(),
    })
}

fn fill_listing(html: &str, kind: &PageKind, store: &ArticleStore) -> Result<String, RenderError> {
    let mut replacements: Vec<(&'static str, String, ContentType)> = Vec::new();

    match kind {
        PageKind::Index => {
            replacements.push((
                ".blog-list__grid",
                render_blog_cards(latest(store, None), true)?,
                ContentType::Html,
            ));
            replacements.push((
                ".category-list__grid",
                render_category_cards(store)?,
                ContentType::Html,
            ));
            replacements.push((
                ".page-header__count",
                format!("全{}件の記事", store.articles.len()),
                ContentType::Text,
            ));
        }
        PageKind::Category(id) => {
            replacements.push((
                ".blog-list__grid",
                render_blog_cards(by_category(store, CategoryFilter::Only(*id)), false)?,
                ContentType::Html,
            ));
            if let Ok(def) = store.category(*id) {
                replacements.push((".category-header__title", def.label.clone(), ContentType::Text));
                replacements.push((
                    ".category-header__description",
                    def.description.clone(),
                    ContentType::Text,
                ));
            }
        }
        PageKind::Home => {
            replacements.push((
                ".blog-grid",
                render_blog_cards(latest(store, Some(HOME_LIMIT)), true)?,
                ContentType::Html,
            ));
            replacements.push((
                ".blog-categories",
                render_category_tabs(&category_pills(store, CategoryFilter::All, true))?,
                ContentType::Html,
            ));
        }
        PageKind::Article(_) | PageKind::Other => return Ok(html.to_string()),
    }

    let handlers = replacements
        .into_iter()
        .map(|(selector, content, content_type)| {
            element!(selector, move |el| {
                el.set_inner_content(&content, content_type);
                Ok(())
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
    .map_err(|err| RenderError::Document {
        message: err.to_string(),
    })
}

#[derive(Debug, Clone, Default)]
pub struct PrerenderReport {
    pub rendered: usize,
    pub related_hidden: usize,
    pub failures: Vec<(String, String)>,
}

/// Prerender every article page in `posts_dir` plus the top page, blog index
/// and category pages found under `site_root`, writing each result to the
/// same relative path under `output_dir`.
pub async fn prerender_site(
    site_root: &Path,
    posts_dir: &Path,
    output_dir: &Path,
    loader: &ArticleLoader,
    options: &PrerenderOptions,
) -> Result<PrerenderReport, AppError> {
    let mut pages = listing_pages(site_root)?;
    let posts_prefix = options.posts_prefix.trim_matches('/');
    for path in list_html_files(posts_dir)? {
        let Some(name) = file_name(&path) else {
            continue;
        };
        let site_path = if posts_prefix.is_empty() {
            name.to_string()
        } else {
            format!("{posts_prefix}/{name}")
        };
        pages.push((site_path, path.clone()));
    }

    let mut report = PrerenderReport::default();
    for (site_path, source) in pages {
        counter!(FILES_PROCESSED).increment(1);
        match prerender_file(&source, &site_path, output_dir, loader, options).await {
            Ok(outcome) => {
                report.rendered += 1;
                counter!(FILES_CHANGED).increment(1);
                if matches!(outcome.related, Some(RelatedSection::Hidden(_))) {
                    report.related_hidden += 1;
                }
                info!(
                    target = "yojitsu::prerender",
                    page = %site_path,
                    kind = ?outcome.kind,
                    related = ?outcome.related,
                    toc = outcome.toc_entries,
                    external_links = outcome.stats.external_links,
                    "Prerendered page"
                );
            }
            Err(err) => {
                warn!(target = "yojitsu::prerender", page = %site_path, error = %err, "Skipping page");
                report.failures.push((site_path, err.to_string()));
            }
        }
    }

    Ok(report)
}

async fn prerender_file(
    source: &Path,
    site_path: &str,
    output_dir: &Path,
    loader: &ArticleLoader,
    options: &PrerenderOptions,
) -> Result<PrerenderOutcome, AppError> {
    let html = tokio::fs::read_to_string(source)
        .await
        .map_err(InfraError::from)?;
    let outcome = prerender_page(&html, site_path, loader, options).await?;

    let target = output_dir.join(site_path);
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(InfraError::from)?;
    }
    tokio::fs::write(&target, &outcome.html)
        .await
        .map_err(InfraError::from)?;
    Ok(outcome)
}

/// Listing pages that exist under `site_root`, as `(site path, file)` pairs.
fn listing_pages(site_root: &Path) -> Result<Vec<(String, PathBuf)>, AppError> {
    let mut pages = Vec::new();
    for site_path in ["index.html", "blog/index.html"] {
        let path = site_root.join(site_path);
        if path.is_file() {
            pages.push((site_path.to_string(), path));
        }
    }

    let categories = site_root.join("blog").join("categories");
    if categories.is_dir() {
        for path in list_html_files(&categories)? {
            if let Some(name) = file_name(&path) {
                pages.push((format!("blog/categories/{name}"), path.clone()));
            }
        }
    }
    Ok(pages)
}
