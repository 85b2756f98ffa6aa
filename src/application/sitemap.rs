//! Sitemap generation for the public site.
//!
//! The document is a pure projection of the article store plus a fixed set of
//! static, category and legal pages. The only time-dependent input is
//! `today`, which callers inject.

use std::fmt::Write as _;

use thiserror::Error;
use time::{Date, macros::date};
use url::Url;

use crate::{
    domain::{articles::ArticleStore, categories::CategoryId},
    util::{dates::format_iso_date, xml::escape_xml},
};

#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("invalid base url `{url}`: {reason}")]
    BaseUrl { url: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Daily,
    Weekly,
    Monthly,
}

impl ChangeFreq {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub path: String,
    pub lastmod: Date,
    pub changefreq: ChangeFreq,
    /// Priority as written, e.g. `"0.8"`.
    pub priority: &'static str,
}

const LEGAL_PAGES: [&str; 3] = ["/privacy-policy.html", "/tokushoho.html", "/disclaimer.html"];
const LEGAL_LASTMOD: Date = date!(2025 - 01 - 01);

const FEATURED_PRIORITY: &str = "0.8";
const REGULAR_PRIORITY: &str = "0.7";

/// Every sitemap entry in output order: static pages, category pages,
/// articles (store order), legal pages.
pub fn sitemap_entries(store: &ArticleStore, today: Date) -> Vec<SitemapEntry> {
    let mut entries = vec![
        SitemapEntry {
            path: "/".to_string(),
            lastmod: today,
            changefreq: ChangeFreq::Weekly,
            priority: "1.0",
        },
        SitemapEntry {
            path: "/blog/index.html".to_string(),
            lastmod: today,
            changefreq: ChangeFreq::Daily,
            priority: "0.9",
        },
    ];

    entries.extend(CategoryId::ALL.into_iter().map(|id| SitemapEntry {
        path: format!("/blog/categories/{}.html", id.as_str()),
        lastmod: store.latest_in_category(id).unwrap_or(today),
        changefreq: ChangeFreq::Weekly,
        priority: "0.8",
    }));

    entries.extend(store.articles.iter().map(|article| SitemapEntry {
        path: format!("/{}", article.path.trim_start_matches('/')),
        lastmod: article.date,
        changefreq: ChangeFreq::Monthly,
        priority: if article.featured {
            FEATURED_PRIORITY
        } else {
            REGULAR_PRIORITY
        },
    }));

    entries.extend(LEGAL_PAGES.into_iter().map(|path| SitemapEntry {
        path: path.to_string(),
        lastmod: LEGAL_LASTMOD,
        changefreq: ChangeFreq::Monthly,
        priority: "0.3",
    }));

    entries
}

/// Render `sitemap.xml` for `base_url`.
pub fn generate_sitemap(
    store: &ArticleStore,
    base_url: &str,
    today: Date,
) -> Result<String, SitemapError> {
    let base = normalize_public_site_url(base_url)?;

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in sitemap_entries(store, today) {
        xml.push_str(&sitemap_entry(&base, &entry));
    }
    xml.push_str("</urlset>\n");
    Ok(xml)
}

/// Validate `url` and strip any trailing slash so paths can be appended.
fn normalize_public_site_url(url: &str) -> Result<String, SitemapError> {
    let parsed = Url::parse(url.trim()).map_err(|err| SitemapError::BaseUrl {
        url: url.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SitemapError::BaseUrl {
            url: url.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }
    Ok(url.trim().trim_end_matches('/').to_string())
}

fn sitemap_entry(base: &str, entry: &SitemapEntry) -> String {
    let mut out = String::from("  <url>\n");
    let _ = writeln!(out, "    <loc>{}</loc>", escape_xml(&format!("{base}{}", entry.path)));
    let _ = writeln!(out, "    <lastmod>{}</lastmod>", format_iso_date(entry.lastmod));
    let _ = writeln!(out, "    <changefreq>{}</changefreq>", entry.changefreq.as_str());
    let _ = writeln!(out, "    <priority>{}</priority>", entry.priority);
    out.push_str("  </url>\n");
    out
}
