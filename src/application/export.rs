//! WordPress eXtended RSS (WXR 1.2) export of the article store.
//!
//! Item metadata comes from the store; the body of each item is the
//! `.article__content` block of the article's page, cleaned for import
//! into other blogging platforms.

use std::{
    cell::Cell,
    fmt::Write as _,
    fs,
    path::Path,
    rc::Rc,
};

use lol_html::{RewriteStrSettings, element, html_content::ContentType, rewrite_str};
use thiserror::Error;
use time::{
    Date, OffsetDateTime, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc2822, macros::format_description,
};
use tracing::{debug, warn};
use url::Url;

use crate::{
    application::extract::scan_page,
    domain::articles::{ArticleRecord, ArticleStore},
    util::xml::escape_xml,
};

const POST_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

const CONTENT_START: &str = "<!--yojitsu:export-start-->";
const CONTENT_END: &str = "<!--yojitsu:export-end-->";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid public url `{url}`: {reason}")]
    PublicUrl { url: String, reason: String },
    #[error("failed to format date: {0}")]
    Date(String),
}

/// Channel-level metadata of the export.
#[derive(Debug, Clone)]
pub struct ExportSite {
    pub public_url: Url,
    pub title: String,
    pub description: String,
    pub author_login: String,
    pub author_email: String,
    pub author_name: String,
}

impl ExportSite {
    /// Site metadata with the blog's usual channel header.
    pub fn new(public_url: &str) -> Result<Self, ExportError> {
        let mut normalized = public_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let public_url = Url::parse(&normalized).map_err(|err| ExportError::PublicUrl {
            url: public_url.to_string(),
            reason: err.to_string(),
        })?;
        Ok(Self {
            public_url,
            title: "余日（ヨジツ）ブログ".to_string(),
            description: "Webマーケティングの本質に向き合うブログ".to_string(),
            author_login: "yojitsu".to_string(),
            author_email: "info@yojitsu.com".to_string(),
            author_name: "余日編集部".to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct WxrExport {
    pub xml: String,
    pub items: usize,
    /// Articles exported without a body because their page could not be read.
    pub without_content: Vec<String>,
}

struct ItemBody {
    content: String,
    tags: Vec<String>,
}

/// Build the WXR document for every article in store order.
pub fn export_wxr(
    store: &ArticleStore,
    posts_dir: &Path,
    site: &ExportSite,
    now: OffsetDateTime,
) -> Result<WxrExport, ExportError> {
    let mut xml = channel_header(site, now)?;

    for (index, category) in store.categories.iter().enumerate() {
        let _ = write!(
            xml,
            "    <wp:category>\n        <wp:term_id>{}</wp:term_id>\n        <wp:category_nicename>{}</wp:category_nicename>\n        <wp:category_parent></wp:category_parent>\n        <wp:cat_name>{}</wp:cat_name>\n    </wp:category>\n",
            index + 1,
            category.id.as_str(),
            cdata(&category.label),
        );
    }

    let mut without_content = Vec::new();
    for (index, article) in store.articles.iter().enumerate() {
        let body = match read_item_body(article, posts_dir, &site.public_url) {
            Some(body) => body,
            None => {
                without_content.push(article.id.clone());
                ItemBody {
                    content: String::new(),
                    tags: Vec::new(),
                }
            }
        };
        xml.push_str(&item(article, index + 1, &body, site)?);
    }

    xml.push_str("</channel>\n</rss>\n");
    Ok(WxrExport {
        xml,
        items: store.articles.len(),
        without_content,
    })
}

fn channel_header(site: &ExportSite, now: OffsetDateTime) -> Result<String, ExportError> {
    let pub_date = now
        .format(&Rfc2822)
        .map_err(|err| ExportError::Date(err.to_string()))?;
    let base = site.public_url.as_str();
    Ok(format!(
        r#"<?xml version="1.0" encoding="UTF-8" ?>
<rss version="2.0"
    xmlns:excerpt="http://wordpress.org/export/1.2/excerpt/"
    xmlns:content="http://purl.org/rss/1.0/modules/content/"
    xmlns:wfw="http://wellformedweb.org/CommentAPI/"
    xmlns:dc="http://purl.org/dc/elements/1.1/"
    xmlns:wp="http://wordpress.org/export/1.2/">
<channel>
    <title>{title}</title>
    <link>{base}</link>
    <description>{description}</description>
    <pubDate>{pub_date}</pubDate>
    <language>ja</language>
    <wp:wxr_version>1.2</wp:wxr_version>
    <wp:base_site_url>{base}</wp:base_site_url>
    <wp:base_blog_url>{base}</wp:base_blog_url>
    <wp:author>
        <wp:author_id>1</wp:author_id>
        <wp:author_login>{login}</wp:author_login>
        <wp:author_email>{email}</wp:author_email>
        <wp:author_display_name>{name}</wp:author_display_name>
    </wp:author>
"#,
        title = escape_xml(&site.title),
        description = escape_xml(&site.description),
        login = escape_xml(&site.author_login),
        email = escape_xml(&site.author_email),
        name = cdata(&site.author_name),
    ))
}

fn item(
    article: &ArticleRecord,
    post_id: usize,
    body: &ItemBody,
    site: &ExportSite,
) -> Result<String, ExportError> {
    let public_url = &site.public_url;
    let published = publication_instant(article.date);
    let pub_date = published
        .format(&Rfc2822)
        .map_err(|err| ExportError::Date(err.to_string()))?;
    let post_date = published
        .format(POST_DATE)
        .map_err(|err| ExportError::Date(err.to_string()))?;
    let link = public_url
        .join(article.path.trim_start_matches('/'))
        .map(String::from)
        .unwrap_or_else(|_| format!("{public_url}{}", article.path));

    let mut out = String::from("    <item>\n");
    let _ = writeln!(out, "        <title>{}</title>", cdata(&article.title));
    let _ = writeln!(out, "        <link>{}</link>", escape_xml(&link));
    let _ = writeln!(out, "        <pubDate>{pub_date}</pubDate>");
    let _ = writeln!(out, "        <dc:creator>{}</dc:creator>", cdata(&site.author_name));
    let _ = writeln!(out, "        <guid isPermaLink=\"false\">{}</guid>", escape_xml(&link));
    let _ = writeln!(out, "        <description>{}</description>", cdata(&article.excerpt));
    let _ = writeln!(out, "        <content:encoded>{}</content:encoded>", cdata(&body.content));
    let _ = writeln!(out, "        <excerpt:encoded>{}</excerpt:encoded>", cdata(&article.excerpt));
    let _ = writeln!(out, "        <wp:post_id>{post_id}</wp:post_id>");
    let _ = writeln!(out, "        <wp:post_date>{post_date}</wp:post_date>");
    let _ = writeln!(out, "        <wp:post_date_gmt>{post_date}</wp:post_date_gmt>");
    let _ = writeln!(out, "        <wp:post_modified>{post_date}</wp:post_modified>");
    let _ = writeln!(out, "        <wp:post_modified_gmt>{post_date}</wp:post_modified_gmt>");
    out.push_str("        <wp:comment_status>open</wp:comment_status>\n");
    out.push_str("        <wp:ping_status>open</wp:ping_status>\n");
    let _ = writeln!(out, "        <wp:post_name>{}</wp:post_name>", escape_xml(&article.id));
    out.push_str("        <wp:status>publish</wp:status>\n");
    out.push_str("        <wp:post_parent>0</wp:post_parent>\n");
    out.push_str("        <wp:menu_order>0</wp:menu_order>\n");
    out.push_str("        <wp:post_type>post</wp:post_type>\n");
    out.push_str("        <wp:post_password></wp:post_password>\n");
    out.push_str("        <wp:is_sticky>0</wp:is_sticky>\n");
    let _ = writeln!(
        out,
        "        <category domain=\"category\" nicename=\"{}\">{}</category>",
        article.category.as_str(),
        cdata(&article.category_label),
    );
    for tag in &body.tags {
        let _ = writeln!(
            out,
            "        <category domain=\"post_tag\" nicename=\"{}\">{}</category>",
            escape_xml(&tag_nicename(tag)),
            cdata(tag),
        );
    }
    out.push_str("    </item>\n");
    Ok(out)
}

fn publication_instant(date: Date) -> OffsetDateTime {
    date.midnight().assume_utc()
}

/// Read the article's page; `None` when it cannot be read or its content
/// cannot be cleaned.
fn read_item_body(article: &ArticleRecord, posts_dir: &Path, public_url: &Url) -> Option<ItemBody> {
    let file = Path::new(&article.path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{}.html", article.id));
    let html = match fs::read_to_string(posts_dir.join(&file)) {
        Ok(html) => html,
        Err(err) => {
            warn!(
                target = "yojitsu::export",
                file = %file,
                error = %err,
                "Exporting article without content"
            );
            return None;
        }
    };

    let tags = match scan_page(&html) {
        Ok(scan) => scan
            .keywords
            .as_deref()
            .map(split_keywords)
            .unwrap_or_default(),
        Err(err) => {
            debug!(target = "yojitsu::export", file = %file, error = %err, "Keywords unavailable");
            Vec::new()
        }
    };

    let content = match article_content(&html, public_url) {
        Ok(content) => content.unwrap_or_default(),
        Err(message) => {
            warn!(
                target = "yojitsu::export",
                file = %file,
                error = %message,
                "Exporting article without content"
            );
            return None;
        }
    };

    Some(ItemBody { content, tags })
}

fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn tag_nicename(tag: &str) -> String {
    let slug = slug::slugify(tag);
    if slug.is_empty() {
        tag.to_lowercase()
    } else {
        slug
    }
}

/// Inner markup of the first `.article__content` block, cleaned for export.
///
/// Internal links become absolute under `public_url`; SVG artwork and Font
/// Awesome icons are dropped, as are decorative background and grid styles.
pub fn article_content(html: &str, public_url: &Url) -> Result<Option<String>, String> {
    let marked = Rc::new(Cell::new(false));

    let rewritten = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(".article__content", {
                    let marked = Rc::clone(&marked);
                    move |el| {
                        if !marked.get() {
                            marked.set(true);
                            el.prepend(CONTENT_START, ContentType::Html);
                            el.append(CONTENT_END, ContentType::Html);
                        }
                        Ok(())
                    }
                }),
                element!(".article__content svg", |el| {
                    el.remove();
                    Ok(())
                }),
                element!(r#".article__content i[class*="fa-"]"#, |el| {
                    el.remove();
                    Ok(())
                }),
                element!(".article__content [style]", |el| {
                    let decorative = el
                        .get_attribute("style")
                        .is_some_and(|style| is_decorative_style(&style));
                    if decorative {
                        el.remove_attribute("style");
                    }
                    Ok(())
                }),
                element!(".article__content a[href]", {
                    let public_url = public_url.clone();
                    move |el| {
                        let absolute = el
                            .get_attribute("href")
                            .and_then(|href| absolutize(&public_url, &href));
                        if let Some(absolute) = absolute {
                            el.set_attribute("href", &absolute)?;
                        }
                        Ok(())
                    }
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| err.to_string())?;

    let Some(start) = rewritten.find(CONTENT_START) else {
        return Ok(None);
    };
    let inner_start = start + CONTENT_START.len();
    let Some(end) = rewritten[inner_start..].find(CONTENT_END) else {
        return Ok(None);
    };

    Ok(Some(collapse_blank_lines(
        &rewritten[inner_start..inner_start + end],
    )))
}

fn is_decorative_style(style: &str) -> bool {
    let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
    compact.contains("background") || compact.contains("gradient") || compact.contains("display:grid")
}

/// Absolute form of a site-relative `href`; `None` when it is already
/// absolute or only a fragment.
fn absolutize(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || Url::parse(href).is_ok() {
        return None;
    }
    base.join(href.trim_start_matches('/')).ok().map(String::from)
}

fn collapse_blank_lines(content: &str) -> String {
    let mut out = Vec::new();
    let mut blank_run = 0;
    for line in content.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push(line);
    }
    out.join("\n").trim().to_string()
}

fn cdata(value: &str) -> String {
    format!("<![CDATA[{}]]>", value.replace("]]>", "]]]]><![CDATA[>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{articles::fixtures::record, categories::CategoryId};
    use tempfile::tempdir;
    use time::macros::{date, datetime};

    fn site() -> ExportSite {
        ExportSite::new("https://example.github.io/yojitsu-website").expect("site")
    }

    #[test]
    fn content_is_cleaned_for_import() {
        let html = r##"<body><div class="article__content">
<p><i class="fas fa-check"></i>要点</p>



<div style="background: #f8f8f8; padding: 1rem;"><a href="blog/posts/x.html">x</a></div>
<svg viewBox="0 0 10 10"><circle r="1"/></svg>
<a href="https://other.example/">ext</a> <a href="#top">top</a>
</div><p>outside</p></body>"##;
        let content = article_content(html, &site().public_url)
            .expect("clean")
            .expect("content");
        assert!(!content.contains("fa-check"));
        assert!(!content.contains("<svg"));
        assert!(!content.contains("background"));
        assert!(content.contains(
            r#"href="https://example.github.io/yojitsu-website/blog/posts/x.html""#
        ));
        assert!(content.contains(r#"href="https://other.example/""#));
        assert!(content.contains(r##"href="#top""##));
        assert!(!content.contains("outside"));
        assert!(!content.contains("\n\n\n"));
    }

    #[test]
    fn page_without_content_block_yields_none() {
        let content = article_content("<p>x</p>", &site().public_url).expect("clean");
        assert_eq!(content, None);
    }

    #[test]
    fn cdata_terminator_is_split() {
        assert_eq!(cdata("a]]>b"), "<![CDATA[a]]]]><![CDATA[>b]]>");
    }

    #[test]
    fn export_lists_categories_and_items() {
        let dir = tempdir().expect("tempdir");
        fs::write(
            dir.path().join("a.html"),
            r#"<head><meta name="keywords" content="SEO, 検索, "></head><body><div class="article__content"><p>本文</p></div></body>"#,
        )
        .expect("write");

        let store = ArticleStore::new(vec![
            record("a", date!(2025 - 01 - 01), CategoryId::Seo),
            record("b", date!(2025 - 01 - 05), CategoryId::Ads),
        ]);
        let export = export_wxr(
            &store,
            dir.path(),
            &site(),
            datetime!(2025-02-01 12:00 UTC),
        )
        .expect("export");

        assert_eq!(export.items, 2);
        assert_eq!(export.without_content, ["b"]);
        assert_eq!(export.xml.matches("<wp:category>").count(), 7);
        assert_eq!(export.xml.matches("<item>").count(), 2);
        assert!(export.xml.contains("<wp:post_date>2025-01-01 00:00:00</wp:post_date>"));
        assert!(export.xml.contains("<pubDate>Sat, 01 Feb 2025 12:00:00 +0000</pubDate>"));
        assert!(export.xml.contains(r#"<category domain="post_tag" nicename="seo"><![CDATA[SEO]]></category>"#));
        assert!(export.xml.contains("<content:encoded><![CDATA[<p>本文</p>]]></content:encoded>"));
        assert!(export.xml.ends_with("</channel>\n</rss>\n"));
    }

    #[test]
    fn unparseable_content_skips_only_that_article() {
        let dir = tempdir().expect("tempdir");
        fs::write(
            dir.path().join("a.html"),
            r#"<body><div class="article__content"><p>本文</p></div></body>"#,
        )
        .expect("write a");
        fs::write(
            dir.path().join("b.html"),
            r#"<body><div class="article__content"><select><script>x()</script></select></div></body>"#,
        )
        .expect("write b");

        let store = ArticleStore::new(vec![
            record("a", date!(2025 - 01 - 01), CategoryId::Seo),
            record("b", date!(2025 - 01 - 05), CategoryId::Ads),
        ]);
        let export = export_wxr(
            &store,
            dir.path(),
            &site(),
            datetime!(2025-02-01 12:00 UTC),
        )
        .expect("export continues past a broken page");

        assert_eq!(export.items, 2);
        assert_eq!(export.without_content, ["b"]);
        assert!(export.xml.contains("<content:encoded><![CDATA[<p>本文</p>]]></content:encoded>"));
    }
}
