//! Post-processing of rendered pages: lazy images and external links.

use std::{cell::RefCell, collections::BTreeSet, rc::Rc};

use lol_html::{RewriteStrSettings, element, rewrite_str};
use url::Url;

use super::RenderError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AugmentStats {
    pub lazy_images: usize,
    pub external_links: usize,
    /// Scheme and host of every external link target, sorted.
    pub link_domains: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct AugmentOutcome {
    pub html: String,
    pub stats: AugmentStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LinkKind {
    Internal,
    External { domain: Option<String> },
    Anchor,
    Other,
}

/// Mark card and content images for lazy loading and open external links
/// from article text in a new tab. Links under `public_url` count as
/// internal. Running the pass twice yields the same document.
pub fn augment(html: &str, public_url: &str) -> Result<AugmentOutcome, RenderError> {
    let public_prefix = public_url.trim_end_matches('/').to_string();
    let state = Rc::new(RefCell::new(AugmentStats::default()));

    let rewritten = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(".article__content img, .blog-card__image img", {
                    let state = Rc::clone(&state);
                    move |el| {
                        if let Some(deferred) = el.get_attribute("data-src") {
                            el.set_attribute("src", &deferred)?;
                            el.remove_attribute("data-src");
                        }
                        let mut touched = false;
                        if el.get_attribute("loading").is_none() {
                            el.set_attribute("loading", "lazy")?;
                            touched = true;
                        }
                        if el.get_attribute("decoding").is_none() {
                            el.set_attribute("decoding", "async")?;
                            touched = true;
                        }
                        if touched {
                            let mut state = state.borrow_mut();
                            state.lazy_images = state.lazy_images.saturating_add(1);
                        }
                        Ok(())
                    }
                }),
                element!(
                    ".article__content a[href], .blog-card__excerpt a[href], .article__excerpt a[href]",
                    {
                        let state = Rc::clone(&state);
                        let public_prefix = public_prefix.clone();
                        move |el| {
                            let Some(href) = el.get_attribute("href") else {
                                return Ok(());
                            };
                            let LinkKind::External { domain } = classify_link(&href, &public_prefix)
                            else {
                                return Ok(());
                            };
                            if el.get_attribute("data-external-processed").is_some() {
                                return Ok(());
                            }

                            el.set_attribute("target", "_blank")?;
                            let rel = merge_rel(el.get_attribute("rel"), &["noopener", "noreferrer"]);
                            el.set_attribute("rel", &rel)?;
                            el.set_attribute("data-external-processed", "true")?;

                            let mut state = state.borrow_mut();
                            state.external_links = state.external_links.saturating_add(1);
                            if let Some(domain) = domain {
                                state.link_domains.insert(domain);
                            }
                            Ok(())
                        }
                    }
                ),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| RenderError::Document {
        message: err.to_string(),
    })?;

    let stats = Rc::try_unwrap(state)
        .map(|cell| cell.into_inner())
        .unwrap_or_else(|rc| rc.borrow().clone());

    Ok(AugmentOutcome {
        html: rewritten,
        stats,
    })
}

fn classify_link(href: &str, public_prefix: &str) -> LinkKind {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return LinkKind::Anchor;
    }

    if is_external_http_url(href) {
        if !public_prefix.is_empty() && href.starts_with(public_prefix) {
            return LinkKind::Internal;
        }
        return LinkKind::External {
            domain: extract_domain(href),
        };
    }

    if is_internal_path(href) {
        return LinkKind::Internal;
    }

    LinkKind::Other
}

fn is_internal_path(href: &str) -> bool {
    href.starts_with('/')
        || href.starts_with("./")
        || href.starts_with("../")
        || (!href.contains(':') && !href.starts_with("//"))
}

fn is_external_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn extract_domain(url: &str) -> Option<String> {
    Url::parse(url).ok().and_then(|parsed| {
        parsed.host_str().map(|host| {
            let mut domain = format!("{}://{}", parsed.scheme(), host);
            if let Some(port) = parsed.port() {
                domain.push(':');
                domain.push_str(&port.to_string());
            }
            domain
        })
    })
}

fn merge_rel(existing: Option<String>, required: &[&str]) -> String {
    let mut tokens: BTreeSet<String> = existing
        .unwrap_or_default()
        .split_whitespace()
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
        .collect();
    for &token in required {
        tokens.insert(token.to_string());
    }
    tokens.into_iter().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = "https://yamada1001.github.io/yojitsu-website/";

    #[test]
    fn external_links_open_in_new_tab() {
        let html = r#"<div class="article__content"><a href="https://example.com/a" rel="nofollow">x</a><a href="https://yamada1001.github.io/yojitsu-website/blog/index.html">in</a><a href="blog/posts/a.html">rel</a></div><a href="https://example.com/nav">nav</a>"#;
        let outcome = augment(html, SITE).expect("augment");

        assert!(outcome.html.contains(
            r#"<a href="https://example.com/a" rel="nofollow noopener noreferrer" target="_blank" data-external-processed="true">x</a>"#
        ));
        assert!(outcome.html.contains(r#"<a href="https://example.com/nav">nav</a>"#));
        assert_eq!(outcome.html.matches("_blank").count(), 1);
        assert_eq!(outcome.stats.external_links, 1);
        assert_eq!(
            outcome.stats.link_domains.iter().collect::<Vec<_>>(),
            ["https://example.com"]
        );
    }

    #[test]
    fn images_are_lazy_and_deferred_sources_resolved() {
        let html = r#"<div class="blog-card__image"><img data-src="a.png" alt=""></div><img src="hero.png">"#;
        let outcome = augment(html, SITE).expect("augment");
        assert!(outcome.html.contains(
            r#"<img alt="" src="a.png" loading="lazy" decoding="async">"#
        ));
        assert!(outcome.html.contains(r#"<img src="hero.png">"#));
        assert_eq!(outcome.stats.lazy_images, 1);
    }

    #[test]
    fn augmenting_twice_is_a_no_op() {
        let html = r#"<div class="article__content"><img src="a.png"><a href="http://example.org">x</a></div>"#;
        let once = augment(html, SITE).expect("first");
        let twice = augment(&once.html, SITE).expect("second");
        assert_eq!(once.html, twice.html);
        assert_eq!(twice.stats, AugmentStats::default());
    }

    #[test]
    fn classifies_links() {
        let prefix = SITE.trim_end_matches('/');
        assert_eq!(classify_link("#top", prefix), LinkKind::Anchor);
        assert_eq!(classify_link("../index.html", prefix), LinkKind::Internal);
        assert_eq!(classify_link("mailto:info@yojitsu.com", prefix), LinkKind::Other);
        assert_eq!(
            classify_link("https://example.com:8443/x", prefix),
            LinkKind::External {
                domain: Some("https://example.com:8443".to_string())
            }
        );
    }
}
