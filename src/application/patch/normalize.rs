//! Rewrites that repair existing markup rather than add missing blocks.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeSet,
    rc::Rc,
};

use lol_html::{RewriteStrSettings, element, html_content::ContentType, rewrite_str};

use super::{PatchError, catalog::RELATED_FRAGMENT, contains};

#[derive(Default)]
struct BaseScan {
    base_count: usize,
    first_head_child: Option<(String, Option<String>)>,
}

/// Ensure exactly one `<base href>` exists and that it is the first child of
/// `<head>`. Documents already in that shape are returned unchanged; a
/// document without `<head>` is returned unchanged as well.
pub fn normalize_base_tag(html: &str, href: &str) -> Result<String, PatchError> {
    let scan = Rc::new(RefCell::new(BaseScan::default()));
    let has_head = Rc::new(Cell::new(false));

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("base", {
                    let scan = Rc::clone(&scan);
                    move |_| {
                        scan.borrow_mut().base_count += 1;
                        Ok(())
                    }
                }),
                element!("head", {
                    let has_head = Rc::clone(&has_head);
                    move |_| {
                        has_head.set(true);
                        Ok(())
                    }
                }),
                element!("head > *", {
                    let scan = Rc::clone(&scan);
                    move |el| {
                        let mut scan = scan.borrow_mut();
                        if scan.first_head_child.is_none() {
                            scan.first_head_child = Some((el.tag_name(), el.get_attribute("href")));
                        }
                        Ok(())
                    }
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(PatchError::document)?;

    if !has_head.get() {
        return Ok(html.to_string());
    }

    let scan = scan.borrow();
    let well_formed = scan.base_count == 1
        && matches!(
            &scan.first_head_child,
            Some((tag, Some(existing))) if tag == "base" && existing == href
        );
    if well_formed {
        return Ok(html.to_string());
    }

    let tag = format!("\n    <base href=\"{href}\">");
    let inserted = Rc::new(Cell::new(false));

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("base", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("head", {
                    let inserted = Rc::clone(&inserted);
                    let tag = tag.clone();
                    move |el| {
                        if !inserted.get() {
                            inserted.set(true);
                            el.prepend(&tag, ContentType::Html);
                        }
                        Ok(())
                    }
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(PatchError::document)
}

/// Replace a related-posts aside that still carries hand-written cards with
/// the empty placeholder the renderer fills.
pub fn replace_static_related(html: &str) -> Result<String, PatchError> {
    if !contains(html, ".related-posts .blog-card")? {
        return Ok(html.to_string());
    }

    let replaced = Rc::new(Cell::new(false));
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!(".related-posts", {
                let replaced = Rc::clone(&replaced);
                move |el| {
                    if !replaced.get() {
                        replaced.set(true);
                        el.replace(RELATED_FRAGMENT.trim_start(), ContentType::Html);
                    }
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(PatchError::document)
}

/// Inline style declarations that have a stylesheet class equivalent.
const STYLE_CLASSES: &[(&str, &str)] = &[
    (
        "background: #fdf2f8; padding: 1.5rem; border-radius: 8px; border-left: 4px solid #EC4899; margin: 1.5rem 0;",
        "highlight-box highlight-box--pink",
    ),
    (
        "background: #ecfdf5; padding: 1.5rem; border-radius: 8px; margin: 1.5rem 0;",
        "highlight-box highlight-box--green",
    ),
    (
        "background: #f8f8f8; padding: 1.5rem; border-radius: 8px; border-left: 4px solid #8B7355; margin: 1.5rem 0;",
        "highlight-box highlight-box--gray",
    ),
    (
        "background: #f8f8f8; padding: 1.5rem; border-radius: 8px; margin: 1.5rem 0;",
        "info-box",
    ),
    (
        "background: #FFF3CD; padding: 1.5rem; border-radius: 8px; border-left: 4px solid #FFC107; margin: 1.5rem 0;",
        "warning-box",
    ),
    (
        "background: #E8F5E9; padding: 1.5rem; border-radius: 8px; margin: 1.5rem 0;",
        "success-box",
    ),
    (
        "background: #f0f7ff; padding: 1.5rem; border-radius: 8px; border-left: 4px solid #2196F3; margin-top: 2rem;",
        "reference-box",
    ),
    ("margin-top: 0;", "margin-top-0"),
    ("margin-bottom: 0;", "margin-bottom-0"),
    ("margin: 0; padding-left: 1.5rem;", "list-no-margin"),
    ("color: #666;", "text-gray"),
    ("font-size: 0.9rem;", "text-small"),
    ("margin-left: 1.5rem;", "margin-left-1"),
    ("font-weight: 500;", "font-weight-500"),
];

/// Icon tint styles that are dropped outright.
fn is_icon_tint(style: &str) -> bool {
    let style = style.trim();
    style.starts_with("color: #") && style.ends_with("; margin-right: 0.5rem;")
}

fn merge_class(existing: Option<String>, added: &str) -> String {
    let mut seen = BTreeSet::new();
    let mut tokens = Vec::new();
    for token in existing
        .as_deref()
        .unwrap_or_default()
        .split_whitespace()
        .chain(added.split_whitespace())
    {
        if seen.insert(token) {
            tokens.push(token);
        }
    }
    tokens.join(" ")
}

/// Move known inline `style` declarations into class names.
pub fn normalize_inline_styles(html: &str) -> Result<String, PatchError> {
    let changed = Rc::new(Cell::new(false));
    let rewritten = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("[style]", {
                let changed = Rc::clone(&changed);
                move |el| {
                    let Some(style) = el.get_attribute("style") else {
                        return Ok(());
                    };
                    let trimmed = style.trim();
                    if let Some((_, class)) =
                        STYLE_CLASSES.iter().find(|(declared, _)| *declared == trimmed)
                    {
                        let merged = merge_class(el.get_attribute("class"), class);
                        el.remove_attribute("style");
                        el.set_attribute("class", &merged)?;
                        changed.set(true);
                    } else if is_icon_tint(trimmed) {
                        el.remove_attribute("style");
                        changed.set(true);
                    }
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(PatchError::document)?;

    if changed.get() {
        Ok(rewritten)
    } else {
        Ok(html.to_string())
    }
}
