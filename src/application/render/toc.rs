//! Table of contents derived from the article body, and the scroll spy that
//! keeps one entry active.

use std::{cell::RefCell, rc::Rc};

use lol_html::{RewriteStrSettings, element, rewrite_str, text};

use super::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    H2,
    H3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub anchor: String,
    pub label: String,
    pub level: HeadingLevel,
}

#[derive(Debug, Clone)]
pub struct TableOfContents {
    /// The document with an `id` on every collected heading.
    pub html: String,
    pub entries: Vec<TocEntry>,
}

#[derive(Default, Clone)]
struct Collector {
    entries: Vec<TocEntry>,
    raw_labels: Vec<String>,
}

impl TableOfContents {
    /// Collect `h2`/`h3` headings inside `.article__content`. Headings
    /// without an id get `section-<n>`, `n` being the heading's position in
    /// document order.
    pub fn build(html: &str) -> Result<Self, RenderError> {
        let state = Rc::new(RefCell::new(Collector::default()));

        let rewritten = rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: vec![
                    element!(".article__content h2, .article__content h3", {
                        let state = Rc::clone(&state);
                        move |el| {
                            let mut state = state.borrow_mut();
                            let index = state.entries.len();
                            let anchor = match el.get_attribute("id") {
                                Some(id) if !id.trim().is_empty() => id,
                                _ => {
                                    let id = format!("section-{index}");
                                    el.set_attribute("id", &id)?;
                                    id
                                }
                            };
                            let level = if el.tag_name() == "h3" {
                                HeadingLevel::H3
                            } else {
                                HeadingLevel::H2
                            };
                            state.entries.push(TocEntry {
                                anchor,
                                label: String::new(),
                                level,
                            });
                            state.raw_labels.push(String::new());
                            Ok(())
                        }
                    }),
                    text!(".article__content h2, .article__content h3", {
                        let state = Rc::clone(&state);
                        move |chunk| {
                            if let Some(label) = state.borrow_mut().raw_labels.last_mut() {
                                label.push_str(chunk.as_str());
                            }
                            Ok(())
                        }
                    }),
                ],
                ..RewriteStrSettings::default()
            },
        )
        .map_err(|err| RenderError::Document {
            message: err.to_string(),
        })?;

        let state = Rc::try_unwrap(state)
            .map(|cell| cell.into_inner())
            .unwrap_or_else(|rc| rc.borrow().clone());

        let entries = state
            .entries
            .into_iter()
            .zip(state.raw_labels)
            .map(|(entry, raw)| TocEntry {
                label: heading_label(&raw),
                ..entry
            })
            .collect();

        Ok(Self {
            html: rewritten,
            entries,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Visible heading text: entities decoded, whitespace collapsed and a
/// leading `1. ` style number removed.
pub fn heading_label(raw: &str) -> String {
    let decoded = decode_entities(raw);
    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    strip_number_prefix(&collapsed).to_string()
}

fn strip_number_prefix(label: &str) -> &str {
    let digits = label.len() - label.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return label;
    }
    match label[digits..].strip_prefix('.') {
        Some(rest) => rest.trim_start(),
        None => label,
    }
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Tracks which TOC entry is active while the page scrolls.
///
/// Scroll events only request an update; the computation runs once per
/// animation frame in [`ScrollSpy::on_frame`].
#[derive(Debug, Clone)]
pub struct ScrollSpy {
    offset: f64,
    frame_pending: bool,
    active: Option<usize>,
}

impl ScrollSpy {
    pub fn new(offset: f64) -> Self {
        Self {
            offset,
            frame_pending: false,
            active: None,
        }
    }

    /// Index of the last heading whose top is at or above `scroll_y + offset`.
    pub fn active_index(heading_tops: &[f64], scroll_y: f64, offset: f64) -> Option<usize> {
        let position = scroll_y + offset;
        heading_tops.iter().rposition(|top| *top <= position)
    }

    /// Record a scroll event. Returns `true` when a frame must be scheduled,
    /// `false` when one is already pending.
    pub fn request_tick(&mut self) -> bool {
        if self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        true
    }

    /// Run the pending update.
    pub fn on_frame(&mut self, heading_tops: &[f64], scroll_y: f64) -> Option<usize> {
        self.frame_pending = false;
        self.active = Self::active_index(heading_tops, scroll_y, self.offset);
        self.active
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }
}
