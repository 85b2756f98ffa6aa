//! Declarative "ensure this block exists" rules for article pages.
//!
//! A [`PatchRule`] names a marker selector, a canonical fragment and an
//! insertion point. Applying a rule never touches a document that already
//! contains the marker, so re-running any rule set over its own output is a
//! byte-for-byte no-op.

pub mod catalog;
pub mod normalize;

use std::{borrow::Cow, cell::Cell, rc::Rc};

use lol_html::{RewriteStrSettings, element, html_content::ContentType, rewrite_str};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("failed to rewrite document: {message}")]
    Document { message: String },
}

impl PatchError {
    pub(crate) fn document(err: impl std::fmt::Display) -> Self {
        Self::Document {
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    /// Immediately before the anchor's start tag.
    Before,
    /// Immediately after the anchor's end tag.
    After,
    /// As the anchor's first child.
    Prepend,
    /// As the anchor's last child.
    Append,
}

#[derive(Debug, Clone)]
pub struct PatchRule {
    pub name: &'static str,
    pub marker: &'static str,
    pub anchor: &'static str,
    pub mode: InsertMode,
    pub fragment: Cow<'static, str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skipped {
    MissingAnchor { rule: &'static str, anchor: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    AlreadyPresent,
    Applied,
    Skipped(Skipped),
}

#[derive(Debug, Clone)]
pub struct PatchOutcome {
    pub html: String,
    pub applied: Vec<&'static str>,
    pub skipped: Vec<Skipped>,
}

impl PatchOutcome {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Count matches of `marker` and `anchor` in one pass.
fn locate(html: &str, marker: &str, anchor: &str) -> Result<(bool, bool), PatchError> {
    let marker_hits = Rc::new(Cell::new(0usize));
    let anchor_hits = Rc::new(Cell::new(0usize));

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(marker, {
                    let hits = Rc::clone(&marker_hits);
                    move |_| {
                        hits.set(hits.get() + 1);
                        Ok(())
                    }
                }),
                element!(anchor, {
                    let hits = Rc::clone(&anchor_hits);
                    move |_| {
                        hits.set(hits.get() + 1);
                        Ok(())
                    }
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(PatchError::document)?;

    Ok((marker_hits.get() > 0, anchor_hits.get() > 0))
}

/// Whether `html` contains at least one element matching `selector`.
pub fn contains(html: &str, selector: &str) -> Result<bool, PatchError> {
    locate(html, selector, selector).map(|(found, _)| found)
}

pub fn apply_rule(html: &str, rule: &PatchRule) -> Result<(String, RuleOutcome), PatchError> {
    let (has_marker, has_anchor) = locate(html, rule.marker, rule.anchor)?;
    if has_marker {
        return Ok((html.to_string(), RuleOutcome::AlreadyPresent));
    }
    if !has_anchor {
        return Ok((
            html.to_string(),
            RuleOutcome::Skipped(Skipped::MissingAnchor {
                rule: rule.name,
                anchor: rule.anchor,
            }),
        ));
    }

    let inserted = Rc::new(Cell::new(false));
    let fragment = rule.fragment.as_ref();
    let mode = rule.mode;

    let rewritten = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!(rule.anchor, {
                let inserted = Rc::clone(&inserted);
                move |el| {
                    if inserted.get() {
                        return Ok(());
                    }
                    inserted.set(true);
                    match mode {
                        InsertMode::Before => el.before(fragment, ContentType::Html),
                        InsertMode::After => el.after(fragment, ContentType::Html),
                        InsertMode::Prepend => el.prepend(fragment, ContentType::Html),
                        InsertMode::Append => el.append(fragment, ContentType::Html),
                    }
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(PatchError::document)?;

    Ok((rewritten, RuleOutcome::Applied))
}

/// Apply `rules` in order, each over the previous rule's output.
pub fn apply_rules(html: &str, rules: &[PatchRule]) -> Result<PatchOutcome, PatchError> {
    let mut current = html.to_string();
    let mut applied = Vec::new();
    let mut skipped = Vec::new();

    for rule in rules {
        let (next, outcome) = apply_rule(&current, rule)?;
        match outcome {
            RuleOutcome::Applied => applied.push(rule.name),
            RuleOutcome::Skipped(reason) => skipped.push(reason),
            RuleOutcome::AlreadyPresent => {}
        }
        current = next;
    }

    Ok(PatchOutcome {
        html: current,
        applied,
        skipped,
    })
}
