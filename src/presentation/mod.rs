//! Askama views for the fragments the renderer injects into pages.

pub mod views;
