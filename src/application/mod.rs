//! Application services: every pipeline operation over the site tree.

pub mod classify;
pub mod error;
pub mod export;
pub mod extract;
pub mod fix;
pub mod patch;
pub mod render;
pub mod sitemap;
pub mod structure;
pub mod sync;
