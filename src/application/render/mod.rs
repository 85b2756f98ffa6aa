//! Prerendering of the blog's store-driven sections.
//!
//! Every function here is a pure transformation of a page and the article
//! store, except the [`loader`], which owns the single shared fetch.

pub mod augment;
pub mod cards;
pub mod loader;
pub mod prerender;
pub mod routes;
pub mod toc;
pub mod views;

use thiserror::Error;

use crate::presentation::views::TemplateRenderError;

pub use loader::{ArticleLoader, LoaderError, StoreSource};
pub use prerender::{
    HiddenReason, PrerenderOptions, PrerenderOutcome, PrerenderReport, RelatedSection,
    prerender_page, prerender_site,
};
pub use routes::PageKind;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to rewrite document: {message}")]
    Document { message: String },
    #[error(transparent)]
    Template(#[from] TemplateRenderError),
}
