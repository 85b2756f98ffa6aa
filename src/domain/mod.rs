//! Domain layer types and invariants.

pub mod articles;
pub mod artwork;
pub mod categories;
pub mod error;
