use thiserror::Error;
use time::Date;

use super::categories::CategoryId;

/// Ways an article store or a category reference can be inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("unknown category `{0}`")]
    UnknownCategory(String),
    #[error("category `{0}` is not declared in the store")]
    UndeclaredCategory(CategoryId),
    #[error("article at `{path}` has an empty id")]
    EmptyArticleId { path: String },
    #[error("duplicate article id `{id}`")]
    DuplicateArticleId { id: String },
    #[error("category list does not match the fixed catalogue")]
    CatalogueMismatch,
    #[error("articles are not sorted newest first: `{first}` ({first_date}) precedes `{second}` ({second_date})")]
    OutOfOrder {
        first: String,
        first_date: Date,
        second: String,
        second_date: Date,
    },
}
