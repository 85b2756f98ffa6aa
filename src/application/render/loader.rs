//! Shared, lazily fetched article store.
//!
//! Every consumer awaits the same initialization future. The first call to
//! [`ArticleLoader::load`] performs the fetch; its result, success or
//! failure, is memoized for the loader's lifetime. A timeout applied by
//! [`ArticleLoader::load_within`] cancels only the waiting caller: if the
//! fetch has not completed, the cell stays empty and a later call fetches
//! again.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::{domain::articles::ArticleStore, infra::error::InfraError};

/// Where the article store is read from.
#[async_trait]
pub trait StoreSource: Send + Sync {
    async fn fetch(&self) -> Result<ArticleStore, InfraError>;

    /// Human-readable location for logs.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoaderError {
    #[error("failed to fetch article store: {0}")]
    Fetch(String),
    #[error("article store is invalid: {0}")]
    Invalid(String),
    #[error("article store not available after {after_ms} ms")]
    Timeout { after_ms: u128 },
}

pub struct ArticleLoader {
    source: Arc<dyn StoreSource>,
    cell: OnceCell<Result<Arc<ArticleStore>, LoaderError>>,
}

impl ArticleLoader {
    pub fn new(source: Arc<dyn StoreSource>) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    /// Loader whose store is already in memory.
    pub fn preloaded(source: Arc<dyn StoreSource>, store: ArticleStore) -> Self {
        Self {
            source,
            cell: OnceCell::new_with(Some(Ok(Arc::new(store)))),
        }
    }

    pub async fn load(&self) -> Result<Arc<ArticleStore>, LoaderError> {
        self.cell
            .get_or_init(|| self.fetch_once())
            .await
            .clone()
    }

    /// [`load`](Self::load), giving up after `timeout`.
    pub async fn load_within(&self, timeout: Duration) -> Result<Arc<ArticleStore>, LoaderError> {
        match tokio::time::timeout(timeout, self.load()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    target = "yojitsu::render::loader",
                    source = %self.source.describe(),
                    timeout_ms = timeout.as_millis(),
                    "Article store load timed out"
                );
                Err(LoaderError::Timeout {
                    after_ms: timeout.as_millis(),
                })
            }
        }
    }

    /// The memoized result, if a load has completed.
    pub fn loaded(&self) -> Option<&Result<Arc<ArticleStore>, LoaderError>> {
        self.cell.get()
    }

    async fn fetch_once(&self) -> Result<Arc<ArticleStore>, LoaderError> {
        let location = self.source.describe();
        debug!(target = "yojitsu::render::loader", source = %location, "Fetching article store");

        let store = self.source.fetch().await.map_err(|err| {
            warn!(
                target = "yojitsu::render::loader",
                source = %location,
                error = %err,
                "Article store fetch failed"
            );
            LoaderError::Fetch(err.to_string())
        })?;

        store.validate().map_err(|err| {
            warn!(
                target = "yojitsu::render::loader",
                source = %location,
                error = %err,
                "Fetched article store failed validation"
            );
            LoaderError::Invalid(err.to_string())
        })?;

        debug!(
            target = "yojitsu::render::loader",
            source = %location,
            articles = store.articles.len(),
            "Article store loaded"
        );
        Ok(Arc::new(store))
    }
}
