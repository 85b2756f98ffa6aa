//! Article store sources: the local `articles.json` and its published copy.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;

use super::error::InfraError;
use crate::{application::render::loader::StoreSource, domain::articles::ArticleStore};

/// Parse a store document.
pub fn parse_store(json: &str) -> Result<ArticleStore, InfraError> {
    serde_json::from_str(json).map_err(|err| InfraError::decode(err.to_string()))
}

/// Read and parse a store file synchronously.
pub fn read_store_file(path: &Path) -> Result<ArticleStore, InfraError> {
    let json = std::fs::read_to_string(path)?;
    parse_store(&json)
}

#[derive(Debug, Clone)]
pub struct FileStoreSource {
    path: PathBuf,
}

impl FileStoreSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StoreSource for FileStoreSource {
    async fn fetch(&self) -> Result<ArticleStore, InfraError> {
        let json = tokio::fs::read_to_string(&self.path).await?;
        parse_store(&json)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Single GET of the store JSON; no retries.
#[derive(Debug, Clone)]
pub struct HttpStoreSource {
    client: Client,
    url: String,
}

impl HttpStoreSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl StoreSource for HttpStoreSource {
    async fn fetch(&self) -> Result<ArticleStore, InfraError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|err| InfraError::http(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InfraError::http(format!(
                "GET {} returned status {}",
                self.url,
                status.as_u16()
            )));
        }

        response
            .json::<ArticleStore>()
            .await
            .map_err(|err| InfraError::decode(err.to_string()))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
