//! Full rebuild of the article store from the posts directory.

use std::{fs, path::Path};

use metrics::counter;
use time::Date;
use tracing::{info, warn};

use crate::{
    application::{
        error::AppError,
        extract::{ExtractOptions, MissingField, extract},
    },
    domain::{articles::ArticleStore, categories::CategoryId},
    infra::{
        error::InfraError,
        fs::{file_name, list_html_files, write_atomic},
        telemetry::{EXTRACT_DEGRADED, FILES_PROCESSED},
    },
    util::dates::format_iso_date,
};

#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub file: String,
    pub category: CategoryId,
    pub date: Date,
    pub missing: Vec<MissingField>,
}

#[derive(Debug, Clone)]
pub struct FileFailure {
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub store: ArticleStore,
    pub outcomes: Vec<FileOutcome>,
    pub failures: Vec<FileFailure>,
}

impl SyncReport {
    pub fn degraded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.missing.is_empty())
            .count()
    }
}

/// Extract every `.html` file in `posts_dir` (name order) into a fresh
/// store. A file that cannot be read or scanned is logged and left out; only
/// an unreadable directory fails the run.
pub fn build_store(posts_dir: &Path, options: &ExtractOptions) -> Result<SyncReport, AppError> {
    let files = list_html_files(posts_dir)?;
    info!(
        target = "yojitsu::sync",
        dir = %posts_dir.display(),
        files = files.len(),
        "Scanning article pages"
    );

    let mut records = Vec::with_capacity(files.len());
    let mut outcomes = Vec::with_capacity(files.len());
    let mut failures = Vec::new();

    for path in files {
        let Some(name) = file_name(&path) else {
            continue;
        };
        counter!(FILES_PROCESSED).increment(1);

        let html = match fs::read_to_string(&path) {
            Ok(html) => html,
            Err(err) => {
                warn!(target = "yojitsu::sync", file = name, error = %err, "Skipping unreadable file");
                failures.push(FileFailure {
                    file: name.to_string(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let extraction = match extract(&html, name, options) {
            Ok(extraction) => extraction,
            Err(err) => {
                warn!(target = "yojitsu::sync", file = name, error = %err, "Skipping file");
                failures.push(FileFailure {
                    file: name.to_string(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        if extraction.is_degraded() {
            counter!(EXTRACT_DEGRADED).increment(1);
            let fields: Vec<&str> = extraction.missing.iter().map(|field| field.as_str()).collect();
            warn!(
                target = "yojitsu::sync",
                file = name,
                missing = ?fields,
                date = %format_iso_date(extraction.record.date),
                "Article metadata incomplete"
            );
        }

        info!(
            target = "yojitsu::sync",
            file = name,
            category = extraction.record.category.as_str(),
            date = %format_iso_date(extraction.record.date),
            explicit = extraction.explicit_category,
            "Extracted article"
        );

        outcomes.push(FileOutcome {
            file: name.to_string(),
            category: extraction.record.category,
            date: extraction.record.date,
            missing: extraction.missing,
        });
        records.push(extraction.record);
    }

    let store = ArticleStore::new(records);
    store.validate()?;

    Ok(SyncReport {
        store,
        outcomes,
        failures,
    })
}

/// Serialize and atomically replace the store file.
pub fn write_store(store: &ArticleStore, path: &Path) -> Result<(), AppError> {
    store.validate()?;
    let mut json = serde_json::to_string_pretty(store)
        .map_err(|err| AppError::from(InfraError::decode(err.to_string())))?;
    json.push('\n');
    write_atomic(path, &json)?;
    Ok(())
}

/// Per-category totals in catalogue order, as logged after a sync.
pub fn category_breakdown(store: &ArticleStore) -> Vec<(CategoryId, usize)> {
    CategoryId::ALL
        .into_iter()
        .map(|id| (id, store.count_by_category(id)))
        .collect()
}
