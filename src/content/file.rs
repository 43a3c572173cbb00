// src/content/file.rs
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::{filter_stored, ContentItem, ContentQuery, ContentStore, StoredContent};

/// Content store backed by a JSON export (an array of [`StoredContent`]).
/// The file is re-read on every query so each sync sees the latest export.
#[derive(Debug, Clone)]
pub struct JsonFileContentStore {
    path: PathBuf,
}

impl JsonFileContentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl ContentStore for JsonFileContentStore {
    async fn query(&self, query: &ContentQuery) -> Result<Vec<ContentItem>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading content export {}", self.path.display()))?;
        let rows: Vec<StoredContent> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing content export {}", self.path.display()))?;
        Ok(filter_stored(&rows, query))
    }
}
