// src/content/mod.rs
pub mod file;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A piece of published (or trashed) content as the CMS stores it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentItem {
    /// Stable locator, e.g. the canonical URL / guid.
    pub uri: String,
    pub title: String,
    /// Raw saved markup.
    pub body: String,
}

impl ContentItem {
    pub fn new(uri: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Post,
    Page,
    Attachment,
    Revision,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ContentStatus {
    Publish,
    Future,
    Draft,
    Pending,
    Private,
    Trash,
    AutoDraft,
    Inherit,
    /// Status registered by a plugin (`wc-completed`, ...).
    #[serde(other)]
    Other,
}

/// `Any` covers every status except trashed, auto-draft and inherited
/// items, plugin statuses included; trash has to be asked for explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Any,
    Exact(ContentStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: ContentStatus) -> bool {
        match self {
            StatusFilter::Any => !matches!(
                status,
                ContentStatus::Trash | ContentStatus::AutoDraft | ContentStatus::Inherit
            ),
            StatusFilter::Exact(s) => *s == status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
    pub kinds: Vec<ContentKind>,
    pub statuses: Vec<StatusFilter>,
}

impl ContentQuery {
    /// Posts and pages in any state, trash included.
    pub fn usage_scan() -> Self {
        Self {
            kinds: vec![ContentKind::Post, ContentKind::Page],
            statuses: vec![StatusFilter::Any, StatusFilter::Exact(ContentStatus::Trash)],
        }
    }

    pub fn matches(&self, kind: ContentKind, status: ContentStatus) -> bool {
        self.kinds.contains(&kind) && self.statuses.iter().any(|f| f.matches(status))
    }
}

/// Read-only view of the CMS content store.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Items matching `query`, in store order.
    async fn query(&self, query: &ContentQuery) -> Result<Vec<ContentItem>>;
}

/// A content item together with the metadata the store filters on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredContent {
    pub kind: ContentKind,
    pub status: ContentStatus,
    #[serde(flatten)]
    pub item: ContentItem,
}

pub(crate) fn filter_stored(rows: &[StoredContent], query: &ContentQuery) -> Vec<ContentItem> {
    rows.iter()
        .filter(|r| query.matches(r.kind, r.status))
        .map(|r| r.item.clone())
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryContentStore {
    rows: Vec<StoredContent>,
}

impl InMemoryContentStore {
    pub fn new(rows: Vec<StoredContent>) -> Self {
        Self { rows }
    }

    pub fn push(&mut self, kind: ContentKind, status: ContentStatus, item: ContentItem) {
        self.rows.push(StoredContent { kind, status, item });
    }
}

#[async_trait::async_trait]
impl ContentStore for InMemoryContentStore {
    async fn query(&self, query: &ContentQuery) -> Result<Vec<ContentItem>> {
        Ok(filter_stored(&self.rows, query))
    }
}
