// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::config::{Priority, Region};

/// A normalized, validated news item ready for curation.
///
/// Every field is guaranteed by the ingest pass: `description` is HTML-stripped
/// and meets the configured minimum length, `published` is a real UTC timestamp
/// inside the recency window.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeedItem {
    pub source_name: String,
    pub region: Region,
    pub title: String,
    pub description: String,
    pub url: String,
    pub published: DateTime<Utc>,
    pub priority: Priority,
}

/// One feed worth of fetching. `fetch` returns everything usable from the
/// source, or the reason the whole source failed; the caller decides what a
/// failure means for the run.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<FeedItem>>;
    fn name(&self) -> &str;
}
