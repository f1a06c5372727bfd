// src/ingest/filter.rs
//! Per-item acceptance predicates: content quality and recency.
//!
//! Both run against already-normalized text, so markup never inflates a short
//! teaser past the length threshold.

use chrono::{DateTime, Duration, Utc};

/// Items older than this are stale for a daily digest.
pub const RECENCY_WINDOW_HOURS: i64 = 72;

#[derive(Debug, Clone)]
pub struct ItemFilter {
    min_description_length: usize,
    recency_window: Duration,
}

impl ItemFilter {
    pub fn new(min_description_length: usize) -> Self {
        Self {
            min_description_length,
            recency_window: Duration::hours(RECENCY_WINDOW_HOURS),
        }
    }

    /// Length gate on the normalized description; live-blog stubs and teaser
    /// fragments fall below it.
    pub fn is_substantial(&self, description: &str) -> bool {
        description.chars().count() >= self.min_description_length
    }

    /// Inclusive 72h window against wall-clock now. A missing timestamp is
    /// treated as "not recent", never as unknown-but-ok.
    pub fn is_recent(&self, published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match published {
            None => false,
            Some(ts) => ts >= now - self.recency_window,
        }
    }
}
