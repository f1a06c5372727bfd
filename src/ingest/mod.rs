// src/ingest/mod.rs
//! Feed ingestion: text normalization shared by all sources, and the
//! aggregation loop that keeps one bad feed from ever aborting the run.

pub mod filter;
pub mod rss;
pub mod types;

use tracing::{info, warn};

use crate::ingest::types::{FeedItem, FeedSource};

/// Normalize feed-supplied text: decode HTML entities, strip tags, collapse
/// whitespace, trim, and cap the length.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 4) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Fetch every source in order and concatenate whatever each one yields.
///
/// A failing source is logged and contributes zero items; deciding whether an
/// empty total is fatal belongs to the orchestrator, not here.
pub async fn fetch_all(sources: &[Box<dyn FeedSource>]) -> Vec<FeedItem> {
    let mut all_items = Vec::new();

    for source in sources {
        match source.fetch().await {
            Ok(mut items) => all_items.append(&mut items),
            Err(e) => {
                warn!(error = ?e, feed = source.name(), "feed failed, continuing without it");
            }
        }
    }

    info!(total = all_items.len(), "total items fetched across all feeds");
    all_items
}
