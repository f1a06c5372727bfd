// src/ingest/rss.rs
//! RSS 2.0 feed source: HTTP fetch, typed XML deserialization, and the
//! per-entry normalization pass that turns raw `<item>`s into `FeedItem`s.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Feed;
use crate::ingest::filter::ItemFilter;
use crate::ingest::normalize_text;
use crate::ingest::types::{FeedItem, FeedSource};

pub const FETCH_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    // A channel with zero items is odd but not an error.
    #[serde(rename = "item", default)]
    items: Vec<RawEntry>,
}

/// One `<item>` as it appears on the wire; nothing is trusted yet.
#[derive(Debug, Default, Deserialize)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    #[serde(rename = "pubDate")]
    pub pub_date: Option<String>,
    pub description: Option<String>,
}

/// Parse a feed body into raw entries. Any structural failure is the
/// caller's problem; recoverable oddities live at the entry level.
pub fn parse_channel(xml: &str) -> Result<Vec<RawEntry>> {
    let rss: Rss = from_str(xml).context("parsing rss xml")?;
    Ok(rss.channel.items)
}

fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Convert raw entries into validated items, dropping anything that fails
/// normalization or the filter predicates. Reasons go to the debug log.
pub fn normalize_entries(
    entries: Vec<RawEntry>,
    feed: &Feed,
    filter: &ItemFilter,
    now: DateTime<Utc>,
) -> Vec<FeedItem> {
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Some(item) = normalize_entry(entry, feed, filter, now) {
            out.push(item);
        }
    }
    out
}

fn normalize_entry(
    entry: RawEntry,
    feed: &Feed,
    filter: &ItemFilter,
    now: DateTime<Utc>,
) -> Option<FeedItem> {
    let title = normalize_text(entry.title.as_deref().unwrap_or_default());

    let url = match entry.link.as_deref().map(str::trim) {
        Some(link) if !link.is_empty() => link.to_string(),
        _ => {
            debug!(feed = %feed.name, title = %title, "skipping entry without a link");
            return None;
        }
    };

    let published = match entry.pub_date.as_deref().and_then(parse_pub_date) {
        Some(ts) => ts,
        None => {
            debug!(feed = %feed.name, title = %title, "skipping entry without a parseable publish date");
            return None;
        }
    };

    let description = normalize_text(entry.description.as_deref().unwrap_or_default());
    if !filter.is_substantial(&description) {
        debug!(
            feed = %feed.name,
            title = %title,
            desc_len = description.chars().count(),
            "skipping short item"
        );
        return None;
    }

    if !filter.is_recent(Some(published), now) {
        debug!(feed = %feed.name, title = %title, %published, "skipping stale item");
        return None;
    }

    Some(FeedItem {
        source_name: feed.name.clone(),
        region: feed.region,
        title,
        description,
        url,
        published,
        priority: feed.priority,
    })
}

pub struct RssSource {
    feed: Feed,
    filter: ItemFilter,
    client: reqwest::Client,
}

impl RssSource {
    pub fn new(feed: Feed, filter: ItemFilter, client: reqwest::Client) -> Self {
        Self {
            feed,
            filter,
            client,
        }
    }

    /// One HTTP client shared (cloned) across all feed sources.
    pub fn build_client() -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(concat!("news-digest/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .context("building feed http client")
    }
}

#[async_trait::async_trait]
impl FeedSource for RssSource {
    async fn fetch(&self) -> Result<Vec<FeedItem>> {
        let response = self
            .client
            .get(&self.feed.url)
            .send()
            .await
            .with_context(|| format!("fetching {}", self.feed.url))?
            .error_for_status()
            .with_context(|| format!("fetching {}", self.feed.url))?;

        let body = response
            .text()
            .await
            .with_context(|| format!("reading body of {}", self.feed.url))?;

        let entries =
            parse_channel(&body).with_context(|| format!("parsing feed {}", self.feed.name))?;
        let total = entries.len();
        let items = normalize_entries(entries, &self.feed, &self.filter, Utc::now());

        info!(
            feed = %self.feed.name,
            usable = items.len(),
            total,
            "fetched feed"
        );
        Ok(items)
    }

    fn name(&self) -> &str {
        &self.feed.name
    }
}
