// src/pipeline.rs
//! Composition of one run: fetch -> curate -> sort -> render. Sending is the
//! caller's step. No retries anywhere: a run is strictly fetch-once,
//! curate-once, render-once.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::curate::{self, Curator, DigestSummary};
use crate::ingest::{self, types::FeedSource};
use crate::render;

#[derive(Debug)]
pub enum RunOutcome {
    /// A digest was curated and rendered, ready to send.
    Rendered { digest: DigestSummary, html: String },
    /// Curation succeeded but selected nothing; there is nothing to send.
    EmptyDigest,
}

pub async fn run(
    sources: &[Box<dyn FeedSource>],
    curator: &dyn Curator,
    now: DateTime<Utc>,
) -> Result<RunOutcome> {
    info!("step 1/4: fetching feeds");
    let items = ingest::fetch_all(sources).await;
    if items.is_empty() {
        bail!("no feed items fetched, aborting before curation");
    }

    info!("step 2/4: curating digest");
    let mut digest = curator.curate(&items).await.context("curation failed")?;
    if digest.stories.is_empty() {
        warn!("curation returned no stories");
        return Ok(RunOutcome::EmptyDigest);
    }
    info!(stories = digest.stories.len(), "stories selected");

    info!("step 3/4: rendering html email");
    curate::sort_stories(&mut digest.stories);
    let html = render::render_html(&digest, now);

    Ok(RunOutcome::Rendered { digest, html })
}
