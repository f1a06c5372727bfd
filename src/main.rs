// src/main.rs
//! Run-once entrypoint: load configuration, fetch and filter the feeds,
//! curate with the LLM, render, send, exit.

use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_digest::config::{self, Settings};
use news_digest::curate::OpenAiCurator;
use news_digest::ingest::filter::ItemFilter;
use news_digest::ingest::rss::RssSource;
use news_digest::ingest::types::FeedSource;
use news_digest::pipeline::{self, RunOutcome};
use news_digest::send::Mailer;

enum RunStatus {
    Sent,
    EmptyDigest,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op where the environment is already set.
    let _ = dotenvy::dotenv();
    init_tracing();

    match run().await {
        Ok(RunStatus::Sent) => ExitCode::SUCCESS,
        Ok(RunStatus::EmptyDigest) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = ?e, "run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<RunStatus> {
    info!("=== daily news digest starting ===");
    let now = Utc::now();

    // All configuration resolves before any network activity.
    let settings = Settings::from_env().context("loading settings")?;
    let feeds = config::load_feeds_default().context("loading feed registry")?;
    info!(feeds = feeds.len(), "feed registry loaded");

    let client = RssSource::build_client()?;
    let filter = ItemFilter::new(settings.min_description_length);
    let sources: Vec<Box<dyn FeedSource>> = feeds
        .into_iter()
        .map(|feed| {
            Box::new(RssSource::new(feed, filter.clone(), client.clone())) as Box<dyn FeedSource>
        })
        .collect();

    let curator = OpenAiCurator::new(&settings)?;
    let mailer = Mailer::from_settings(&settings)?;

    match pipeline::run(&sources, &curator, now).await? {
        RunOutcome::Rendered { digest, html } => {
            info!(stories = digest.stories.len(), "step 4/4: sending email");
            mailer.send_digest(html, now).await?;
            info!("=== done ===");
            Ok(RunStatus::Sent)
        }
        RunOutcome::EmptyDigest => {
            warn!("no stories selected, nothing to send");
            Ok(RunStatus::EmptyDigest)
        }
    }
}
