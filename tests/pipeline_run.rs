// tests/pipeline_run.rs
//! End-to-end pipeline scenarios with mock sources and a mock curator.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;

use news_digest::config::{Priority, Region};
use news_digest::curate::{Curator, DigestSummary, Story};
use news_digest::ingest::types::{FeedItem, FeedSource};
use news_digest::pipeline::{self, RunOutcome};

fn item(title: &str) -> FeedItem {
    FeedItem {
        source_name: "Good Wire".into(),
        region: Region::Poland,
        title: title.into(),
        description: "A description long enough to have survived the quality filter.".into(),
        url: format!("https://example.test/{title}"),
        published: Utc::now(),
        priority: Priority::High,
    }
}

fn story(rank: u32, region: Region) -> Story {
    Story {
        rank,
        headline: format!("Headline {rank}"),
        summary: "Two neutral sentences. Nothing more.".into(),
        source_name: "Good Wire".into(),
        region,
        url: format!("https://example.test/story/{rank}"),
        tags: vec!["politics".into()],
    }
}

struct GoodSource;

#[async_trait]
impl FeedSource for GoodSource {
    async fn fetch(&self) -> Result<Vec<FeedItem>> {
        Ok(vec![item("a"), item("b"), item("c")])
    }
    fn name(&self) -> &str {
        "Good Wire"
    }
}

struct BrokenSource;

#[async_trait]
impl FeedSource for BrokenSource {
    async fn fetch(&self) -> Result<Vec<FeedItem>> {
        Err(anyhow!("dns failure"))
    }
    fn name(&self) -> &str {
        "Broken Wire"
    }
}

/// All entries older than the recency window: the source itself is healthy
/// but contributes nothing.
struct StaleSource;

#[async_trait]
impl FeedSource for StaleSource {
    async fn fetch(&self) -> Result<Vec<FeedItem>> {
        Ok(Vec::new())
    }
    fn name(&self) -> &str {
        "Stale Wire"
    }
}

struct MockCurator {
    stories: Vec<Story>,
    calls: AtomicUsize,
}

impl MockCurator {
    fn returning(stories: Vec<Story>) -> Self {
        Self {
            stories,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Curator for MockCurator {
    async fn curate(&self, _items: &[FeedItem]) -> Result<DigestSummary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(DigestSummary {
            stories: self.stories.clone(),
        })
    }
}

#[tokio::test]
async fn small_digest_is_rendered_not_treated_as_fatal() {
    // 2 feeds, one healthy with 3 items, one erroring; curation picks 2.
    let sources: Vec<Box<dyn FeedSource>> = vec![Box::new(GoodSource), Box::new(BrokenSource)];
    let curator = MockCurator::returning(vec![story(1, Region::Poland), story(1, Region::Us)]);

    let outcome = pipeline::run(&sources, &curator, Utc::now()).await.unwrap();
    match outcome {
        RunOutcome::Rendered { digest, html } => {
            assert_eq!(digest.stories.len(), 2);
            assert!(html.contains("Headline 1"));
        }
        other => panic!("expected a rendered digest, got {other:?}"),
    }
    assert_eq!(curator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn zero_items_abort_before_curation() {
    let sources: Vec<Box<dyn FeedSource>> = vec![Box::new(StaleSource), Box::new(BrokenSource)];
    let curator = MockCurator::returning(vec![story(1, Region::Poland)]);

    let err = pipeline::run(&sources, &curator, Utc::now())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no feed items fetched"));
    // No curation call for an empty batch.
    assert_eq!(curator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_curation_result_is_a_soft_outcome() {
    let sources: Vec<Box<dyn FeedSource>> = vec![Box::new(GoodSource)];
    let curator = MockCurator::returning(Vec::new());

    let outcome = pipeline::run(&sources, &curator, Utc::now()).await.unwrap();
    assert!(matches!(outcome, RunOutcome::EmptyDigest));
}

struct FailingCurator;

#[async_trait]
impl Curator for FailingCurator {
    async fn curate(&self, _items: &[FeedItem]) -> Result<DigestSummary> {
        Err(anyhow!("schema mismatch"))
    }
}

#[tokio::test]
async fn curation_failure_is_fatal() {
    let sources: Vec<Box<dyn FeedSource>> = vec![Box::new(GoodSource)];
    let err = pipeline::run(&sources, &FailingCurator, Utc::now())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("curation failed"));
}

#[tokio::test]
async fn rendered_stories_are_sorted_for_the_email() {
    let sources: Vec<Box<dyn FeedSource>> = vec![Box::new(GoodSource)];
    // Deliberately out of order: us before poland, ranks reversed.
    let curator = MockCurator::returning(vec![
        story(2, Region::Us),
        story(1, Region::Us),
        story(2, Region::Poland),
        story(1, Region::Poland),
        story(1, Region::Europe),
    ]);

    let outcome = pipeline::run(&sources, &curator, Utc::now()).await.unwrap();
    let digest = match outcome {
        RunOutcome::Rendered { digest, .. } => digest,
        other => panic!("expected a rendered digest, got {other:?}"),
    };

    let keys: Vec<(usize, u32)> = digest
        .stories
        .iter()
        .map(|s| (s.region.section_index(), s.rank))
        .collect();
    assert_eq!(keys, vec![(0, 1), (0, 2), (1, 1), (2, 1), (2, 2)]);
}
