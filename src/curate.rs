// src/curate.rs
//! LLM-backed curation: one structured chat-completions call that selects and
//! summarizes the digest, plus the strict decoding of its response.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::info;

use crate::config::{Region, Settings};
use crate::ingest::types::FeedItem;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const TEMPERATURE: f32 = 0.3;

const SYSTEM_PROMPT: &str = "\
You are an experienced international news editor producing a concise daily digest \
for a politically engaged reader who follows Poland, Europe, and the United States. \
Your analysis should be balanced, neither neoliberal nor nationalist in framing, \
and should include geopolitical, socio-economic, and democratic-governance \
perspectives where relevant. You write in clear, neutral journalistic English. \
You always respond with a single JSON object.";

/// One curated story as returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub rank: u32,
    pub headline: String,
    pub summary: String,
    pub source_name: String,
    pub region: Region,
    pub url: String,
    pub tags: Vec<String>,
}

/// The full curated output of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DigestSummary {
    pub stories: Vec<Story>,
}

/// The curation seam: one call in, one digest (or one failure) out.
#[async_trait::async_trait]
pub trait Curator: Send + Sync {
    async fn curate(&self, items: &[FeedItem]) -> Result<DigestSummary>;
}

/// Order stories the way the rendered digest expects them: poland, europe, us,
/// ascending rank within each region.
pub fn sort_stories(stories: &mut [Story]) {
    stories.sort_by_key(|s| (s.region.section_index(), s.rank));
}

/// Decode the model's message content into the digest schema.
///
/// A response that does not match the schema is a hard failure, never a
/// partially-populated digest. An empty `stories` list is a valid result;
/// the caller decides what that means for the run.
pub fn decode_digest(content: &str) -> Result<DigestSummary> {
    serde_json::from_str(content).context("curation response did not match the digest schema")
}

fn build_user_prompt(items: &[FeedItem]) -> Result<String> {
    let n_sources = items
        .iter()
        .map(|i| i.source_name.as_str())
        .collect::<HashSet<_>>()
        .len();

    let serialized: Vec<String> = items
        .iter()
        .map(|item| serde_json::to_string(item).context("serializing feed item for the prompt"))
        .collect::<Result<_>>()?;
    let items_block = serialized.join("\n---\n");

    Ok(format!(
        "Below is today's raw feed data from {n_items} news items across {n_sources} sources.\n\
         ---\n\n\
         {items_block}\n\n\
         ---\n\n\
         Your task:\n\
         1. Select exactly 5 stories from Poland, 5 stories from Europe, and 3 stories from the \
         United States. Prioritise stories that:\n\
            - Have clear political, geopolitical, or socio-economic significance\n\
            - Are substantive news (not opinion fluff, not live-blog fragments, not sports/entertainment)\n\
            - Use priority as a hint, but apply your editorial judgement to select the most \
         important stories overall. The higher priority sources should have better quality content.\n\
         2. For each story write a 2-3 sentence neutral summary in English (translate Polish items).\n\
         3. Respond with a JSON object of the form\n\
         {{\"stories\": [{{\"rank\": 1, \"headline\": \"...\", \"summary\": \"...\", \
         \"source_name\": \"...\", \"region\": \"poland|europe|us\", \"url\": \"...\", \
         \"tags\": [\"...\"]}}]}}\n\
         with rank starting at 1 within each region.",
        n_items = items.len(),
    ))
}

/// Production curator: one uncached, unretried call to the OpenAI
/// chat-completions API in JSON-object mode.
pub struct OpenAiCurator {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiCurator {
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("news-digest/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("building curation http client")?;
        Ok(Self {
            http,
            api_key: settings.openai_api_key.clone(),
            model: settings.openai_model.clone(),
        })
    }
}

#[async_trait::async_trait]
impl Curator for OpenAiCurator {
    async fn curate(&self, items: &[FeedItem]) -> Result<DigestSummary> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct ResponseFormat {
            #[serde(rename = "type")]
            kind: &'static str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            response_format: ResponseFormat,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let user_prompt = build_user_prompt(items)?;
        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            temperature: TEMPERATURE,
            response_format: ResponseFormat { kind: "json_object" },
        };

        info!(items = items.len(), model = %self.model, "sending items for curation");

        let response = self
            .http
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("curation request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("curation API error {status}: {body}");
        }

        let body: Resp = response
            .json()
            .await
            .context("reading curation response")?;
        let content = body
            .choices
            .first()
            .context("curation response has no choices")?;

        decode_digest(&content.message.content)
    }
}
