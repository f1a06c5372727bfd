// src/config.rs
//! Runtime settings (env / `.env`) and the feed registry file.
//!
//! Both are resolved exactly once in `main` and passed down by reference;
//! there is no global lookup anywhere else in the crate.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_FEEDS_PATH: &str = "FEEDS_PATH";

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_MIN_DESCRIPTION_LENGTH: usize = 100;

/// Geographic section a feed (and every story selected from it) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Poland,
    Europe,
    Us,
}

impl Region {
    /// Fixed section order for the rendered digest.
    pub const ORDERED: [Region; 3] = [Region::Poland, Region::Europe, Region::Us];

    pub fn section_index(self) -> usize {
        match self {
            Region::Poland => 0,
            Region::Europe => 1,
            Region::Us => 2,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Region::Poland => "Poland",
            Region::Europe => "Europe",
            Region::Us => "United States",
        }
    }
}

/// Soft editorial hint attached to a feed; never a hard filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    #[default]
    Low,
}

/// One syndication source, as declared in the feeds file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub name: String,
    pub url: String,
    pub region: Region,
    #[serde(default)]
    pub priority: Priority,
}

/// Load the feed registry from an explicit path. Supports TOML or JSON.
pub fn load_feeds_from(path: &Path) -> Result<Vec<Feed>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feeds from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let feeds = parse_feeds(&content, ext.as_str())
        .with_context(|| format!("parsing feeds from {}", path.display()))?;
    validate_feeds(&feeds)?;
    Ok(feeds)
}

/// Load the feed registry using env var + fallbacks:
/// 1) $FEEDS_PATH
/// 2) feeds.toml
/// 3) feeds.json
pub fn load_feeds_default() -> Result<Vec<Feed>> {
    if let Ok(p) = std::env::var(ENV_FEEDS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_feeds_from(&pb);
        } else {
            return Err(anyhow!("FEEDS_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("feeds.toml");
    if toml_p.exists() {
        return load_feeds_from(&toml_p);
    }
    let json_p = PathBuf::from("feeds.json");
    if json_p.exists() {
        return load_feeds_from(&json_p);
    }
    Err(anyhow!(
        "no feeds file found: set FEEDS_PATH or create feeds.toml / feeds.json \
         in the working directory"
    ))
}

fn parse_feeds(s: &str, hint_ext: &str) -> Result<Vec<Feed>> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("[[feeds]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    // Try JSON array
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    // Fallback: also try TOML if not attempted
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!(
        "unsupported feeds format (expected TOML tables or a JSON array)"
    ))
}

fn parse_toml(s: &str) -> Result<Vec<Feed>> {
    #[derive(Deserialize)]
    struct TomlFeeds {
        feeds: Vec<Feed>,
    }
    let v: TomlFeeds = toml::from_str(s)?;
    Ok(v.feeds)
}

fn parse_json(s: &str) -> Result<Vec<Feed>> {
    let v: Vec<Feed> = serde_json::from_str(s)?;
    Ok(v)
}

fn validate_feeds(feeds: &[Feed]) -> Result<()> {
    if feeds.is_empty() {
        bail!("feeds file declares no feeds");
    }
    let mut seen = HashSet::new();
    for feed in feeds {
        let name = feed.name.trim();
        if name.is_empty() {
            bail!("feed with url {} has an empty name", feed.url);
        }
        if !seen.insert(name.to_string()) {
            bail!("duplicate feed name: {name}");
        }
        reqwest::Url::parse(&feed.url)
            .with_context(|| format!("feed {name} has an invalid url: {}", feed.url))?;
    }
    Ok(())
}

/// Process-wide settings, resolved once at startup.
///
/// Required values fail fast here, before any network activity.
#[derive(Debug, Clone)]
pub struct Settings {
    pub openai_api_key: String,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub recipient_email: String,
    pub smtp_host: String,
    pub openai_model: String,
    pub min_description_length: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let min_description_length = match std::env::var("MIN_DESCRIPTION_LENGTH") {
            Ok(raw) => raw
                .trim()
                .parse()
                .context("MIN_DESCRIPTION_LENGTH must be an integer")?,
            Err(_) => DEFAULT_MIN_DESCRIPTION_LENGTH,
        };

        Ok(Self {
            openai_api_key: required("OPENAI_API_KEY")?,
            smtp_user: required("SMTP_USER")?,
            smtp_pass: required("SMTP_PASS")?,
            recipient_email: required("RECIPIENT_EMAIL")?,
            smtp_host: optional("SMTP_HOST", DEFAULT_SMTP_HOST),
            openai_model: optional("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            min_description_length,
        })
    }
}

fn required(name: &str) -> Result<String> {
    let value = std::env::var(name).map_err(|_| anyhow!("{name} missing"))?;
    if value.trim().is_empty() {
        bail!("{name} is set but empty");
    }
    Ok(value)
}

fn optional(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn toml_and_json_formats_parse() {
        let toml = r#"
            [[feeds]]
            name = "TVN24"
            url = "https://tvn24.pl/najnowsze.xml"
            region = "poland"
            priority = "high"

            [[feeds]]
            name = "Politico EU"
            url = "https://www.politico.eu/feed/"
            region = "europe"
        "#;
        let feeds = parse_feeds(toml, "toml").unwrap();
        assert_eq!(feeds.len(), 2);
        assert_eq!(feeds[0].priority, Priority::High);
        // priority defaults to low when absent
        assert_eq!(feeds[1].priority, Priority::Low);

        let json = r#"[
            {"name": "NPR", "url": "https://feeds.npr.org/1001/rss.xml", "region": "us"}
        ]"#;
        let feeds = parse_feeds(json, "json").unwrap();
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].region, Region::Us);
        assert_eq!(feeds[0].priority, Priority::Low);
    }

    #[test]
    fn unknown_region_is_rejected() {
        let json = r#"[{"name": "X", "url": "https://example.test/rss", "region": "asia"}]"#;
        assert!(parse_feeds(json, "json").is_err());
    }

    #[test]
    fn duplicate_names_and_bad_urls_are_rejected() {
        let dup = vec![
            Feed {
                name: "A".into(),
                url: "https://example.test/a".into(),
                region: Region::Poland,
                priority: Priority::Low,
            },
            Feed {
                name: "A".into(),
                url: "https://example.test/b".into(),
                region: Region::Europe,
                priority: Priority::Low,
            },
        ];
        assert!(validate_feeds(&dup).is_err());

        let bad_url = vec![Feed {
            name: "B".into(),
            url: "not-a-url".into(),
            region: Region::Us,
            priority: Priority::Low,
        }];
        assert!(validate_feeds(&bad_url).is_err());

        let empty: Vec<Feed> = Vec::new();
        assert!(validate_feeds(&empty).is_err());
    }

    #[serial_test::serial]
    #[test]
    fn settings_fail_fast_on_missing_required() {
        for key in ["OPENAI_API_KEY", "SMTP_USER", "SMTP_PASS", "RECIPIENT_EMAIL"] {
            env::remove_var(key);
        }
        let err = Settings::from_env().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[serial_test::serial]
    #[test]
    fn settings_apply_defaults() {
        env::set_var("OPENAI_API_KEY", "sk-test");
        env::set_var("SMTP_USER", "digest@example.test");
        env::set_var("SMTP_PASS", "hunter2");
        env::set_var("RECIPIENT_EMAIL", "reader@example.test");
        for key in ["SMTP_HOST", "OPENAI_MODEL", "MIN_DESCRIPTION_LENGTH"] {
            env::remove_var(key);
        }

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.smtp_host, DEFAULT_SMTP_HOST);
        assert_eq!(settings.openai_model, DEFAULT_OPENAI_MODEL);
        assert_eq!(
            settings.min_description_length,
            DEFAULT_MIN_DESCRIPTION_LENGTH
        );

        env::set_var("MIN_DESCRIPTION_LENGTH", "not a number");
        assert!(Settings::from_env().is_err());

        for key in [
            "OPENAI_API_KEY",
            "SMTP_USER",
            "SMTP_PASS",
            "RECIPIENT_EMAIL",
            "MIN_DESCRIPTION_LENGTH",
        ] {
            env::remove_var(key);
        }
    }
}
