// src/render.rs
//! HTML email body for a curated digest: one section per region, stories in
//! rank order. Pure string building; all dynamic text is escaped.

use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::debug;

use crate::config::Region;
use crate::curate::{DigestSummary, Story};

pub fn render_html(digest: &DigestSummary, date: DateTime<Utc>) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"></head>\n");
    html.push_str("<body style=\"font-family: Georgia, serif; max-width: 640px; margin: 0 auto; color: #222;\">\n");
    html.push_str(&format!(
        "<h1 style=\"border-bottom: 2px solid #222;\">Daily News Digest</h1>\n<p>{}</p>\n",
        encode_text(&date.format("%A, %d %B %Y").to_string())
    ));

    for region in Region::ORDERED {
        let stories: Vec<&Story> = digest
            .stories
            .iter()
            .filter(|s| s.region == region)
            .collect();
        if stories.is_empty() {
            continue;
        }

        html.push_str(&format!(
            "<h2 style=\"margin-top: 2em;\">{}</h2>\n",
            region.display_name()
        ));
        for story in stories {
            render_story(&mut html, story);
        }
    }

    html.push_str("</body>\n</html>\n");
    debug!(bytes = html.len(), "rendered digest html");
    html
}

fn render_story(html: &mut String, story: &Story) {
    html.push_str("<div style=\"margin-bottom: 1.5em;\">\n");
    html.push_str(&format!(
        "<h3 style=\"margin-bottom: 0.2em;\">{rank}. <a href=\"{url}\" style=\"color: #1a3c6e;\">{headline}</a></h3>\n",
        rank = story.rank,
        url = encode_double_quoted_attribute(&story.url),
        headline = encode_text(&story.headline),
    ));
    html.push_str(&format!("<p>{}</p>\n", encode_text(&story.summary)));

    html.push_str(&format!(
        "<p style=\"font-size: 0.85em; color: #666;\">{}",
        encode_text(&story.source_name)
    ));
    if !story.tags.is_empty() {
        let tags: Vec<String> = story
            .tags
            .iter()
            .map(|t| encode_text(t).into_owned())
            .collect();
        html.push_str(&format!(" &middot; {}", tags.join(", ")));
    }
    html.push_str("</p>\n</div>\n");
}
