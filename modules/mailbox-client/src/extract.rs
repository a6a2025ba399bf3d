//! Link extraction from message bodies.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::message::{decode_base64url, MailMessage};

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).expect("valid regex"));

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://[^\s)>\]]+").expect("valid regex"));

/// Candidate article links in arrival order: anchors from HTML parts first,
/// then bare URLs from plain-text parts, deduplicated.
pub fn extract_urls(msg: &MailMessage) -> Vec<String> {
    let mut urls = Vec::new();
    let mut seen = HashSet::new();
    let Some(payload) = &msg.payload else {
        return urls;
    };

    for part in payload.walk() {
        if part.mime_type != "text/html" {
            continue;
        }
        let Some(data) = &part.body.data else { continue };
        let html = decode_base64url(data);
        for cap in HREF_RE.captures_iter(&html) {
            push_unique(&cap[1], &mut urls, &mut seen);
        }
    }

    for part in payload.walk() {
        if part.mime_type != "text/plain" {
            continue;
        }
        let Some(data) = &part.body.data else { continue };
        let text = decode_base64url(data);
        for m in URL_RE.find_iter(&text) {
            push_unique(m.as_str(), &mut urls, &mut seen);
        }
    }

    urls
}

fn push_unique(url: &str, urls: &mut Vec<String>, seen: &mut HashSet<String>) {
    if !url.to_lowercase().starts_with("http") {
        return;
    }
    if seen.insert(url.to_string()) {
        urls.push(url.to_string());
    }
}
