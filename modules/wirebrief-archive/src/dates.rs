//! Publication-date discovery in article HTML.
//!
//! Tried in order: standard meta tags, a `<time datetime>` attribute,
//! JSON-LD article nodes, then a whole-document datetime scan. The first
//! candidate that parses wins.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use wirebrief_common::datetime::{kst_display, parse_flexible, scan_datetime};

const META_KEYS: [(&str, &str); 4] = [
    ("property", "article:published_time"),
    ("property", "article:modified_time"),
    ("property", "og:updated_time"),
    ("name", "date"),
];

const ARTICLE_TYPES: [&str; 3] = ["NewsArticle", "Article", "BlogPosting"];

static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid regex"));

static CONTENT_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)content\s*=\s*["']([^"']+)["']"#).expect("valid regex"));

static TIME_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<time\b[^>]*datetime\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

static JSON_LD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script\b[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid regex")
});

/// Best publication timestamp for a page, already in display form.
pub(crate) fn published_display(html: &str) -> Option<String> {
    publication_date(html).map(kst_display)
}

fn publication_date(html: &str) -> Option<DateTime<Utc>> {
    meta_tag_date(html)
        .or_else(|| time_tag_date(html))
        .or_else(|| json_ld_date(html))
        .or_else(|| scan_datetime(html))
}

fn meta_tag_date(html: &str) -> Option<DateTime<Utc>> {
    for (attr, value) in META_KEYS {
        let double = format!(r#"{attr}="{value}""#);
        let single = format!("{attr}='{value}'");
        for tag in META_TAG_RE.find_iter(html) {
            let tag = tag.as_str();
            let lower = tag.to_lowercase();
            if !lower.contains(&double) && !lower.contains(&single) {
                continue;
            }
            if let Some(cap) = CONTENT_ATTR_RE.captures(tag) {
                if let Some(dt) = parse_candidate(&cap[1]) {
                    return Some(dt);
                }
            }
        }
    }
    None
}

fn time_tag_date(html: &str) -> Option<DateTime<Utc>> {
    TIME_TAG_RE
        .captures(html)
        .and_then(|cap| parse_candidate(&cap[1]))
}

fn json_ld_date(html: &str) -> Option<DateTime<Utc>> {
    for cap in JSON_LD_RE.captures_iter(html) {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(cap[1].trim()) else {
            continue;
        };
        let nodes: Vec<&serde_json::Value> = match &value {
            serde_json::Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        for node in nodes {
            if let Some(dt) = article_node_date(node) {
                return Some(dt);
            }
        }
    }
    None
}

fn article_node_date(node: &serde_json::Value) -> Option<DateTime<Utc>> {
    let node_type = node.get("@type")?;
    let is_article = match node_type {
        serde_json::Value::String(s) => ARTICLE_TYPES.contains(&s.as_str()),
        serde_json::Value::Array(items) => items
            .iter()
            .any(|t| t.as_str().is_some_and(|s| ARTICLE_TYPES.contains(&s))),
        _ => false,
    };
    if !is_article {
        return None;
    }

    for key in ["datePublished", "dateModified", "dateCreated"] {
        if let Some(raw) = node.get(key).and_then(|v| v.as_str()) {
            if let Some(dt) = parse_candidate(raw) {
                return Some(dt);
            }
        }
    }
    None
}

fn parse_candidate(raw: &str) -> Option<DateTime<Utc>> {
    parse_flexible(raw).or_else(|| scan_datetime(raw))
}
