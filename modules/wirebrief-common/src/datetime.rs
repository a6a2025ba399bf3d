//! Datetime parsing and best-date resolution.
//!
//! Publication timestamps arrive in three shapes: a display string scraped
//! from an article, an RFC 2822 email Date header, and the mailbox's
//! internal receipt time in epoch milliseconds. Everything is normalized to
//! UTC internally and rendered in KST for display.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use regex::Regex;

/// Asia/Seoul is a fixed UTC+9 offset (no DST), so no tz database is needed.
static KST: LazyLock<FixedOffset> =
    LazyLock::new(|| FixedOffset::east_opt(9 * 3600).expect("valid offset"));

/// Display format for all rendered timestamps.
const DISPLAY_FORMAT: &str = "%Y.%m.%d. %H:%M";

// Formats carrying their own offset.
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%:z", "%Y-%m-%dT%H:%M%:z"];

// Naive formats, assumed UTC. `%.f` also matches the no-fraction form.
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

static ISO_Z_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?Z").expect("valid regex")
});
static ISO_OFFSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(?::\d{2})?[+-]\d{2}:\d{2}").expect("valid regex")
});
static SLASH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}/\d{2}/\d{2}\s+\d{2}:\d{2}(?::\d{2})?").expect("valid regex")
});

/// Where a resolved timestamp came from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    Article,
    Email,
    Gmail,
    Unknown,
}

impl fmt::Display for DateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            DateSource::Article => "article",
            DateSource::Email => "email",
            DateSource::Gmail => "gmail",
            DateSource::Unknown => "unknown",
        };
        write!(f, "{tag}")
    }
}

/// Parse a standalone datetime string in any of the accepted shapes.
/// Unparsable input is absence, not an error.
pub fn parse_flexible(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }
    None
}

/// Scan arbitrary text for the first datetime candidate that parses.
pub fn scan_datetime(text: &str) -> Option<DateTime<Utc>> {
    for re in [&*ISO_Z_RE, &*ISO_OFFSET_RE, &*SLASH_RE] {
        if let Some(m) = re.find(text) {
            if let Some(dt) = parse_flexible(m.as_str()) {
                return Some(dt);
            }
        }
    }
    None
}

/// Parse an RFC 2822 email `Date` header.
pub fn parse_rfc2822(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Render a UTC instant in KST display form.
pub fn kst_display(dt: DateTime<Utc>) -> String {
    dt.with_timezone(&*KST).format(DISPLAY_FORMAT).to_string()
}

/// Pick the best-known publication timestamp.
///
/// Priority: article-scraped display > email header > mailbox receipt time.
/// With no candidate at all the display is empty and the source is
/// `Unknown`; callers render their own placeholder.
pub fn resolve_best_date(
    article_display: Option<&str>,
    header_date: Option<DateTime<Utc>>,
    internal_ms: Option<i64>,
) -> (String, DateSource) {
    if let Some(display) = article_display.map(str::trim).filter(|d| !d.is_empty()) {
        return (display.to_string(), DateSource::Article);
    }
    if let Some(dt) = header_date {
        return (kst_display(dt), DateSource::Email);
    }
    if let Some(dt) = internal_ms.and_then(DateTime::from_timestamp_millis) {
        return (kst_display(dt), DateSource::Gmail);
    }
    (String::new(), DateSource::Unknown)
}
