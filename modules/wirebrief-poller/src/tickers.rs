//! Ticker extraction from alert subject lines.
//!
//! Alert subjects lead with the ticker(s), then a separator, then the
//! headline: `"NVDA: Stock jumps"`, `"NVDA, PLTR: Both move"`,
//! `"TSLA — Q3 delivery miss"`. A subject with no such prefix names no
//! ticker and the message is skipped.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;

static SINGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Z]{1,5})\s*[:\-–—]\s").expect("valid regex"));

static LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Z ,/&-]{3,})\s*[:\-–—]\s").expect("valid regex"));

static SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,\s/&-]+").expect("valid regex"));

/// Extract ticker symbols from a subject line, deduplicated and sorted.
///
/// A non-empty `allowed` set restricts the result to its members; an empty
/// set means every extracted ticker passes.
pub fn extract_tickers(subject: &str, allowed: &HashSet<String>) -> Vec<String> {
    let mut found: BTreeSet<String> = BTreeSet::new();

    if let Some(caps) = SINGLE_RE.captures(subject) {
        found.extend(accept(&caps[1]));
    } else if let Some(caps) = LIST_RE.captures(subject) {
        for piece in SPLIT_RE.split(&caps[1]) {
            found.extend(accept(piece));
        }
    }

    let mut tickers: Vec<String> = found.into_iter().collect();
    if !allowed.is_empty() {
        tickers.retain(|t| allowed.contains(t));
    }
    tickers
}

/// A symbol is 2 to 5 ASCII letters. Single letters ("A", "I") collide with
/// ordinary English and are rejected.
fn accept(raw: &str) -> Option<String> {
    let symbol = raw.trim();
    let len = symbol.chars().count();
    if (2..=5).contains(&len) && symbol.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(symbol.to_string())
    } else {
        None
    }
}
