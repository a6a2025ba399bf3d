use std::sync::LazyLock;

use regex::Regex;

// Zero-width and bidi control characters that leak out of email HTML and
// scraped pages; they break length heuristics and ticker matching.
static INVISIBLES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\u{200b}-\u{200f}\u{2028}\u{2029}\u{2060}]+").expect("valid regex")
});

/// Remove invisible characters, normalize newlines to LF, and trim.
pub fn strip_invisibles(s: &str) -> String {
    let cleaned = INVISIBLES_RE.replace_all(s, "");
    cleaned
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .trim()
        .to_string()
}
