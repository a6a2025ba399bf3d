//! Builds the text a message is summarized from.
//!
//! Breaking-news mails are often a bare headline with a link. When the body
//! is too thin to summarize, the linked article is fetched and appended so
//! the summarizer has something to work with.

use tracing::{debug, warn};

use wirebrief_common::{strip_invisibles, DateSource};

use crate::budget::TimeBudget;
use crate::sources::rank_article_urls;
use crate::traits::{ArticleReader, FetchedMail};

/// Candidate links tried per message before giving up on enrichment.
const MAX_URL_ATTEMPTS: usize = 3;

/// Summarizer input for one message, plus the linked article's publication
/// date display when one was found.
#[derive(Debug, Clone)]
pub struct Composed {
    pub text: String,
    pub article_display: Option<String>,
}

/// The body portion of digested mail text: everything after the first blank
/// line, or the whole text when there is no header block.
fn body_after_headers(text: &str) -> &str {
    match text.split_once("\n\n") {
        Some((_, body)) => body,
        None => text,
    }
}

/// Compose the summarizer input for `mail`. A body shorter than
/// `min_body_len` characters triggers article enrichment: candidate links are
/// tried in ranked order and the first usable article is appended. Fetch
/// failures are logged and skipped; composition itself never fails.
pub async fn compose(
    mail: &FetchedMail,
    articles: &dyn ArticleReader,
    min_body_len: usize,
    budget: &TimeBudget,
) -> Composed {
    let mut text = strip_invisibles(&mail.text);
    if body_after_headers(&text).chars().count() >= min_body_len {
        return Composed {
            text,
            article_display: None,
        };
    }

    let mut article_display = None;
    for url in rank_article_urls(&mail.urls)
        .into_iter()
        .take(MAX_URL_ATTEMPTS)
    {
        if budget.exhausted() {
            debug!(message = %mail.id, "Budget exhausted; skipping remaining article links");
            break;
        }
        match articles.fetch_article(&url).await {
            Ok(Some(article)) => {
                text.push_str(&format!("\n\n[linked article] {url}\n\n{}", article.markdown));
                article_display = article.published_display.clone();
                break;
            }
            Ok(None) => {
                debug!(message = %mail.id, url = %url, "Article unusable; trying next link");
            }
            Err(e) => {
                warn!(message = %mail.id, url = %url, error = %e, "Article fetch failed");
            }
        }
    }

    Composed {
        text,
        article_display,
    }
}

/// Render the detected-date marker. An empty display renders as
/// `undetermined` so the marker is always present and parseable.
pub fn date_marker(display: &str, source: DateSource) -> String {
    let shown = if display.is_empty() {
        "undetermined"
    } else {
        display
    };
    format!("[DETECTED_DATE_KST:{shown}|SOURCE:{source}]")
}

/// Prefix `text` with the detected-date marker line.
pub fn with_date_marker(text: &str, display: &str, source: DateSource) -> String {
    format!("{}\n{}", date_marker(display, source), text)
}
