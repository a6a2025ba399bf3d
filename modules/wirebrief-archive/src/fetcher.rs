use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::debug;

use wirebrief_common::strip_invisibles;

use crate::dates;
use crate::error::Result;
use crate::readability;

// News sites serve junk to unknown agents; present as a desktop browser.
const ARTICLE_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";

// Anything below these is a consent wall, a stub, or a redirect shell.
const MIN_HTML_CHARS: usize = 800;
const MIN_CONTENT_CHARS: usize = 180;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));

/// Readable content extracted from one article page.
#[derive(Debug, Clone)]
pub struct FetchedArticle {
    pub url: String,
    pub title: String,
    pub markdown: String,
    pub published_display: Option<String>,
}

pub struct ArticleFetcher {
    client: reqwest::Client,
}

impl ArticleFetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }

    /// Fetch a URL and extract readable article content.
    ///
    /// `Ok(None)` means the page is not worth keeping: an error status, a
    /// near-empty response, or too little extractable text. Only transport
    /// failures surface as errors.
    pub async fn fetch_article(&self, url: &str) -> Result<Option<FetchedArticle>> {
        debug!(url, "Fetching article");

        let resp = self
            .client
            .get(url)
            .header("User-Agent", ARTICLE_UA)
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() >= 400 {
            debug!(url, status = status.as_u16(), "Article fetch rejected");
            return Ok(None);
        }

        let html = resp.text().await?;
        Ok(build_article(url, &html))
    }
}

/// Extraction pipeline, separated from transport.
pub(crate) fn build_article(url: &str, html: &str) -> Option<FetchedArticle> {
    let html = strip_invisibles(html);
    if html.chars().count() < MIN_HTML_CHARS {
        return None;
    }

    let published_display = dates::published_display(&html);

    let mut markdown = strip_invisibles(&readability::content_markdown(html.as_bytes(), Some(url)));
    if markdown.chars().count() < MIN_CONTENT_CHARS {
        let full = strip_invisibles(&readability::page_markdown(html.as_bytes(), Some(url)));
        if full.chars().count() > markdown.chars().count() {
            markdown = full;
        }
    }
    if markdown.chars().count() < MIN_CONTENT_CHARS {
        return None;
    }

    Some(FetchedArticle {
        url: url.to_string(),
        title: extract_title(&html),
        markdown,
        published_display,
    })
}

fn extract_title(html: &str) -> String {
    TITLE_RE
        .captures(html)
        .map(|cap| strip_invisibles(&cap[1]))
        .unwrap_or_default()
}
