//! Abstractions over the external services the poller touches.
//!
//! The poll loop only sees these traits, so every scenario in the
//! integration tests runs against in-memory mocks: no mailbox account,
//! no API keys, no network. `cargo test` finishes in seconds.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use mailbox_client::{extract_urls, MailboxClient};
use wirebrief_archive::{ArticleFetcher, FetchedArticle};
use wirebrief_common::strip_invisibles;

/// A mail message digested into the fields the pipeline needs.
#[derive(Debug, Clone, Default)]
pub struct FetchedMail {
    pub id: String,
    pub subject: String,
    pub sender: String,
    /// Headers-plus-body text, invisible characters stripped.
    pub text: String,
    /// Candidate article links in order of appearance.
    pub urls: Vec<String>,
    pub header_date: Option<DateTime<Utc>>,
    pub internal_ms: Option<i64>,
}

/// Searches and reads a mailbox.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Return up to `max_results` message ids matching `query`, newest first.
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<String>>;

    /// Fetch one message and digest it for processing.
    async fn fetch(&self, id: &str) -> Result<FetchedMail>;

    /// Attach a label to a message.
    async fn label(&self, id: &str, name: &str) -> Result<()>;
}

/// Downloads and cleans a linked news article.
#[async_trait]
pub trait ArticleReader: Send + Sync {
    /// `Ok(None)` means the page was unusable (error status, boilerplate only);
    /// `Err` means the request itself failed.
    async fn fetch_article(&self, url: &str) -> Result<Option<FetchedArticle>>;
}

/// Turns raw mail text into a markdown brief.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String>;
}

/// Persists finished briefs.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn write(&self, filename: &str, content: &str) -> Result<PathBuf>;
}

#[async_trait]
impl Mailbox for MailboxClient {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<String>> {
        Ok(self.search(query, max_results).await?)
    }

    async fn fetch(&self, id: &str) -> Result<FetchedMail> {
        let msg = self.message(id).await?;
        let text = self.message_text(&msg).await;
        Ok(FetchedMail {
            id: msg.id.clone(),
            subject: strip_invisibles(&msg.subject()),
            sender: msg.sender(),
            text: strip_invisibles(&text),
            urls: extract_urls(&msg),
            header_date: msg.header_date(),
            internal_ms: msg.internal_date_ms(),
        })
    }

    async fn label(&self, id: &str, name: &str) -> Result<()> {
        Ok(self.add_label(id, name).await?)
    }
}

#[async_trait]
impl ArticleReader for ArticleFetcher {
    async fn fetch_article(&self, url: &str) -> Result<Option<FetchedArticle>> {
        Ok(self.fetch_article(url).await?)
    }
}

/// Timeout for article downloads, shorter than the mailbox timeout.
pub const ARTICLE_TIMEOUT: Duration = Duration::from_secs(15);
