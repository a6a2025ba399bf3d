//! Mock collaborators for pipeline tests.
//!
//! One mock per trait seam:
//! - [`MockMailbox`]: canned search results and digested messages
//! - [`MockArticleReader`]: canned articles keyed by url
//! - [`MockSummarizer`]: fixed output, records every input
//! - [`MemoryReportSink`]: collects briefs in memory
//!
//! Plus builders for test mail and test configuration.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use wirebrief_archive::FetchedArticle;
use wirebrief_common::Config;

use crate::traits::{ArticleReader, FetchedMail, Mailbox, ReportSink, Summarizer};

// ---------------------------------------------------------------------------
// MockMailbox
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockMailbox {
    searches: HashMap<String, Vec<String>>,
    messages: HashMap<String, FetchedMail>,
    labels: Mutex<Vec<(String, String)>>,
    failing_search: bool,
    failing_labels: bool,
}

impl MockMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_search(mut self, query: &str, ids: &[&str]) -> Self {
        self.searches
            .insert(query.to_string(), ids.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn on_message(mut self, mail: FetchedMail) -> Self {
        self.messages.insert(mail.id.clone(), mail);
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.failing_search = true;
        self
    }

    pub fn failing_labels(mut self) -> Self {
        self.failing_labels = true;
        self
    }

    /// Labels recorded as (message id, label name) pairs.
    pub fn labels_added(&self) -> Vec<(String, String)> {
        self.labels.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailbox for MockMailbox {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<String>> {
        if self.failing_search {
            bail!("MockMailbox: search configured to fail");
        }
        let ids = self
            .searches
            .get(query)
            .ok_or_else(|| anyhow!("MockMailbox: no search registered for {query}"))?;
        Ok(ids.iter().take(max_results as usize).cloned().collect())
    }

    async fn fetch(&self, id: &str) -> Result<FetchedMail> {
        self.messages
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("MockMailbox: no message registered for {id}"))
    }

    async fn label(&self, id: &str, name: &str) -> Result<()> {
        if self.failing_labels {
            bail!("MockMailbox: labeling configured to fail");
        }
        self.labels
            .lock()
            .unwrap()
            .push((id.to_string(), name.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockArticleReader
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockArticleReader {
    articles: HashMap<String, FetchedArticle>,
    absent: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockArticleReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_article(mut self, article: FetchedArticle) -> Self {
        self.articles.insert(article.url.clone(), article);
        self
    }

    /// Url that fetches cleanly but yields no usable article.
    pub fn absent(mut self, url: &str) -> Self {
        self.absent.insert(url.to_string());
        self
    }

    /// Urls fetched, in call order.
    pub fn fetched_urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArticleReader for MockArticleReader {
    async fn fetch_article(&self, url: &str) -> Result<Option<FetchedArticle>> {
        self.calls.lock().unwrap().push(url.to_string());
        if self.absent.contains(url) {
            return Ok(None);
        }
        match self.articles.get(url) {
            Some(article) => Ok(Some(article.clone())),
            None => Err(anyhow!("MockArticleReader: no article registered for {url}")),
        }
    }
}

// ---------------------------------------------------------------------------
// MockSummarizer
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockSummarizer {
    output: Option<String>,
    failing: bool,
    inputs: Mutex<Vec<String>>,
}

impl MockSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, text: &str) -> Self {
        self.output = Some(text.to_string());
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Every input passed to [`Summarizer::summarize`], in call order.
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        self.inputs.lock().unwrap().push(text.to_string());
        if self.failing {
            bail!("MockSummarizer: configured to fail");
        }
        Ok(self
            .output
            .clone()
            .unwrap_or_else(|| "## Brief\n\n(mock)".to_string()))
    }
}

// ---------------------------------------------------------------------------
// MemoryReportSink
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryReportSink {
    written: Mutex<Vec<(String, String)>>,
    failing: bool,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Briefs recorded as (filename, content) pairs.
    pub fn written(&self) -> Vec<(String, String)> {
        self.written.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.written.lock().unwrap().len()
    }

    pub fn has_report_containing(&self, needle: &str) -> bool {
        self.written
            .lock()
            .unwrap()
            .iter()
            .any(|(name, content)| name.contains(needle) || content.contains(needle))
    }
}

#[async_trait]
impl ReportSink for MemoryReportSink {
    async fn write(&self, filename: &str, content: &str) -> Result<PathBuf> {
        if self.failing {
            bail!("MemoryReportSink: configured to fail");
        }
        self.written
            .lock()
            .unwrap()
            .push((filename.to_string(), content.to_string()));
        Ok(PathBuf::from(filename))
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Digested mail with the standard header block and the given body.
pub fn make_mail(id: &str, subject: &str, body: &str) -> FetchedMail {
    FetchedMail {
        id: id.to_string(),
        subject: subject.to_string(),
        sender: "news@example.com".to_string(),
        text: format!("Subject: {subject}\nFrom: news@example.com\n\n{body}"),
        urls: Vec::new(),
        header_date: None,
        internal_ms: None,
    }
}

/// Configuration for tests: local paths, no budgets, no allow-list.
pub fn test_config(state_file: &Path, output_dir: &Path) -> Config {
    Config {
        mailbox_base_url: "http://localhost:0".to_string(),
        mailbox_token: "test-token".to_string(),
        search_query: "label:breaking".to_string(),
        processed_label: None,
        openai_api_key: "test-key".to_string(),
        openai_base_url: None,
        openai_model: "gpt-4o".to_string(),
        poll_interval_secs: 30,
        poll_batch: 10,
        idle_backoff_max_secs: 300,
        network_timeout_secs: 30,
        min_body_len: 120,
        overall_budget_secs: None,
        per_message_budget_secs: None,
        allowed_tickers: HashSet::new(),
        state_file: state_file.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
    }
}
