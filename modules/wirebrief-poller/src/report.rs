//! Brief persistence as markdown files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;

use crate::traits::ReportSink;

/// Filename for one brief: UTC timestamp plus the unit key, with any path
/// separators in the key flattened.
pub fn report_filename(unit_key: &str) -> String {
    format!(
        "{}_{}.md",
        Utc::now().format("%Y%m%d-%H%M%S"),
        unit_key.replace('/', "_")
    )
}

/// [`ReportSink`] writing briefs into a local directory.
pub struct MarkdownWriter {
    out_dir: PathBuf,
}

impl MarkdownWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

#[async_trait]
impl ReportSink for MarkdownWriter {
    async fn write(&self, filename: &str, content: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.out_dir)
            .await
            .with_context(|| format!("create output dir {}", self.out_dir.display()))?;
        let path = self.out_dir.join(filename);
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("write brief {}", path.display()))?;
        Ok(path)
    }
}
