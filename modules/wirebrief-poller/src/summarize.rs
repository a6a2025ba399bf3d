//! Brief generation over the OpenAI chat API.

use anyhow::Result;
use async_trait::async_trait;

use ai_client::{Message, OpenAi};
use wirebrief_common::WirebriefError;

use crate::traits::Summarizer;

/// Inputs shorter than this cannot anchor a factual brief and are rejected
/// before any API call.
pub const MIN_SUMMARY_INPUT_CHARS: usize = 80;

const SYSTEM_PROMPT: &str = "You are a precise financial news editor. Use ONLY facts stated in the \
raw text you are given. Do not invent numbers, dates, or quotes. If a detail is missing, leave \
it out.";

const BRIEF_TEMPLATE: &str = r#"Write a markdown brief for the stock alert in the raw text.

Shape:

# {TICKER} — {one-line headline}

**Detected (KST):** {copy the DETECTED_DATE_KST marker value verbatim}

## What happened
{two to four sentences}

## Why it matters
{one to three sentences}

## Numbers
{bullet list of every figure in the text, or "None reported."}

The raw text follows in the next message."#;

/// [`Summarizer`] backed by an OpenAI chat model.
pub struct NewsSummarizer {
    agent: OpenAi,
}

impl NewsSummarizer {
    pub fn new(api_key: &str, model: &str, base_url: Option<&str>) -> Self {
        let mut agent = OpenAi::new(api_key, model);
        if let Some(url) = base_url {
            agent = agent.with_base_url(url);
        }
        Self { agent }
    }
}

#[async_trait]
impl Summarizer for NewsSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        let trimmed = text.trim();
        let len = trimmed.chars().count();
        if len < MIN_SUMMARY_INPUT_CHARS {
            return Err(WirebriefError::InputTooShort {
                len,
                min: MIN_SUMMARY_INPUT_CHARS,
            }
            .into());
        }

        self.agent
            .chat(vec![
                Message::system(SYSTEM_PROMPT),
                Message::user(BRIEF_TEMPLATE),
                Message::user(trimmed),
            ])
            .await
    }
}
