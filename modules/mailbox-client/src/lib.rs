pub mod error;
pub mod extract;
pub mod message;
mod markdown;

pub use error::{MailboxError, Result};
pub use extract::extract_urls;
pub use message::{decode_base64url, Header, MailMessage, MessagePart, PartBody};

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

pub struct MailboxClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    messages: Option<Vec<MessageRef>>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AttachmentResponse {
    #[serde(default)]
    data: Option<String>,
}

impl MailboxClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Search for message ids matching a query, newest first.
    pub async fn search(&self, query: &str, max_results: u32) -> Result<Vec<String>> {
        let endpoint = format!("{}/messages", self.base_url);
        let max = max_results.to_string();

        let resp = self
            .client
            .get(&endpoint)
            .header("Authorization", self.bearer())
            .query(&[("q", query), ("maxResults", max.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(MailboxError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = resp.json().await?;
        Ok(body
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|m| m.id)
            .collect())
    }

    /// Fetch a full message, including its MIME payload tree.
    pub async fn message(&self, id: &str) -> Result<MailMessage> {
        let endpoint = format!("{}/messages/{}", self.base_url, id);

        let resp = self
            .client
            .get(&endpoint)
            .header("Authorization", self.bearer())
            .query(&[("format", "full")])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(MailboxError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }

    /// Fetch and decode an attachment body.
    pub async fn attachment(&self, message_id: &str, attachment_id: &str) -> Result<String> {
        let endpoint = format!(
            "{}/messages/{}/attachments/{}",
            self.base_url, message_id, attachment_id
        );

        let resp = self
            .client
            .get(&endpoint)
            .header("Authorization", self.bearer())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(MailboxError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: AttachmentResponse = resp.json().await?;
        Ok(decode_base64url(body.data.as_deref().unwrap_or_default()))
    }

    /// Add a label to a message.
    pub async fn add_label(&self, id: &str, label: &str) -> Result<()> {
        let endpoint = format!("{}/messages/{}/modify", self.base_url, id);
        let body = serde_json::json!({ "addLabelIds": [label] });

        let resp = self
            .client
            .post(&endpoint)
            .header("Authorization", self.bearer())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(MailboxError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    /// Readable text for a message: a Subject/From preamble plus the best
    /// available body (plain part, markdownified HTML, snippet, or a
    /// placeholder). Text attachments are loaded through the attachments
    /// endpoint; a failed part degrades to empty rather than failing the
    /// whole message.
    pub async fn message_text(&self, msg: &MailMessage) -> String {
        let (plain, html) = self.collect_text_parts(msg).await;
        let body = body_text(&plain, &html, &msg.snippet);
        format!("Subject: {}\nFrom: {}\n\n{}", msg.subject(), msg.sender(), body)
    }

    async fn collect_text_parts(&self, msg: &MailMessage) -> (String, String) {
        let mut plains: Vec<String> = Vec::new();
        let mut htmls: Vec<String> = Vec::new();
        let Some(payload) = &msg.payload else {
            return (String::new(), String::new());
        };

        for part in payload.walk() {
            let mime = part.mime_type.as_str();
            let content = match (&part.body.data, &part.body.attachment_id) {
                (Some(data), _) => decode_base64url(data),
                (None, Some(attachment_id)) if mime.starts_with("text/") => {
                    match self.attachment(&msg.id, attachment_id).await {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(message = %msg.id, error = %e, "Failed to load text attachment");
                            String::new()
                        }
                    }
                }
                _ => String::new(),
            };

            if content.is_empty() {
                continue;
            }
            if mime == "text/plain" {
                plains.push(content);
            } else if mime == "text/html" {
                htmls.push(content);
            }
        }

        (
            plains.join("\n").trim().to_string(),
            htmls.join("\n").trim().to_string(),
        )
    }
}

fn body_text(plain: &str, html: &str, snippet: &str) -> String {
    if !plain.is_empty() {
        plain.to_string()
    } else if !html.is_empty() {
        markdown::html_to_markdown(html)
    } else if !snippet.is_empty() {
        snippet.to_string()
    } else {
        "(empty)".to_string()
    }
}
