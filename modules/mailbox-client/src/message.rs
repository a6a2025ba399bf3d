//! Wire model for mailbox messages.
//!
//! A message payload is a MIME tree: every node carries a mimeType, optional
//! inline base64url data or an attachment reference, and child parts. The
//! tree is walked with an explicit stack, never recursion; nesting depth is
//! attacker-controlled input.

use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wirebrief_common::datetime::parse_rfc2822;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MailMessage {
    pub id: String,
    pub snippet: String,
    pub internal_date: Option<String>,
    pub payload: Option<MessagePart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessagePart {
    pub mime_type: String,
    pub headers: Vec<Header>,
    pub body: PartBody,
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartBody {
    pub data: Option<String>,
    pub attachment_id: Option<String>,
    pub size: Option<u64>,
}

impl MailMessage {
    /// Header map with lowercased names.
    pub fn headers(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        if let Some(payload) = &self.payload {
            for header in &payload.headers {
                map.insert(header.name.to_lowercase(), header.value.clone());
            }
        }
        map
    }

    pub fn subject(&self) -> String {
        self.headers()
            .remove("subject")
            .unwrap_or_else(|| "(no subject)".to_string())
    }

    pub fn sender(&self) -> String {
        self.headers()
            .remove("from")
            .unwrap_or_else(|| "(unknown sender)".to_string())
    }

    /// RFC 2822 `Date` header, when present and parsable.
    pub fn header_date(&self) -> Option<DateTime<Utc>> {
        self.headers().get("date").and_then(|v| parse_rfc2822(v))
    }

    /// Mailbox receipt time in epoch milliseconds (the wire carries a string).
    pub fn internal_date_ms(&self) -> Option<i64> {
        self.internal_date.as_deref().and_then(|v| v.parse().ok())
    }
}

impl MessagePart {
    /// Iterate this part and every nested part in document order.
    pub fn walk(&self) -> PartIter<'_> {
        PartIter { stack: vec![self] }
    }
}

pub struct PartIter<'a> {
    stack: Vec<&'a MessagePart>,
}

impl<'a> Iterator for PartIter<'a> {
    type Item = &'a MessagePart;

    fn next(&mut self) -> Option<Self::Item> {
        let part = self.stack.pop()?;
        for child in part.parts.iter().rev() {
            self.stack.push(child);
        }
        Some(part)
    }
}

/// Decode base64url content, repairing missing padding.
/// Decode failures degrade to an empty string; a bad part is not an error.
pub fn decode_base64url(data: &str) -> String {
    let padding = (4 - data.len() % 4) % 4;
    let padded = format!("{}{}", data, "=".repeat(padding));
    match URL_SAFE.decode(padded.as_bytes()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}
