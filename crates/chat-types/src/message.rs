//! Chat message record.
//!
//! Messages are produced by an upstream export normalizer and are never
//! mutated by the topic pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// A single normalized chat message.
///
/// `msg_id` must be unique within the collection handed to one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message identifier
    pub msg_id: String,

    /// Source timestamp in seconds since the Unix epoch
    pub timestamp: i64,

    /// Stable sender identifier
    pub sender_id: String,

    /// Sender display name
    pub sender_name: String,

    /// Category tag assigned by the normalizer (text, link, image, ...)
    pub msg_type: String,

    /// Textual content, possibly a media placeholder such as `[image]`
    pub content: String,

    /// Raw export payload, only consulted for reference and link extraction
    #[serde(default, alias = "xml_content")]
    pub raw_payload: Option<String>,

    /// Export file or channel this message came from
    #[serde(default, alias = "source_file")]
    pub source: String,

    /// Finer-grained kind (system message, text message, ...)
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl ChatMessage {
    /// Create a plain text message without payload or kind.
    pub fn new(
        msg_id: impl Into<String>,
        timestamp: i64,
        sender_id: impl Into<String>,
        sender_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            msg_id: msg_id.into(),
            timestamp,
            sender_id: sender_id.into(),
            sender_name: sender_name.into(),
            msg_type: "text".to_string(),
            content: content.into(),
            raw_payload: None,
            source: String::new(),
            kind: None,
        }
    }

    /// Attach a raw payload.
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.raw_payload = Some(payload.into());
        self
    }

    /// Override the category tag.
    pub fn with_msg_type(mut self, msg_type: impl Into<String>) -> Self {
        self.msg_type = msg_type.into();
        self
    }

    /// Set the originating source identifier.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Timestamp as a UTC datetime, if it is in chrono's range.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// Parse a JSON array of messages.
    pub fn list_from_bytes(bytes: &[u8]) -> Result<Vec<Self>, ChatError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
