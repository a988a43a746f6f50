//! Topic output types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unique identifier for a topic.
pub type TopicId = String;

/// Link metadata extracted from a message payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInfo {
    /// Shared page title
    pub title: Option<String>,
    /// Short description shown in the share card
    pub description: Option<String>,
    /// Target URL
    pub url: Option<String>,
}

impl LinkInfo {
    /// Build link info, returning `None` unless a title or URL is present.
    pub fn from_parts(
        title: Option<String>,
        description: Option<String>,
        url: Option<String>,
    ) -> Option<Self> {
        if title.is_none() && url.is_none() {
            return None;
        }
        Some(Self {
            title,
            description,
            url,
        })
    }
}

/// Denormalized copy of one message kept on the topic for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSnapshot {
    pub msg_id: String,
    pub sender_name: String,
    pub content: String,
    pub timestamp: i64,
    pub msg_type: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Link card parsed from the payload, if any
    #[serde(default)]
    pub link: Option<LinkInfo>,
}

/// A reconstructed conversation thread.
///
/// Created once at the end of a pipeline run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Deterministic digest of the first message (12 hex chars)
    pub topic_id: TopicId,
    /// Member message ids in chronological order
    pub message_ids: Vec<String>,
    /// First substantive message, truncated
    pub title: String,
    /// Unique sender names in order of first appearance
    pub participants: Vec<String>,
    /// Sender of the first message
    pub initiator: String,
    /// Earliest member timestamp (seconds)
    pub start_time: i64,
    /// Latest member timestamp (seconds)
    pub end_time: i64,
    /// Short digest of the opening messages
    pub conclusion: Option<String>,
    pub message_count: usize,
    pub messages: Vec<MessageSnapshot>,
}

impl Topic {
    pub fn start_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.start_time, 0)
    }

    pub fn end_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.end_time, 0)
    }

    /// Seconds between the first and last message.
    pub fn duration_seconds(&self) -> i64 {
        self.end_time.saturating_sub(self.start_time)
    }

    /// Check whether a message belongs to this topic.
    pub fn contains(&self, msg_id: &str) -> bool {
        self.message_ids.iter().any(|id| id == msg_id)
    }
}
