//! Topic assembly from final groups.

use md5::{Digest, Md5};

use chat_types::{ChatMessage, LinkInfo, MessageSnapshot, Topic, TopicId};

use crate::diagnostics::{DiagnosticsSink, Stage};
use crate::group::{is_media_placeholder, Group};
use crate::payload::PayloadParser;

/// Title used when no message has usable text.
pub const FALLBACK_TITLE: &str = "unknown topic";

const TITLE_MAX_CHARS: usize = 50;
const CONCLUSION_MESSAGES: usize = 5;
const CONCLUSION_PART_MAX_CHARS: usize = 100;
const CONCLUSION_MAX_CHARS: usize = 300;
const STICKER_PLACEHOLDERS: &[&str] = &["[sticker]", "[表情]"];

/// Deterministic topic id from the group's first message.
///
/// First 12 hex digits of `md5("{timestamp}_{sender_id}_{msg_id}")`.
pub fn topic_id(first: &ChatMessage) -> TopicId {
    let mut hasher = Md5::new();
    hasher.update(format!("{}_{}_{}", first.timestamp, first.sender_id, first.msg_id).as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..12].to_string()
}

fn is_title_placeholder(content: &str) -> bool {
    is_media_placeholder(content) || STICKER_PLACEHOLDERS.contains(&content)
}

fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

/// Title from the first substantive message.
pub fn generate_title(messages: &[&ChatMessage]) -> String {
    let Some(content) = messages
        .iter()
        .map(|m| m.content.trim())
        .find(|content| !content.is_empty() && !is_title_placeholder(content))
    else {
        return FALLBACK_TITLE.to_string();
    };

    let collapsed = content.split_whitespace().collect::<Vec<_>>().join(" ");
    match truncate_chars(&collapsed, TITLE_MAX_CHARS) {
        (head, true) => format!("{}...", head),
        (head, false) => head.to_string(),
    }
}

/// Short digest of the opening substantive messages.
///
/// `None` for single-message groups or when nothing substantive was said.
pub fn generate_conclusion(messages: &[&ChatMessage]) -> Option<String> {
    if messages.len() < 2 {
        return None;
    }

    let parts: Vec<&str> = messages
        .iter()
        .map(|m| m.content.trim())
        .filter(|content| !content.is_empty() && !is_media_placeholder(content))
        .take(CONCLUSION_MESSAGES)
        .map(|content| truncate_chars(content, CONCLUSION_PART_MAX_CHARS).0.trim())
        .collect();

    if parts.is_empty() {
        return None;
    }

    let joined = parts.join(" | ");
    Some(match truncate_chars(&joined, CONCLUSION_MAX_CHARS) {
        (head, true) => format!("{}...", head),
        (head, false) => head.to_string(),
    })
}

/// Unique sender names in order of first appearance.
fn participants(messages: &[&ChatMessage]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for message in messages {
        if !names.iter().any(|name| name == &message.sender_name) {
            names.push(message.sender_name.clone());
        }
    }
    names
}

/// Turns final groups into immutable topics.
pub struct TopicAssembler<'p> {
    parser: &'p dyn PayloadParser,
    diagnostics: &'p dyn DiagnosticsSink,
}

impl<'p> TopicAssembler<'p> {
    pub fn new(parser: &'p dyn PayloadParser, diagnostics: &'p dyn DiagnosticsSink) -> Self {
        Self {
            parser,
            diagnostics,
        }
    }

    pub fn assemble(&self, group: &Group<'_>) -> Topic {
        let messages = group.messages();
        let first = group.first();

        Topic {
            topic_id: topic_id(first),
            message_ids: group.message_ids().map(String::from).collect(),
            title: generate_title(messages),
            participants: participants(messages),
            initiator: first.sender_name.clone(),
            start_time: messages.iter().map(|m| m.timestamp).min().unwrap_or(first.timestamp),
            end_time: messages.iter().map(|m| m.timestamp).max().unwrap_or(first.timestamp),
            conclusion: generate_conclusion(messages),
            message_count: messages.len(),
            messages: messages.iter().map(|m| self.snapshot(m)).collect(),
        }
    }

    fn snapshot(&self, message: &ChatMessage) -> MessageSnapshot {
        MessageSnapshot {
            msg_id: message.msg_id.clone(),
            sender_name: message.sender_name.clone(),
            content: message.content.clone(),
            timestamp: message.timestamp,
            msg_type: message.msg_type.clone(),
            kind: message.kind.clone(),
            link: self.link(message),
        }
    }

    fn link(&self, message: &ChatMessage) -> Option<LinkInfo> {
        // An empty payload counts as absent.
        let payload = message.raw_payload.as_deref().filter(|p| !p.is_empty());
        let source = match payload {
            Some(payload) => payload,
            None if message.content.starts_with('<') => message.content.as_str(),
            None => return None,
        };

        match self.parser.link_info(source) {
            Ok(link) => link,
            Err(e) => {
                self.diagnostics.debug(
                    Stage::Assembly,
                    format!("Failed to extract link from {}: {}", message.msg_id, e),
                );
                None
            }
        }
    }
}
