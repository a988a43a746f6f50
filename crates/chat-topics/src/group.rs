//! Transient message groups built during one pipeline run.

use chat_types::ChatMessage;

/// Media placeholders that carry no text of their own.
pub const MEDIA_PLACEHOLDERS: &[&str] = &["[image]", "[voice]", "[video]", "[图片]", "[语音]", "[视频]"];

/// Check whether content is exactly a media placeholder.
pub fn is_media_placeholder(content: &str) -> bool {
    MEDIA_PLACEHOLDERS.contains(&content)
}

/// A non-empty, timestamp-ordered run of borrowed messages.
///
/// Groups are only ever merged, never split.
#[derive(Debug, Clone)]
pub struct Group<'a> {
    messages: Vec<&'a ChatMessage>,
}

impl<'a> Group<'a> {
    /// Start a group with its first message.
    pub fn new(first: &'a ChatMessage) -> Self {
        Self {
            messages: vec![first],
        }
    }

    /// Append a message. Callers keep the group sorted.
    pub fn push(&mut self, message: &'a ChatMessage) {
        self.messages.push(message);
    }

    /// Absorb another group's messages. Call [`Group::sort`] afterwards.
    pub fn absorb(&mut self, other: Group<'a>) {
        self.messages.extend(other.messages);
    }

    /// Stable sort by timestamp; ties keep their current order.
    pub fn sort(&mut self) {
        self.messages.sort_by_key(|m| m.timestamp);
    }

    pub fn messages(&self) -> &[&'a ChatMessage] {
        &self.messages
    }

    pub fn first(&self) -> &'a ChatMessage {
        self.messages[0]
    }

    pub fn last(&self) -> &'a ChatMessage {
        self.messages[self.messages.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Seconds between first and last message.
    pub fn span_seconds(&self) -> i64 {
        self.last().timestamp.saturating_sub(self.first().timestamp)
    }

    pub fn message_ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.messages.iter().map(|m| m.msg_id.as_str())
    }
}

/// Merge a set of groups into one, re-sorted by timestamp.
///
/// Returns `None` only when `groups` is empty.
pub fn merge_groups<'a>(groups: impl IntoIterator<Item = Group<'a>>) -> Option<Group<'a>> {
    let mut iter = groups.into_iter();
    let mut merged = iter.next()?;
    for group in iter {
        merged.absorb(group);
    }
    merged.sort();
    Some(merged)
}
