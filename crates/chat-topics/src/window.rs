//! Time-window grouping.
//!
//! Splits a timestamp-sorted message stream into contiguous groups. A new
//! group starts whenever the gap to the previous message exceeds a window
//! that adapts to how dense the current group is. The decision only looks
//! at messages already placed.

use tracing::trace;

use chat_types::ChatMessage;

use crate::group::Group;

/// Compute the gap window (seconds) for the group built so far.
///
/// Density is messages per minute over the group's span. Dense groups get a
/// tighter window, sparse ones a wider one. Groups with fewer than two
/// messages, or adaptive mode off, use `base_window` as is.
pub fn adaptive_window(group: &[&ChatMessage], base_window: i64, adaptive: bool) -> i64 {
    if !adaptive || group.len() < 2 {
        return base_window;
    }

    let count = group.len() as f64;
    let span = group[group.len() - 1]
        .timestamp
        .saturating_sub(group[0].timestamp);
    let density = if span == 0 {
        count
    } else {
        count / span as f64 * 60.0
    };

    let factor = if density > 2.0 {
        0.5
    } else if density > 1.0 {
        1.0
    } else if density > 0.5 {
        1.5
    } else {
        2.0
    };

    (base_window as f64 * factor) as i64
}

/// Online builder that emits a group each time a gap boundary is crossed.
pub struct WindowGrouper<'a> {
    base_window: i64,
    adaptive: bool,
    current: Option<Group<'a>>,
}

impl<'a> WindowGrouper<'a> {
    pub fn new(base_window: i64, adaptive: bool) -> Self {
        Self {
            base_window,
            adaptive,
            current: None,
        }
    }

    /// Add the next message in timestamp order.
    ///
    /// Returns the closed group if this message started a new one.
    pub fn push(&mut self, message: &'a ChatMessage) -> Option<Group<'a>> {
        let Some(current) = self.current.as_mut() else {
            self.current = Some(Group::new(message));
            return None;
        };

        let window = adaptive_window(current.messages(), self.base_window, self.adaptive);
        let gap = message.timestamp.saturating_sub(current.last().timestamp);

        trace!(
            msg_id = %message.msg_id,
            gap = gap,
            window = window,
            "Window check"
        );

        if gap <= window {
            current.push(message);
            return None;
        }

        self.current.replace(Group::new(message))
    }

    /// Close and return the group in progress, if any.
    pub fn flush(&mut self) -> Option<Group<'a>> {
        self.current.take()
    }

    pub fn has_pending(&self) -> bool {
        self.current.is_some()
    }
}

/// Partition sorted messages into time-window groups.
///
/// Every input message lands in exactly one group, in input order.
pub fn group_by_time_window<'a>(
    sorted: &[&'a ChatMessage],
    base_window: i64,
    adaptive: bool,
) -> Vec<Group<'a>> {
    let mut grouper = WindowGrouper::new(base_window, adaptive);
    let mut groups = Vec::new();

    for message in sorted {
        if let Some(group) = grouper.push(message) {
            groups.push(group);
        }
    }

    if let Some(group) = grouper.flush() {
        groups.push(group);
    }

    groups
}
