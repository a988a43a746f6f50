//! Quality filter over merged groups.

use crate::group::Group;

/// Keep groups with at least `min_messages` messages, preserving order.
pub fn filter_groups<'a>(groups: Vec<Group<'a>>, min_messages: usize) -> Vec<Group<'a>> {
    groups
        .into_iter()
        .filter(|group| group.len() >= min_messages)
        .collect()
}
