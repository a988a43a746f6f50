//! Reply-chain linking.
//!
//! If message A quotes message B, A's group and B's group belong to the same
//! topic no matter how far apart they are in time. Relations are collected
//! over the whole run and merged transitively with a union-find.

use std::collections::HashMap;

use crate::diagnostics::{DiagnosticsSink, Stage};
use crate::group::{merge_groups, Group};
use crate::payload::PayloadParser;
use crate::union_find::UnionFind;

/// A quote from one group's message to another group's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRelation {
    pub reply_msg_id: String,
    pub quoted_msg_id: String,
    pub reply_group: usize,
    pub quoted_group: usize,
}

/// Merges groups connected by quoted replies.
pub struct ReplyChainLinker<'p> {
    parser: &'p dyn PayloadParser,
    diagnostics: &'p dyn DiagnosticsSink,
}

impl<'p> ReplyChainLinker<'p> {
    pub fn new(parser: &'p dyn PayloadParser, diagnostics: &'p dyn DiagnosticsSink) -> Self {
        Self {
            parser,
            diagnostics,
        }
    }

    /// Collect every reply relation whose both ends are in `groups`.
    pub fn relations(&self, groups: &[Group<'_>]) -> Vec<ReplyRelation> {
        let mut group_of: HashMap<&str, usize> = HashMap::new();
        for (idx, group) in groups.iter().enumerate() {
            for msg_id in group.message_ids() {
                group_of.insert(msg_id, idx);
            }
        }

        let mut relations = Vec::new();
        for (reply_group, group) in groups.iter().enumerate() {
            for message in group.messages() {
                let Some(payload) = message.raw_payload.as_deref() else {
                    continue;
                };

                let quoted = match self.parser.quoted_message_id(payload) {
                    Ok(Some(quoted)) => quoted,
                    Ok(None) => continue,
                    Err(e) => {
                        self.diagnostics.debug(
                            Stage::ReplyChain,
                            format!("Failed to extract quoted msg id from {}: {}", message.msg_id, e),
                        );
                        continue;
                    }
                };

                match group_of.get(quoted.as_str()) {
                    Some(&quoted_group) => relations.push(ReplyRelation {
                        reply_msg_id: message.msg_id.clone(),
                        quoted_msg_id: quoted,
                        reply_group,
                        quoted_group,
                    }),
                    None => self.diagnostics.debug(
                        Stage::ReplyChain,
                        format!(
                            "Skipping reply {} -> {}: quoted message not in input",
                            message.msg_id, quoted
                        ),
                    ),
                }
            }
        }

        relations
    }

    /// Merge reply-connected groups.
    ///
    /// Merged groups are ordered by their earliest constituent group and
    /// re-sorted by timestamp. Unrelated groups pass through untouched.
    pub fn link<'a>(&self, groups: Vec<Group<'a>>) -> Vec<Group<'a>> {
        let relations = self.relations(&groups);
        self.merge(groups, &relations)
    }

    /// Merge groups along already collected relations.
    pub fn merge<'a>(&self, groups: Vec<Group<'a>>, relations: &[ReplyRelation]) -> Vec<Group<'a>> {
        if relations.is_empty() {
            return groups;
        }

        self.diagnostics.info(
            Stage::ReplyChain,
            format!("Found {} reply relations", relations.len()),
        );

        let mut uf = UnionFind::new(groups.len());
        for relation in relations {
            uf.union(relation.reply_group, relation.quoted_group);
        }

        let mut slots: Vec<Option<Group<'a>>> = groups.into_iter().map(Some).collect();
        uf.groups()
            .into_iter()
            .filter_map(|members| {
                if members.len() == 1 {
                    return slots[members[0]].take();
                }
                merge_groups(members.into_iter().filter_map(|idx| slots[idx].take()))
            })
            .collect()
    }
}
