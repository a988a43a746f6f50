//! Semantic merging of groups by representative-text similarity.
//!
//! The merge is a single greedy pass and is not transitive: group `i`
//! absorbs every later group directly similar to it, and an absorbed group
//! never pulls in its own neighbours.

use crate::diagnostics::{DiagnosticsSink, Stage};
use crate::group::{is_media_placeholder, merge_groups, Group};
use crate::similarity::{similarity_matrix, zero_matrix};
use crate::tfidf::DEFAULT_MAX_FEATURES;

/// Messages sampled from the start of a group for its representative text.
const REPRESENTATIVE_MESSAGES: usize = 3;

/// Opening text of a group, skipping pure media placeholders.
pub fn representative_text(group: &Group<'_>) -> String {
    group
        .messages()
        .iter()
        .take(REPRESENTATIVE_MESSAGES)
        .map(|m| m.content.as_str())
        .filter(|content| !content.is_empty() && !is_media_placeholder(content))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Greedy single-pass merger over a TF-IDF similarity matrix.
pub struct SemanticMerger<'p> {
    threshold: f32,
    max_features: usize,
    diagnostics: &'p dyn DiagnosticsSink,
}

impl<'p> SemanticMerger<'p> {
    pub fn new(threshold: f32, diagnostics: &'p dyn DiagnosticsSink) -> Self {
        Self {
            threshold,
            max_features: DEFAULT_MAX_FEATURES,
            diagnostics,
        }
    }

    /// Override the TF-IDF vocabulary cap.
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    /// Pairwise similarity between the groups' representative texts.
    ///
    /// Falls back to an all-zero matrix, which merges nothing, if
    /// vectorization fails.
    pub fn similarities(&self, groups: &[Group<'_>]) -> Vec<Vec<f32>> {
        let texts: Vec<String> = groups.iter().map(representative_text).collect();
        match similarity_matrix(&texts, self.max_features) {
            Ok(matrix) => matrix,
            Err(e) => {
                self.diagnostics.warn(
                    Stage::Semantic,
                    format!("Failed to compute semantic similarities: {}", e),
                );
                zero_matrix(groups.len())
            }
        }
    }

    pub fn merge<'a>(&self, groups: Vec<Group<'a>>) -> Vec<Group<'a>> {
        if groups.len() < 2 {
            return groups;
        }

        let similarities = self.similarities(&groups);
        let n = groups.len();
        let mut consumed = vec![false; n];
        let mut slots: Vec<Option<Group<'a>>> = groups.into_iter().map(Some).collect();
        let mut merged_groups = Vec::with_capacity(n);

        for i in 0..n {
            if consumed[i] {
                continue;
            }
            consumed[i] = true;

            let mut members = vec![i];
            for j in (i + 1)..n {
                if !consumed[j] && similarities[i][j] >= self.threshold {
                    consumed[j] = true;
                    members.push(j);
                }
            }

            if members.len() > 1 {
                self.diagnostics.debug(
                    Stage::Semantic,
                    format!("Merging groups {:?} into group {}", &members[1..], i),
                );
            }

            if let Some(group) = merge_groups(members.into_iter().filter_map(|idx| slots[idx].take())) {
                merged_groups.push(group);
            }
        }

        merged_groups
    }
}
