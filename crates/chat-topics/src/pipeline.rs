//! Topic building pipeline.
//!
//! Runs the stages in strict sequence over one in-memory collection:
//! time-window grouping, reply linking, semantic merging, quality filtering
//! and topic assembly.
//!
//! ## Usage
//!
//! ```rust
//! use chat_topics::TopicBuilder;
//! use chat_types::ChatMessage;
//!
//! let messages = vec![
//!     ChatMessage::new("m1", 0, "u1", "Alice", "anyone tried the new release?"),
//!     ChatMessage::new("m2", 5, "u2", "Bob", "yes, works fine"),
//! ];
//!
//! let topics = TopicBuilder::default().run(&messages);
//! assert_eq!(topics.len(), 1);
//! assert_eq!(topics[0].participants, vec!["Alice", "Bob"]);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use chat_types::{ChatMessage, Topic, TopicBuilderConfig};

use crate::assembler::TopicAssembler;
use crate::diagnostics::{DiagnosticsSink, Stage, TracingSink};
use crate::error::TopicsError;
use crate::filter::filter_groups;
use crate::payload::{PayloadParser, XmlPayloadParser};
use crate::reply::ReplyChainLinker;
use crate::semantic::SemanticMerger;
use crate::window::group_by_time_window;

/// Group counts observed after each stage of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Messages handed to the run
    pub input_messages: usize,
    /// Groups after time-window grouping
    pub window_groups: usize,
    /// Quote references resolved inside the input
    pub reply_relations: usize,
    /// Groups after reply linking
    pub reply_groups: usize,
    /// Groups after semantic merging
    pub semantic_groups: usize,
    /// Groups kept by the quality filter
    pub topics: usize,
}

impl BuildReport {
    /// Groups dropped by the quality filter.
    pub fn filtered_out(&self) -> usize {
        self.semantic_groups - self.topics
    }
}

/// Topics plus the stage report of the run that produced them.
#[derive(Debug, Clone)]
pub struct TopicBuild {
    pub topics: Vec<Topic>,
    pub report: BuildReport,
}

/// Reconstructs topics from a flat message collection.
///
/// Holds configuration and collaborators only; every run is independent.
pub struct TopicBuilder {
    config: TopicBuilderConfig,
    parser: Arc<dyn PayloadParser>,
    diagnostics: Arc<dyn DiagnosticsSink>,
}

impl TopicBuilder {
    /// Create a builder with the XML payload parser and tracing diagnostics.
    pub fn new(config: TopicBuilderConfig) -> Self {
        Self {
            config,
            parser: Arc::new(XmlPayloadParser::new()),
            diagnostics: Arc::new(TracingSink),
        }
    }

    /// Create a builder after validating the configuration.
    pub fn try_new(config: TopicBuilderConfig) -> Result<Self, TopicsError> {
        config.validate().map_err(TopicsError::InvalidConfig)?;
        Ok(Self::new(config))
    }

    /// Replace the payload parser.
    pub fn with_parser(mut self, parser: Arc<dyn PayloadParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Replace the diagnostics sink.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn config(&self) -> &TopicBuilderConfig {
        &self.config
    }

    /// Build topics from messages in any order.
    pub fn run(&self, messages: &[ChatMessage]) -> Vec<Topic> {
        self.run_with_report(messages).topics
    }

    /// Build topics and report per-stage group counts.
    pub fn run_with_report(&self, messages: &[ChatMessage]) -> TopicBuild {
        let config = &self.config;
        let diagnostics = self.diagnostics.as_ref();
        let parser = self.parser.as_ref();

        let mut report = BuildReport {
            input_messages: messages.len(),
            ..BuildReport::default()
        };

        if messages.is_empty() {
            diagnostics.info(Stage::Pipeline, "No messages to process".to_string());
            return TopicBuild {
                topics: Vec::new(),
                report,
            };
        }

        diagnostics.info(
            Stage::Pipeline,
            format!("Building topics from {} messages", messages.len()),
        );

        let mut sorted: Vec<&ChatMessage> = messages.iter().collect();
        sorted.sort_by_key(|m| m.timestamp);

        // 1. Time windows
        let groups = group_by_time_window(&sorted, config.time_window, config.enable_adaptive_window);
        report.window_groups = groups.len();
        diagnostics.info(
            Stage::TimeWindow,
            format!("Time-window grouping produced {} groups", groups.len()),
        );

        // 2. Reply chains
        let groups = if config.enable_reply_chain {
            let linker = ReplyChainLinker::new(parser, diagnostics);
            let relations = linker.relations(&groups);
            report.reply_relations = relations.len();
            let linked = linker.merge(groups, &relations);
            diagnostics.info(
                Stage::ReplyChain,
                format!("Reply linking left {} groups", linked.len()),
            );
            linked
        } else {
            groups
        };
        report.reply_groups = groups.len();

        // 3. Semantic similarity
        let groups = if config.enable_semantic {
            let merged = SemanticMerger::new(config.semantic_threshold, diagnostics)
                .with_max_features(config.max_features)
                .merge(groups);
            diagnostics.info(
                Stage::Semantic,
                format!("Semantic merging left {} groups", merged.len()),
            );
            merged
        } else {
            groups
        };
        report.semantic_groups = groups.len();

        // 4. Quality filter
        let groups = filter_groups(groups, config.min_messages);
        report.topics = groups.len();
        diagnostics.info(
            Stage::QualityFilter,
            format!(
                "Kept {} groups with at least {} messages",
                groups.len(),
                config.min_messages
            ),
        );

        // 5. Assembly
        let assembler = TopicAssembler::new(parser, diagnostics);
        let topics: Vec<Topic> = groups.iter().map(|group| assembler.assemble(group)).collect();
        diagnostics.info(
            Stage::Assembly,
            format!("Assembled {} topics", topics.len()),
        );

        TopicBuild { topics, report }
    }
}

impl Default for TopicBuilder {
    fn default() -> Self {
        Self::new(TopicBuilderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticLevel, MemorySink};
    use crate::group::Group;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn msg(id: &str, ts: i64, sender: &str, content: &str) -> ChatMessage {
        ChatMessage::new(id, ts, format!("id_{sender}"), sender, content)
    }

    fn builder_with_sink(config: TopicBuilderConfig) -> (TopicBuilder, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let builder = TopicBuilder::new(config).with_diagnostics(sink.clone());
        (builder, sink)
    }

    #[test]
    fn test_empty_input_runs_no_stage() {
        let (builder, sink) = builder_with_sink(TopicBuilderConfig::default());
        let build = builder.run_with_report(&[]);

        assert!(build.topics.is_empty());
        assert_eq!(build.report, BuildReport::default());
        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].stage, Stage::Pipeline);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let messages = vec![
            msg("m3", 20, "Alice", "third"),
            msg("m1", 0, "Alice", "first"),
            msg("m2", 10, "Bob", "second"),
        ];
        let topics = TopicBuilder::default().run(&messages);

        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].message_ids, vec!["m1", "m2", "m3"]);
        assert_eq!(topics[0].title, "first");
    }

    #[test]
    fn test_report_counts_stages() {
        let messages = vec![
            msg("svrid_1", 0, "Alice", "deploy the staging cluster"),
            msg("svrid_2", 5, "Bob", "on it"),
            msg("svrid_3", 2000, "Carol", "lunch?"),
            msg("svrid_4", 4000, "Bob", "done").with_payload(
                "<msg><appmsg><title>done</title><refermsg><svrid>1</svrid></refermsg></appmsg></msg>",
            ),
        ];
        let (builder, sink) = builder_with_sink(TopicBuilderConfig::default());
        let build = builder.run_with_report(&messages);

        assert_eq!(build.report.input_messages, 4);
        assert_eq!(build.report.window_groups, 3);
        assert_eq!(build.report.reply_relations, 1);
        assert_eq!(build.report.reply_groups, 2);
        assert_eq!(build.report.semantic_groups, 2);
        assert_eq!(build.report.topics, 1);
        assert_eq!(build.report.filtered_out(), 1);

        assert_eq!(build.topics.len(), 1);
        assert_eq!(
            build.topics[0].message_ids,
            vec!["svrid_1", "svrid_2", "svrid_4"]
        );

        for stage in [
            Stage::TimeWindow,
            Stage::ReplyChain,
            Stage::Semantic,
            Stage::QualityFilter,
            Stage::Assembly,
        ] {
            assert!(
                !sink.filtered(stage, DiagnosticLevel::Info).is_empty(),
                "missing info diagnostic for {stage}"
            );
        }
    }

    #[test]
    fn test_disabled_stages_pass_through() {
        let messages = vec![
            msg("svrid_1", 0, "Alice", "rust release notes"),
            msg("svrid_2", 1000, "Bob", "rust release notes").with_payload(
                "<msg><refermsg><svrid>1</svrid></refermsg></msg>",
            ),
        ];
        let config = TopicBuilderConfig {
            enable_reply_chain: false,
            enable_semantic: false,
            min_messages: 1,
            ..TopicBuilderConfig::default()
        };
        let build = TopicBuilder::new(config).run_with_report(&messages);

        assert_eq!(build.report.reply_relations, 0);
        assert_eq!(build.report.window_groups, 2);
        assert_eq!(build.report.reply_groups, 2);
        assert_eq!(build.report.semantic_groups, 2);
        assert_eq!(build.topics.len(), 2);
    }

    #[test]
    fn test_fixed_window_when_adaptive_disabled() {
        // Sparse opening pair widens the adaptive window to 600s; the fixed
        // 300s window splits off the 400s gap.
        let messages = vec![
            msg("m1", 0, "Alice", "alpha"),
            msg("m2", 250, "Bob", "beta"),
            msg("m3", 650, "Carol", "gamma"),
        ];

        let adaptive = TopicBuilderConfig {
            enable_semantic: false,
            ..TopicBuilderConfig::default()
        };
        let fixed = TopicBuilderConfig {
            enable_adaptive_window: false,
            ..adaptive.clone()
        };

        assert_eq!(TopicBuilder::new(adaptive).run_with_report(&messages).report.window_groups, 1);
        assert_eq!(TopicBuilder::new(fixed).run_with_report(&messages).report.window_groups, 2);
    }

    #[test]
    fn test_try_new_rejects_invalid_config() {
        let config = TopicBuilderConfig {
            semantic_threshold: 1.5,
            ..TopicBuilderConfig::default()
        };
        assert!(matches!(
            TopicBuilder::try_new(config),
            Err(TopicsError::InvalidConfig(_))
        ));
        assert!(TopicBuilder::try_new(TopicBuilderConfig::default()).is_ok());
    }

    #[test]
    fn test_builder_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TopicBuilder>();
    }

    fn arb_messages() -> impl Strategy<Value = Vec<ChatMessage>> {
        let words = prop::sample::select(vec![
            "rust", "release", "lunch", "deploy", "[image]", "github", "bug", "",
        ]);
        prop::collection::vec((0i64..5_000, 0usize..4, prop::collection::vec(words, 0..4)), 1..40)
            .prop_map(|rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (ts, sender, words))| {
                        let name = format!("user{sender}");
                        ChatMessage::new(format!("svrid_{i}"), ts, name.clone(), name, words.join(" "))
                    })
                    .collect()
            })
    }

    fn id_set<'a>(groups: &[Group<'a>]) -> (usize, HashSet<&'a str>) {
        let ids: Vec<&str> = groups.iter().flat_map(|g| g.message_ids()).collect();
        let total = ids.len();
        (total, ids.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_stages_preserve_partition(messages in arb_messages()) {
            let mut sorted: Vec<&ChatMessage> = messages.iter().collect();
            sorted.sort_by_key(|m| m.timestamp);
            let input: HashSet<&str> = messages.iter().map(|m| m.msg_id.as_str()).collect();

            let parser = XmlPayloadParser::new();
            let sink = MemorySink::new();

            let groups = group_by_time_window(&sorted, 300, true);
            let (total, ids) = id_set(&groups);
            prop_assert_eq!(total, messages.len());
            prop_assert_eq!(&ids, &input);

            let groups = ReplyChainLinker::new(&parser, &sink).link(groups);
            let (total, ids) = id_set(&groups);
            prop_assert_eq!(total, messages.len());
            prop_assert_eq!(&ids, &input);

            let groups = SemanticMerger::new(0.3, &sink).merge(groups);
            let (total, ids) = id_set(&groups);
            prop_assert_eq!(total, messages.len());
            prop_assert_eq!(&ids, &input);

            for group in &groups {
                let ts: Vec<i64> = group.messages().iter().map(|m| m.timestamp).collect();
                prop_assert!(ts.windows(2).all(|w| w[0] <= w[1]));
            }
        }

        #[test]
        fn prop_topics_meet_min_messages(messages in arb_messages(), min in 1usize..5) {
            let config = TopicBuilderConfig { min_messages: min, ..TopicBuilderConfig::default() };
            let (builder, _sink) = builder_with_sink(config);
            let build = builder.run_with_report(&messages);

            prop_assert!(build.topics.iter().all(|t| t.message_count >= min));
            prop_assert_eq!(build.topics.len(), build.report.topics);
        }
    }
}
