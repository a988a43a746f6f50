//! Property tests over randomly generated chat streams.

use std::collections::HashSet;

use proptest::prelude::*;

use chat_topics::{
    adaptive_window, filter_groups, group_by_time_window, MemorySink, ReplyChainLinker,
    XmlPayloadParser,
};
use chat_types::{ChatMessage, TopicBuilderConfig};
use e2e_tests::{quote_message, text_message, TestHarness};

const WORDS: &[&str] = &[
    "rust", "release", "lunch", "deploy", "github", "bug", "coffee", "[image]", "[语音]", "好的",
];

/// Messages with unique ids, random offsets and occasional quotes.
fn arb_stream() -> impl Strategy<Value = Vec<ChatMessage>> {
    let row = (
        0i64..20_000,
        0usize..5,
        prop::collection::vec(prop::sample::select(WORDS), 0..5),
        prop::option::weighted(0.2, 0u64..60),
    );
    prop::collection::vec(row, 0..60).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (offset, sender, words, quoted))| {
                let sender = format!("user{sender}");
                let content = words.join(" ");
                match quoted {
                    Some(q) => quote_message(i as u64, offset, &sender, &content, q),
                    None => text_message(i as u64, offset, &sender, &content),
                }
            })
            .collect()
    })
}

fn sorted_refs(messages: &[ChatMessage]) -> Vec<&ChatMessage> {
    let mut refs: Vec<&ChatMessage> = messages.iter().collect();
    refs.sort_by_key(|m| m.timestamp);
    refs
}

proptest! {
    #[test]
    fn prop_window_gaps_respect_prefix_window(
        messages in arb_stream(),
        base in 30i64..900,
        adaptive in any::<bool>(),
    ) {
        let sorted = sorted_refs(&messages);
        let groups = group_by_time_window(&sorted, base, adaptive);

        for group in &groups {
            let members = group.messages();
            for k in 1..members.len() {
                let gap = members[k].timestamp - members[k - 1].timestamp;
                prop_assert!(gap <= adaptive_window(&members[..k], base, adaptive));
            }
        }

        // Every boundary was a gap wider than the closed group's window.
        for pair in groups.windows(2) {
            let gap = pair[1].first().timestamp - pair[0].last().timestamp;
            prop_assert!(gap > adaptive_window(pair[0].messages(), base, adaptive));
        }
    }

    #[test]
    fn prop_topics_partition_input_when_nothing_is_filtered(messages in arb_stream()) {
        let harness = TestHarness::with_config(TopicBuilderConfig {
            min_messages: 1,
            ..TopicBuilderConfig::default()
        });
        let build = harness.build(&messages);

        let ids: Vec<&str> = build
            .topics
            .iter()
            .flat_map(|t| t.message_ids.iter().map(String::as_str))
            .collect();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        let input: HashSet<&str> = messages.iter().map(|m| m.msg_id.as_str()).collect();

        prop_assert_eq!(ids.len(), messages.len());
        prop_assert_eq!(unique, input);
        for topic in &build.topics {
            prop_assert_eq!(topic.message_count, topic.message_ids.len());
            prop_assert!(topic.start_time <= topic.end_time);
            prop_assert_eq!(topic.topic_id.len(), 12);
        }
    }

    #[test]
    fn prop_reply_linking_is_idempotent(messages in arb_stream()) {
        let sorted = sorted_refs(&messages);
        let parser = XmlPayloadParser::new();
        let sink = MemorySink::new();
        let linker = ReplyChainLinker::new(&parser, &sink);

        let once = linker.link(group_by_time_window(&sorted, 300, true));
        let once_ids: Vec<Vec<String>> = once
            .iter()
            .map(|g| g.message_ids().map(String::from).collect())
            .collect();

        let twice = linker.link(once);
        let twice_ids: Vec<Vec<String>> = twice
            .iter()
            .map(|g| g.message_ids().map(String::from).collect())
            .collect();

        prop_assert_eq!(once_ids, twice_ids);
    }

    #[test]
    fn prop_filter_splits_on_min_messages(messages in arb_stream(), min in 1usize..6) {
        let sorted = sorted_refs(&messages);
        let groups = group_by_time_window(&sorted, 300, true);
        let sizes: Vec<usize> = groups.iter().map(|g| g.len()).collect();

        let kept: Vec<usize> = filter_groups(groups, min).iter().map(|g| g.len()).collect();
        let expected: Vec<usize> = sizes.iter().copied().filter(|&n| n >= min).collect();

        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn prop_runs_are_deterministic(messages in arb_stream()) {
        let first = TestHarness::new().build(&messages);
        let second = TestHarness::new().build(&messages);
        prop_assert_eq!(first.topics, second.topics);
    }
}
