//! End-to-end test infrastructure for chat-topics.
//!
//! Provides message builders and a diagnostics-capturing pipeline harness
//! shared by the scenario, property and error-path tests.

use std::path::PathBuf;
use std::sync::Arc;

use chat_topics::{MemorySink, TopicBuild, TopicBuilder};
use chat_types::{ChatMessage, TopicBuilderConfig};

/// 2024-01-29 12:00:00 UTC
pub const BASE_TS: i64 = 1_706_529_600;

/// Id under which the export normalizer stores a message with this svrid.
pub fn svrid(n: u64) -> String {
    format!("svrid_{}", n)
}

/// Plain text message `offset` seconds after [`BASE_TS`].
///
/// The sender id is derived from the display name.
pub fn text_message(id: u64, offset: i64, sender: &str, content: &str) -> ChatMessage {
    ChatMessage::new(
        svrid(id),
        BASE_TS + offset,
        format!("wxid_{}", sender.to_lowercase()),
        sender,
        content,
    )
    .with_source("group_chat.html")
}

/// Message quoting the message stored under `svrid(quoted)`.
pub fn quote_message(id: u64, offset: i64, sender: &str, content: &str, quoted: u64) -> ChatMessage {
    text_message(id, offset, sender, content)
        .with_msg_type("quote")
        .with_payload(format!(
            "<msg><appmsg appid=\"\" sdkver=\"0\"><title>{content}</title><type>57</type>\
             <refermsg><type>1</type><svrid>{quoted}</svrid><fromusr>chatroom</fromusr>\
             <displayname>someone</displayname><content>quoted</content></refermsg>\
             </appmsg></msg>"
        ))
}

/// Shared link card message.
pub fn link_message(id: u64, offset: i64, sender: &str, title: &str, url: &str) -> ChatMessage {
    text_message(id, offset, sender, "[link]")
        .with_msg_type("link")
        .with_payload(format!(
            "<msg><appmsg appid=\"\"><title>{title}</title><des>shared from browser</des>\
             <type>5</type><url>{url}</url></appmsg></msg>"
        ))
}

/// Pipeline harness that records every diagnostic.
pub struct TestHarness {
    pub builder: TopicBuilder,
    pub diagnostics: Arc<MemorySink>,
}

impl TestHarness {
    /// Harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(TopicBuilderConfig::default())
    }

    pub fn with_config(config: TopicBuilderConfig) -> Self {
        let diagnostics = Arc::new(MemorySink::new());
        let builder = TopicBuilder::new(config).with_diagnostics(diagnostics.clone());
        Self {
            builder,
            diagnostics,
        }
    }

    pub fn build(&self, messages: &[ChatMessage]) -> TopicBuild {
        self.builder.run_with_report(messages)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// A realistic group-chat afternoon: a release discussion, a quoted
/// follow-up much later, a lunch thread and a few stray messages.
pub fn sample_conversation() -> Vec<ChatMessage> {
    vec![
        text_message(1, 0, "Alice", "rust 1.80 is out, anyone upgraded yet?"),
        text_message(2, 20, "Bob", "upgraded this morning, LazyLock is finally stable"),
        text_message(3, 45, "Carol", "[image]"),
        text_message(4, 70, "Alice", "nice, our CI still pins 1.79 though"),
        link_message(5, 95, "Bob", "Announcing Rust 1.80.0", "https://blog.rust-lang.org/2024/07/25/Rust-1.80.0.html"),
        text_message(6, 3_600, "Dave", "lunch at the noodle place?"),
        text_message(7, 3_640, "Erin", "sure, 12:30 works"),
        text_message(8, 3_700, "Dave", "[表情]"),
        quote_message(9, 7_200, "Carol", "bumped CI to 1.80, all green", 4),
        text_message(10, 12_000, "Frank", "good night everyone"),
    ]
}

/// Write messages as a JSON array into `dir` and return the file path.
pub fn write_messages(dir: &tempfile::TempDir, messages: &[ChatMessage]) -> PathBuf {
    let path = dir.path().join("messages.json");
    let json = serde_json::to_vec_pretty(messages).expect("Failed to serialize messages");
    std::fs::write(&path, json).expect("Failed to write messages file");
    path
}
