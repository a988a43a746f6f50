//! # chat-types
//!
//! Shared domain types for chat topic reconstruction.
//!
//! - `ChatMessage`: immutable normalized input records
//! - `Topic`, `MessageSnapshot`, `LinkInfo`: pipeline output
//! - `TopicBuilderConfig`, `Settings`: configuration and layered loading
//!
//! ## Usage
//!
//! ```rust
//! use chat_types::ChatMessage;
//!
//! let msg = ChatMessage::new("m1", 1_700_000_000, "u1", "Alice", "hello");
//! assert_eq!(msg.sender_name, "Alice");
//! ```

pub mod config;
pub mod error;
pub mod message;
pub mod topic;

pub use config::{default_config_dir, Settings, TopicBuilderConfig};
pub use error::ChatError;
pub use message::ChatMessage;
pub use topic::{LinkInfo, MessageSnapshot, Topic, TopicId};
