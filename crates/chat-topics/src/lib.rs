//! # chat-topics
//!
//! Topic reconstruction for chat logs without thread identifiers.
//!
//! A chronological message stream is clustered into conversational topics
//! by a deterministic hybrid pipeline.
//!
//! ## Stages
//! - Density-adaptive time-window grouping
//! - Reply-chain linking over quoted message references (union-find)
//! - Semantic merging by TF-IDF cosine similarity
//! - Quality filtering by group size
//! - Topic assembly: id, title, participants, conclusion, link snapshots
//!
//! Payload parsing and diagnostics are injected through the
//! [`PayloadParser`] and [`DiagnosticsSink`] traits.

pub mod assembler;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod group;
pub mod payload;
pub mod pipeline;
pub mod reply;
pub mod semantic;
pub mod similarity;
pub mod tfidf;
pub mod union_find;
pub mod window;

pub use assembler::{generate_conclusion, generate_title, topic_id, TopicAssembler};
pub use diagnostics::{Diagnostic, DiagnosticLevel, DiagnosticsSink, MemorySink, Stage, TracingSink};
pub use error::TopicsError;
pub use filter::filter_groups;
pub use group::{is_media_placeholder, Group, MEDIA_PLACEHOLDERS};
pub use payload::{PayloadParser, XmlPayloadParser};
pub use pipeline::{BuildReport, TopicBuild, TopicBuilder};
pub use reply::{ReplyChainLinker, ReplyRelation};
pub use semantic::{representative_text, SemanticMerger};
pub use similarity::{cosine_similarity, similarity_matrix};
pub use tfidf::TfIdfVectorizer;
pub use union_find::UnionFind;
pub use window::{adaptive_window, group_by_time_window, WindowGrouper};
