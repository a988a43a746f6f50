//! Error types shared across the chat-topics crates.

use thiserror::Error;

/// Unified error type for chat-topics operations.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
