//! Topic pipeline error types.
//!
//! None of these escape `TopicBuilder::run`; each stage absorbs its own
//! failures and falls back to a pass-through result.

use thiserror::Error;

/// Errors that can occur inside a pipeline stage.
#[derive(Debug, Error)]
pub enum TopicsError {
    /// Payload could not be parsed as XML
    #[error("Payload parse error: {0}")]
    Payload(String),

    /// Every representative text tokenized to nothing
    #[error("Empty vocabulary: no tokens in any document")]
    EmptyVocabulary,

    /// Vectorization failed for another reason
    #[error("Vectorization error: {0}")]
    Vectorization(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<quick_xml::Error> for TopicsError {
    fn from(e: quick_xml::Error) -> Self {
        TopicsError::Payload(e.to_string())
    }
}
