// Error types for the clustering and aggregation core.
//
// The CLI layer works in anyhow, but the core returns these typed variants so
// callers can tell a bad config apart from an upstream contract violation.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, TrendError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrendError {
    /// Threshold or window outside its valid range. Raised before any work starts.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Two vectors of different length were compared. The extractor is
    /// supposed to hand us fixed-length embeddings, so this aborts the run.
    #[error("Dimension mismatch: expected {expected}-dim vector, found {found}-dim")]
    DimensionMismatch { expected: usize, found: usize },

    /// Two input records share an id; cluster membership is keyed by id.
    #[error("Duplicate topic id: {0}")]
    DuplicateTopicId(String),

    /// A cluster references a topic id that isn't in the input.
    #[error("Unknown topic id: {0}")]
    UnknownTopic(String),
}

impl TrendError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
}
