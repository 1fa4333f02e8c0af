//! Error types for the corpus engine

use thiserror::Error;

/// Main error type for corpus construction and lookup
#[derive(Error, Debug)]
pub enum CorpusError {
    /// Reference string has the wrong shape for the hierarchy
    #[error("Malformed reference '{reference}': {reason}")]
    MalformedReference { reference: String, reason: String },

    /// A prefix key matched no child while descending the hierarchy
    #[error("Reference '{reference}' not found: no child '{prefix}' at depth {depth}")]
    ResolutionMiss {
        reference: String,
        prefix: String,
        depth: usize,
    },

    /// A level of the raw structure has the wrong shape or mixes shapes
    #[error("Heterogeneous children under '{identificator}': expected {expected}, found {found}")]
    HeterogeneousChildren {
        identificator: String,
        expected: String,
        found: String,
    },

    /// Two interior nodes of one tree share an identificator
    #[error("Identificator '{0}' is used by more than one node")]
    CacheKeyCollision(String),

    /// A raw leaf descriptor could not be read
    #[error("Invalid leaf in '{container}': {reason}")]
    InvalidLeaf { container: String, reason: String },

    /// Snapshot could not be accessed or exceeds limits
    #[error("Snapshot error: {0}")]
    SnapshotError(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CorpusError {
    /// Check if this error is a query-time "not found" outcome.
    ///
    /// Both malformed references and misses mean the reference addresses no node;
    /// construction errors never count as not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CorpusError::MalformedReference { .. } | CorpusError::ResolutionMiss { .. }
        )
    }
}

/// Result type alias for corpus operations
pub type Result<T> = std::result::Result<T, CorpusError>;
