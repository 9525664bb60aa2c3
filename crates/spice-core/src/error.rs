//! Error types for spice-core.
//!
//! Scoring itself never fails on degenerate input: empty tuple sets produce
//! zero or undefined ratios. Errors are reserved for configuration mistakes
//! (category registration and lookup) and for loading external corpora.

use thiserror::Error;

/// Errors raised by category registration and aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    /// Aggregation was requested for a category that was never registered
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    /// A filter was registered twice under the same name
    #[error("Category already registered: {0}")]
    DuplicateCategory(String),
    /// A filter tried to take the name of the unfiltered aggregate
    #[error("Category name is reserved: {0}")]
    ReservedCategory(String),
}

/// Errors that can occur while loading a caption corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// Failed to read the corpus file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Corpus file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// JSON is well-formed but not shaped like a caption corpus
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

