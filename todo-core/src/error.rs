//! Error types for todo-merger

use thiserror::Error;

/// Result type alias for todo-merger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for todo-merger operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error reported by an issue source (GitHub/GitLab account)
    #[error("Source error: {0}")]
    Source(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
