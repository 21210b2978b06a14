//! Error types for GitLab operations

use thiserror::Error;

/// Result type for GitLab operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitLab operations
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP error
    #[error("GitLab HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error response from the GitLab API
    #[error("GitLab API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Authentication error
    #[error("GitLab authentication error: {0}")]
    Auth(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<Error> for todo_core::Error {
    fn from(err: Error) -> Self {
        todo_core::Error::Source(err.to_string())
    }
}
