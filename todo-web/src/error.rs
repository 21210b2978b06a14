//! Error type for route handlers

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Result type for route handlers
pub type Result<T> = std::result::Result<T, Error>;

/// Errors a route handler can surface to the browser
#[derive(Error, Debug)]
pub enum Error {
    /// Error from the core library (stores, config)
    #[error(transparent)]
    Core(#[from] todo_core::Error),

    /// Template rendering error
    #[error("Template error: {0}")]
    Render(#[from] askama::Error),

    /// Feature used without the matching configuration
    #[error("{0}")]
    NotConfigured(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotConfigured(message) => {
                (StatusCode::NOT_FOUND, message).into_response()
            }
            err => {
                error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal server error: {}", err),
                )
                    .into_response()
            }
        }
    }
}
