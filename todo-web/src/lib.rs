//! Web dashboard for todo-merger
//!
//! Server-rendered overview of all assigned issues, PRs, and MRs with the
//! local annotation actions (rank, todo list, hide, mark-as-seen).

mod error;
mod routes;
mod state;
mod templates;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tracing::info;

pub use error::{Error, Result};
pub use state::AppState;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/ranking", get(routes::ranking))
        .route("/todolist", get(routes::todolist))
        .route("/hide", get(routes::hide))
        .route("/mark-as-seen", get(routes::mark_as_seen))
        .route("/reload", get(routes::reload))
        .route("/new", get(routes::new_form).post(routes::new_create))
        .route("/static/todo-merger.css", get(routes::stylesheet))
        .with_state(state)
}

/// Bind to localhost and serve the dashboard until the task is cancelled
///
/// The dashboard is a single-user tool; it deliberately only listens on the
/// loopback interface.
pub async fn serve(state: Arc<AppState>, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!(port, "Dashboard listening");

    axum::serve(listener, router(state)).await
}
