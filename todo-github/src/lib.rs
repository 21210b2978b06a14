//! GitHub issue source for the todo-merger dashboard
//!
//! Wraps octocrab to fetch the authenticated user's assigned issues, PRs,
//! and review requests, and to manage the personal todo repository.

mod client;
mod error;
mod issues;
mod todo;

pub use client::GitHubSource;
pub use error::{Error, Result};
pub use todo::GitHubTodoRepo;
