//! Todo-merger core - unified issue model, triage logic, and local state
//!
//! This crate provides everything the dashboard needs that is not tied to a
//! specific service: configuration, the unified issue record, the
//! merge/rank/filter pass, and the file-backed preference and cache stores.

pub mod cache;
pub mod config;
pub mod error;
pub mod issue;
pub mod prefs;
pub mod source;
pub mod triage;

pub use cache::CacheStore;
pub use config::Config;
pub use error::{Error, Result};
pub use issue::{IssueItem, Rank, Service};
pub use prefs::{IssuePref, PrefsMap, PrefsStore};
pub use source::{IssueSource, Label, TodoRepo};
pub use triage::{IssueFilter, IssuesStats};
