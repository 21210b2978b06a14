//! Shared application state

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use todo_core::{CacheStore, IssueSource, PrefsStore, TodoRepo};

/// Everything the route handlers share
pub struct AppState {
    /// Configured accounts to fetch issues from
    pub sources: Vec<Box<dyn IssueSource>>,

    /// Personal todo repository, when configured
    pub todo_repo: Option<Box<dyn TodoRepo>>,

    /// Render todo-repo label chips in color
    pub colored_labels: bool,

    /// Per-issue rank/todolist/hidden annotations
    pub prefs: PrefsStore,

    /// Issue cache and seen-uid set
    pub cache: CacheStore,

    /// How long a fetch stays fresh
    pub cache_timeout: Duration,

    /// When the last successful fetch happened; `None` forces a refetch
    fetched_at: Mutex<Option<Instant>>,
}

impl AppState {
    pub fn new(
        sources: Vec<Box<dyn IssueSource>>,
        todo_repo: Option<Box<dyn TodoRepo>>,
        colored_labels: bool,
        prefs: PrefsStore,
        cache: CacheStore,
        cache_timeout: Duration,
    ) -> Self {
        Self {
            sources,
            todo_repo,
            colored_labels,
            prefs,
            cache,
            cache_timeout,
            fetched_at: Mutex::new(None),
        }
    }

    /// Whether the cached issues are still fresh
    pub fn cache_fresh(&self) -> bool {
        self.fetched_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some_and(|fetched| fetched.elapsed() < self.cache_timeout)
    }

    /// Record a successful fetch
    pub fn touch_cache_timer(&self) {
        *self
            .fetched_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }

    /// Invalidate the cache timer so the next dashboard render refetches
    pub fn expire_cache_timer(&self) {
        *self
            .fetched_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}
