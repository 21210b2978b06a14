//! File-backed issue cache and seen-issue tracking
//!
//! Fetched issues are cached as JSON (`~/.cache/todo-merger/issues.json`)
//! so a dashboard reload within the cache window does not hit the APIs.
//! The set of already-seen issue uids lives next to it (`seen.json`) and
//! drives the "new" badge.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::issue::IssueItem;
use crate::{Error, Result};

/// File-backed store for the issue cache and the seen-uid set
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    /// Create a store rooted at the given directory
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Default store location, `~/.cache/todo-merger`
    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|p| p.join("todo-merger"))
    }

    fn issues_path(&self) -> PathBuf {
        self.dir.join("issues.json")
    }

    fn seen_path(&self) -> PathBuf {
        self.dir.join("seen.json")
    }

    /// Read the cached issues
    ///
    /// Missing and corrupt cache files both come back as an empty list; the
    /// caller falls back to fetching fresh data.
    pub fn read_issues(&self) -> Vec<IssueItem> {
        let path = self.issues_path();
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No issues cache yet");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read issues cache");
                return Vec::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(issues) => issues,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Cannot parse issues cache, ignoring it"
                );
                Vec::new()
            }
        }
    }

    /// Write the issues cache
    pub fn write_issues(&self, issues: &[IssueItem]) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(Error::Io)?;

        let path = self.issues_path();
        debug!(path = %path.display(), count = issues.len(), "Writing issues cache");

        let contents = serde_json::to_string_pretty(issues).map_err(Error::Json)?;
        std::fs::write(&path, contents).map_err(Error::Io)?;
        Ok(())
    }

    /// Read the set of seen issue uids
    pub fn read_seen(&self) -> BTreeSet<String> {
        let path = self.seen_path();
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(_) => return BTreeSet::new(),
        };

        match serde_json::from_str(&contents) {
            Ok(seen) => seen,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot parse seen file, ignoring it");
                BTreeSet::new()
            }
        }
    }

    /// Add uids to the seen set; already-seen uids are a no-op
    pub fn mark_seen<I>(&self, uids: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut seen = self.read_seen();
        let before = seen.len();
        seen.extend(uids.into_iter().map(Into::into).filter(|u| !u.is_empty()));

        if seen.len() == before {
            return Ok(());
        }

        std::fs::create_dir_all(&self.dir).map_err(Error::Io)?;
        let contents = serde_json::to_string_pretty(&seen).map_err(Error::Json)?;
        debug!(count = seen.len() - before, "Marking issues as seen");
        std::fs::write(self.seen_path(), contents).map_err(Error::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{Rank, Service};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn sample_issue(uid: &str) -> IssueItem {
        IssueItem {
            uid: uid.to_string(),
            service: Service::Gitlab,
            reference: "group/proj#1".to_string(),
            title: "Sample".to_string(),
            web_url: "https://gitlab.example.com/group/proj/-/issues/1".to_string(),
            pull: false,
            labels: vec!["bug".to_string()],
            milestone: Some("Sprint 1".to_string()),
            epic: None,
            due_date: None,
            assignees: String::new(),
            updated_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            updated_at_display: "1 day ago".to_string(),
            rank: Rank::Normal,
            todolist: false,
            hidden: false,
            new: true,
        }
    }

    #[test]
    fn test_empty_cache() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf());
        assert!(store.read_issues().is_empty());
        assert!(store.read_seen().is_empty());
    }

    #[test]
    fn test_issues_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf());

        let issues = vec![sample_issue("gitlab-1"), sample_issue("gitlab-2")];
        store.write_issues(&issues).unwrap();

        let read = store.read_issues();
        assert_eq!(read.len(), 2);
        assert_eq!(read[0].uid, "gitlab-1");
        assert_eq!(read[0].milestone.as_deref(), Some("Sprint 1"));
    }

    #[test]
    fn test_corrupt_cache_ignored() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf());

        std::fs::write(dir.path().join("issues.json"), "{ not json").unwrap();
        assert!(store.read_issues().is_empty());
    }

    #[test]
    fn test_mark_seen_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf());

        store.mark_seen(["github-1", "github-2"]).unwrap();
        store.mark_seen(["github-2"]).unwrap();

        let seen = store.read_seen();
        assert_eq!(seen.len(), 2);
        assert!(seen.contains("github-1"));
    }

    #[test]
    fn test_mark_seen_skips_empty_uids() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf());

        // A trailing comma in the query string produces an empty entry
        store.mark_seen(["github-1", ""]).unwrap();
        let seen = store.read_seen();
        assert_eq!(seen.len(), 1);
    }
}
