//! Local per-issue preferences
//!
//! Rank, todo-list membership, and hidden flags live in a small TOML file
//! (`~/.config/todo-merger/issues.toml`), one table per issue uid. Entries
//! that are back to all defaults are dropped so the file only carries real
//! annotations.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::issue::Rank;
use crate::{Error, Result};

/// Local annotations for one issue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuePref {
    pub rank: Rank,
    pub todolist: bool,
    pub hidden: bool,
}

impl IssuePref {
    fn is_default(&self) -> bool {
        *self == IssuePref::default()
    }
}

/// Preferences keyed by issue uid
pub type PrefsMap = BTreeMap<String, IssuePref>;

/// On-disk shape of the preferences file
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct PrefsFile {
    issues: PrefsMap,
}

/// File-backed preference store
#[derive(Debug, Clone)]
pub struct PrefsStore {
    path: PathBuf,
}

impl PrefsStore {
    /// Create a store backed by the given file
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default store location, `~/.config/todo-merger/issues.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("todo-merger").join("issues.toml"))
    }

    /// Read all preferences
    ///
    /// A missing file is an empty map; an unparsable file is logged and
    /// treated as empty so a corrupt annotation file never blocks the
    /// dashboard.
    pub fn read(&self) -> PrefsMap {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No preferences file yet");
                return PrefsMap::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cannot read preferences file");
                return PrefsMap::new();
            }
        };

        match toml::from_str::<PrefsFile>(&contents) {
            Ok(file) => file.issues,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Cannot parse preferences file, ignoring it"
                );
                PrefsMap::new()
            }
        }
    }

    fn write(&self, issues: PrefsMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }

        let contents = toml::to_string_pretty(&PrefsFile { issues })
            .map_err(|e| Error::Other(format!("Failed to serialize preferences: {}", e)))?;

        debug!(path = %self.path.display(), "Writing preferences file");
        std::fs::write(&self.path, contents).map_err(Error::Io)?;
        Ok(())
    }

    /// Set the rank of an issue, returning the effective rank
    ///
    /// Assigning the rank an issue already has resets it to `Normal`, so the
    /// same dashboard link toggles an annotation off again.
    pub fn set_rank(&self, uid: &str, rank: Rank) -> Result<Rank> {
        let mut issues = self.read();
        let pref = issues.entry(uid.to_string()).or_default();

        if pref.rank == rank {
            info!(uid, "Resetting rank of issue back to normal");
            pref.rank = Rank::Normal;
        } else {
            info!(uid, rank = %rank, "Setting rank of issue");
            pref.rank = rank;
        }

        let effective = pref.rank;
        Self::prune(&mut issues, uid);
        self.write(issues)?;
        Ok(effective)
    }

    /// Toggle todo-list membership, returning the new state
    pub fn toggle_todolist(&self, uid: &str) -> Result<bool> {
        let mut issues = self.read();
        let pref = issues.entry(uid.to_string()).or_default();
        pref.todolist = !pref.todolist;
        let state = pref.todolist;

        info!(uid, todolist = state, "Toggled todo-list membership");
        Self::prune(&mut issues, uid);
        self.write(issues)?;
        Ok(state)
    }

    /// Toggle the hidden flag, returning the new state
    pub fn toggle_hidden(&self, uid: &str) -> Result<bool> {
        let mut issues = self.read();
        let pref = issues.entry(uid.to_string()).or_default();
        pref.hidden = !pref.hidden;
        let state = pref.hidden;

        info!(uid, hidden = state, "Toggled hidden flag");
        Self::prune(&mut issues, uid);
        self.write(issues)?;
        Ok(state)
    }

    fn prune(issues: &mut PrefsMap, uid: &str) {
        if issues.get(uid).is_some_and(IssuePref::is_default) {
            issues.remove(uid);
        }
    }
}
