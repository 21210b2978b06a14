//! Traits at the provider seam
//!
//! The web layer only sees these traits; the GitHub and GitLab crates
//! provide the implementations.

use async_trait::async_trait;

use crate::issue::IssueItem;
use crate::Result;

/// A configured account that can be asked for the user's assigned issues
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// User-chosen account name from the config file
    fn name(&self) -> &str;

    /// Fetch all open issues, PRs, and MRs assigned to (or awaiting review
    /// by) the authenticated user, normalized into [`IssueItem`]s
    async fn fetch_assigned(&self) -> Result<Vec<IssueItem>>;
}

/// A label in the personal todo repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    /// Hex color like `#d73a4a`, as reported by the service
    pub color: String,
}

/// The personal todo repository new issues get created in
#[async_trait]
pub trait TodoRepo: Send + Sync {
    /// List the labels available in the repository
    async fn list_labels(&self) -> Result<Vec<Label>>;

    /// Create a new self-assigned issue; returns its web URL
    async fn create_issue(&self, title: &str, labels: &[String]) -> Result<String>;
}
