//! The unified issue record and its display helpers
//!
//! Every provider normalizes its API objects into [`IssueItem`] so the
//! merge/render layer never has to know which service an entry came from.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Which service an issue came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Github,
    Gitlab,
}

impl Service {
    /// Lowercase service name as used in uids and templates
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Github => "github",
            Service::Gitlab => "gitlab",
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local priority of an issue
///
/// The numeric weight drives sort order: pinned issues float to the top,
/// low-ranked ones sink to the bottom.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Pin,
    High,
    #[default]
    Normal,
    Low,
}

impl Rank {
    /// Sort weight; smaller sorts earlier
    pub fn weight(&self) -> i8 {
        match self {
            Rank::Pin => -1,
            Rank::High => 1,
            Rank::Normal => 5,
            Rank::Low => 99,
        }
    }

    /// Name as used in query strings and the prefs file
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Pin => "pin",
            Rank::High => "high",
            Rank::Normal => "normal",
            Rank::Low => "low",
        }
    }

    /// Parse a query-string rank name, defaulting to `Normal` for unknown input
    pub fn from_query(value: &str) -> Self {
        match value {
            "pin" => Rank::Pin,
            "high" => Rank::High,
            "low" => Rank::Low,
            _ => Rank::Normal,
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One issue, pull request, or merge request assigned to the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueItem {
    /// Globally unique id, `"{service}-{api id}"`
    pub uid: String,
    /// Service this issue came from
    pub service: Service,
    /// Human-readable reference like `owner/repo#123`
    pub reference: String,
    /// Issue title
    pub title: String,
    /// Link to the issue in the service web UI
    pub web_url: String,
    /// True for pull/merge requests
    pub pull: bool,
    /// Label names
    pub labels: Vec<String>,
    /// Milestone title, if any
    pub milestone: Option<String>,
    /// Epic title, if any (GitLab only)
    pub epic: Option<String>,
    /// Due date, if any (GitLab only)
    pub due_date: Option<NaiveDate>,
    /// Display string of co-assignees, "Me" first; empty if only me
    pub assignees: String,
    /// When the issue was last updated
    pub updated_at: DateTime<Utc>,
    /// Human-readable age, e.g. "3 days ago"
    pub updated_at_display: String,
    /// Local rank annotation
    #[serde(default)]
    pub rank: Rank,
    /// On the local todo list
    #[serde(default)]
    pub todolist: bool,
    /// Hidden from the default view
    #[serde(default)]
    pub hidden: bool,
    /// Not yet marked as seen
    #[serde(default)]
    pub new: bool,
}

impl IssueItem {
    /// Fill fields that are derived from other attributes
    pub fn fill_derived(&mut self, now: DateTime<Utc>) {
        self.updated_at_display = time_ago(self.updated_at, now);
    }
}

/// Human-readable list of assigned users, treating the executing user special
///
/// My own login is replaced by a leading "Me"; if nobody else is assigned
/// the field is empty since it carries no information.
pub fn format_assignees(logins: &[String], my_login: &str) -> String {
    let others: Vec<&str> = logins
        .iter()
        .map(String::as_str)
        .filter(|login| *login != my_login)
        .collect();

    if others.is_empty() {
        return String::new();
    }

    let mut parts = vec!["Me"];
    parts.extend(others);
    parts.join(", ")
}

/// Convert a GitHub issue URL to a ref like `owner/repo#123`
pub fn github_url_to_ref(web_url: &str) -> String {
    let path = match url::Url::parse(web_url) {
        Ok(url) => url.path().trim_matches('/').to_string(),
        Err(_) => web_url.trim_matches('/').to_string(),
    };

    path.replace("/issues/", "#").replace("/pull/", "#")
}

/// Render a timestamp as a coarse "time ago" string
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(then);
    let days = diff.num_days();
    let seconds = diff.num_seconds();

    let (amount, unit) = if days >= 365 {
        (days / 365, "year")
    } else if days >= 30 {
        (days / 30, "month")
    } else if days >= 7 {
        (days / 7, "week")
    } else if days >= 1 {
        (days, "day")
    } else if seconds >= 3600 {
        (seconds / 3600, "hour")
    } else if seconds >= 60 {
        (seconds / 60, "minute")
    } else {
        return "Just now".to_string();
    };

    if amount > 1 {
        format!("{} {}s ago", amount, unit)
    } else {
        format!("{} {} ago", amount, unit)
    }
}
