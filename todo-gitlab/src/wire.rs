//! Serde structs for the GitLab REST v4 payloads we consume

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

/// The authenticated user (`GET /user`)
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabUser {
    pub id: u64,
    pub username: String,
}

/// Cross-project reference strings of an issue or MR
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabReferences {
    /// Full form, e.g. `group/project#42` or `group/project!7`
    pub full: String,
}

/// Anything we only need the title of (milestones, epics)
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabTitled {
    pub title: String,
}

/// An issue as returned by `GET /issues`
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabIssue {
    pub id: u64,
    pub references: GitLabReferences,
    pub title: String,
    pub web_url: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub milestone: Option<GitLabTitled>,
    /// Only populated on GitLab tiers with epics
    #[serde(default)]
    pub epic: Option<GitLabTitled>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub assignees: Vec<GitLabUser>,
    pub updated_at: DateTime<Utc>,
}

/// A merge request as returned by `GET /merge_requests`
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabMergeRequest {
    pub id: u64,
    pub references: GitLabReferences,
    pub title: String,
    pub web_url: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub milestone: Option<GitLabTitled>,
    #[serde(default)]
    pub assignees: Vec<GitLabUser>,
    pub updated_at: DateTime<Utc>,
}

/// A project label (`GET /projects/:id/labels`)
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabLabel {
    pub name: String,
    pub color: String,
}

/// The part of a created issue we report back
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabCreatedIssue {
    pub web_url: String,
}

/// Error body of a failed API call
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabErrorBody {
    #[serde(alias = "error")]
    pub message: Option<serde_json::Value>,
}
