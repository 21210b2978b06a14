//! Askama templates and their view models
//!
//! Handlers precompute plain strings/bools here so the templates stay free
//! of Option-unwrapping logic.

use askama::Template;

use todo_core::{IssueItem, IssuesStats, Label};

/// Application version shown in the footer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One row of the dashboard table
pub struct IssueRow {
    pub uid: String,
    pub reference: String,
    pub title: String,
    pub web_url: String,
    pub service: &'static str,
    pub pull: bool,
    pub labels: Vec<String>,
    pub milestone: String,
    pub epic: String,
    pub due_date: String,
    pub assignees: String,
    pub updated: String,
    pub rank: &'static str,
    pub todolist: bool,
    pub hidden: bool,
    pub new: bool,
}

impl From<IssueItem> for IssueRow {
    fn from(issue: IssueItem) -> Self {
        IssueRow {
            service: issue.service.as_str(),
            rank: issue.rank.as_str(),
            uid: issue.uid,
            reference: issue.reference,
            title: issue.title,
            web_url: issue.web_url,
            pull: issue.pull,
            labels: issue.labels,
            milestone: issue.milestone.unwrap_or_default(),
            epic: issue.epic.unwrap_or_default(),
            due_date: issue
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            assignees: issue.assignees,
            updated: issue.updated_at_display,
            todolist: issue.todolist,
            hidden: issue.hidden,
            new: issue.new,
        }
    }
}

/// The dashboard page
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub stats: IssuesStats,
    pub new_count: usize,
    pub filter: String,
    pub rows: Vec<IssueRow>,
    pub new_uids: String,
    pub has_todo_repo: bool,
    pub version: &'static str,
}

/// A label choice on the new-issue form
pub struct LabelChip {
    pub name: String,
    pub color: String,
}

impl From<Label> for LabelChip {
    fn from(label: Label) -> Self {
        LabelChip {
            name: label.name,
            color: label.color,
        }
    }
}

/// The new-issue form
#[derive(Template)]
#[template(path = "new.html")]
pub struct NewTemplate {
    pub labels: Vec<LabelChip>,
    pub colored_labels: bool,
    pub version: &'static str,
}
