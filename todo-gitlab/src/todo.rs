//! The personal todo project on GitLab

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use todo_core::{Label, TodoRepo};

use crate::wire::{GitLabCreatedIssue, GitLabLabel};
use crate::GitLabSource;

/// Label and issue-creation access to one GitLab project
#[derive(Debug)]
pub struct GitLabTodoRepo {
    source: GitLabSource,
    project: String,
}

impl GitLabTodoRepo {
    /// Create a todo-project handle on the same account as the given source;
    /// `project` is the `group/project` path
    pub fn new(source: &GitLabSource, project: impl Into<String>) -> Self {
        Self {
            source: source.clone(),
            project: project.into(),
        }
    }
}

#[async_trait]
impl TodoRepo for GitLabTodoRepo {
    async fn list_labels(&self) -> todo_core::Result<Vec<Label>> {
        debug!(project = %self.project, "Fetching project labels");

        let url = self
            .source
            .api_url(&["projects", &self.project, "labels"])?;
        let labels: Vec<GitLabLabel> = self.source.get_paginated(url, &[]).await?;

        Ok(labels
            .into_iter()
            .map(|label| Label {
                name: label.name,
                color: label.color,
            })
            .collect())
    }

    async fn create_issue(&self, title: &str, labels: &[String]) -> todo_core::Result<String> {
        let me = self.source.current_user().await?;

        let url = self
            .source
            .api_url(&["projects", &self.project, "issues"])?;
        let body = json!({
            "title": title,
            "labels": labels.join(","),
            "assignee_id": me.id,
        });

        let created: GitLabCreatedIssue = self.source.post_json(url, &body).await?;

        info!(project = %self.project, url = %created.web_url, "Created todo issue");

        Ok(created.web_url)
    }
}
