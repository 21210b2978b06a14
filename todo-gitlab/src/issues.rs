//! Fetching assigned issues and merge requests

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use todo_core::issue::format_assignees;
use todo_core::{IssueItem, IssueSource, Service};

use crate::wire::{GitLabIssue, GitLabMergeRequest};
use crate::{GitLabSource, Result};

impl GitLabSource {
    fn normalize_issue(&self, issue: GitLabIssue, my_username: &str) -> IssueItem {
        let assignee_names: Vec<String> =
            issue.assignees.into_iter().map(|a| a.username).collect();

        let mut item = IssueItem {
            uid: format!("gitlab-{}", issue.id),
            service: Service::Gitlab,
            reference: issue.references.full,
            title: issue.title,
            web_url: issue.web_url,
            pull: false,
            labels: issue.labels,
            milestone: issue.milestone.map(|m| m.title),
            epic: issue.epic.map(|e| e.title),
            due_date: issue.due_date,
            assignees: format_assignees(&assignee_names, my_username),
            updated_at: issue.updated_at,
            updated_at_display: String::new(),
            rank: Default::default(),
            todolist: false,
            hidden: false,
            new: false,
        };
        item.fill_derived(Utc::now());
        item
    }

    fn normalize_mr(&self, mr: GitLabMergeRequest, my_username: &str) -> IssueItem {
        let assignee_names: Vec<String> = mr.assignees.into_iter().map(|a| a.username).collect();

        let mut item = IssueItem {
            // MR ids live in their own numberspace, so they get their own
            // uid prefix to never collide with issue ids
            uid: format!("gitlab-mr-{}", mr.id),
            service: Service::Gitlab,
            reference: mr.references.full,
            title: mr.title,
            web_url: mr.web_url,
            pull: true,
            labels: mr.labels,
            milestone: mr.milestone.map(|m| m.title),
            epic: None,
            due_date: None,
            assignees: format_assignees(&assignee_names, my_username),
            updated_at: mr.updated_at,
            updated_at_display: String::new(),
            rank: Default::default(),
            todolist: false,
            hidden: false,
            new: false,
        };
        item.fill_derived(Utc::now());
        item
    }

    async fn fetch_issues(&self) -> Result<Vec<GitLabIssue>> {
        self.get_paginated(
            self.api_url(&["issues"])?,
            &[
                ("scope", "assigned_to_me".to_string()),
                ("state", "opened".to_string()),
            ],
        )
        .await
    }

    async fn fetch_assigned_mrs(&self) -> Result<Vec<GitLabMergeRequest>> {
        self.get_paginated(
            self.api_url(&["merge_requests"])?,
            &[
                ("scope", "assigned_to_me".to_string()),
                ("state", "opened".to_string()),
            ],
        )
        .await
    }

    async fn fetch_review_mrs(&self, my_id: u64) -> Result<Vec<GitLabMergeRequest>> {
        self.get_paginated(
            self.api_url(&["merge_requests"])?,
            &[
                ("scope", "all".to_string()),
                ("reviewer_id", my_id.to_string()),
                ("state", "opened".to_string()),
            ],
        )
        .await
    }
}

#[async_trait]
impl IssueSource for GitLabSource {
    fn name(&self) -> &str {
        GitLabSource::name(self)
    }

    async fn fetch_assigned(&self) -> todo_core::Result<Vec<IssueItem>> {
        let me = self.current_user().await?;
        debug!(account = %self.name(), user = %me.username, "Fetching GitLab issues");

        let issues = self.fetch_issues().await?;
        let assigned_mrs = self.fetch_assigned_mrs().await?;
        let review_mrs = self.fetch_review_mrs(me.id).await?;

        let mut seen_uids = HashSet::new();
        let mut items = Vec::new();

        for issue in issues {
            let item = self.normalize_issue(issue, &me.username);
            if seen_uids.insert(item.uid.clone()) {
                items.push(item);
            }
        }

        // An MR both assigned to me and awaiting my review shows up once
        for mr in assigned_mrs.into_iter().chain(review_mrs) {
            let item = self.normalize_mr(mr, &me.username);
            if seen_uids.insert(item.uid.clone()) {
                items.push(item);
            }
        }

        info!(account = %self.name(), count = items.len(), "Fetched GitLab issues");

        Ok(items)
    }
}
