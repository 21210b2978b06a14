//! Fetching the user's assigned issues and review requests

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use octocrab::models::issues::Issue as OctocrabIssue;
use tracing::{debug, info};

use todo_core::issue::{format_assignees, github_url_to_ref};
use todo_core::{IssueItem, IssueSource, Service};

use crate::{Error, GitHubSource, Result};

impl GitHubSource {
    /// Run an issue search and normalize the results
    async fn search_issues(&self, query: &str) -> Result<Vec<OctocrabIssue>> {
        debug!(account = %self.name(), query, "Searching GitHub issues");

        let page = self
            .client()
            .search()
            .issues_and_pull_requests(query)
            .per_page(100)
            .send()
            .await
            .map_err(Error::Api)?;

        let items = self.client().all_pages(page).await.map_err(Error::Api)?;

        Ok(items)
    }

    fn normalize(&self, issue: OctocrabIssue, my_login: &str) -> IssueItem {
        let web_url = issue.html_url.to_string();
        let assignee_logins: Vec<String> =
            issue.assignees.into_iter().map(|a| a.login).collect();

        let mut item = IssueItem {
            uid: format!("github-{}", issue.id),
            service: Service::Github,
            reference: github_url_to_ref(&web_url),
            title: issue.title,
            pull: issue.pull_request.is_some(),
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            milestone: issue.milestone.map(|m| m.title),
            epic: None,
            due_date: None,
            assignees: format_assignees(&assignee_logins, my_login),
            updated_at: issue.updated_at,
            updated_at_display: String::new(),
            web_url,
            rank: Default::default(),
            todolist: false,
            hidden: false,
            new: false,
        };
        item.fill_derived(Utc::now());
        item
    }
}

#[async_trait]
impl IssueSource for GitHubSource {
    fn name(&self) -> &str {
        GitHubSource::name(self)
    }

    async fn fetch_assigned(&self) -> todo_core::Result<Vec<IssueItem>> {
        let my_login = self.login().await?;

        // Assigned issues and PRs, plus open PRs waiting for my review
        let assigned = self
            .search_issues(&format!("is:open assignee:{} archived:false", my_login))
            .await?;
        let review_requests = self
            .search_issues(&format!(
                "is:open is:pr review-requested:{} archived:false",
                my_login
            ))
            .await?;

        let mut seen_uids = HashSet::new();
        let mut items = Vec::new();

        for issue in assigned.into_iter().chain(review_requests) {
            let item = self.normalize(issue, &my_login);
            if seen_uids.insert(item.uid.clone()) {
                items.push(item);
            }
        }

        info!(account = %self.name(), count = items.len(), "Fetched GitHub issues");

        Ok(items)
    }
}
