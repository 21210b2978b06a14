//! The personal todo repository on GitHub

use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::{debug, info};

use todo_core::{Label, TodoRepo};

use crate::client::parse_repo;
use crate::{Error, GitHubSource, Result};

/// Label and issue-creation access to one GitHub repository
pub struct GitHubTodoRepo {
    client: Octocrab,
    owner: String,
    repo: String,
}

impl GitHubTodoRepo {
    /// Create a todo-repo handle on the same account as the given source
    pub fn new(source: &GitHubSource, repo: &str) -> Result<Self> {
        let (owner, repo) = parse_repo(repo)?;

        Ok(Self {
            client: source.client().clone(),
            owner,
            repo,
        })
    }
}

#[async_trait]
impl TodoRepo for GitHubTodoRepo {
    async fn list_labels(&self) -> todo_core::Result<Vec<Label>> {
        debug!(owner = %self.owner, repo = %self.repo, "Fetching repository labels");

        let page = self
            .client
            .issues(&self.owner, &self.repo)
            .list_labels_for_repo()
            .per_page(100)
            .send()
            .await
            .map_err(Error::Api)?;

        let labels = self.client.all_pages(page).await.map_err(Error::Api)?;

        Ok(labels
            .into_iter()
            .map(|label| Label {
                name: label.name,
                // GitHub reports colors without the leading hash
                color: format!("#{}", label.color),
            })
            .collect())
    }

    async fn create_issue(&self, title: &str, labels: &[String]) -> todo_core::Result<String> {
        let me = self
            .client
            .current()
            .user()
            .await
            .map_err(Error::Api)?
            .login;

        let issue = self
            .client
            .issues(&self.owner, &self.repo)
            .create(title)
            .labels(labels.to_vec())
            .assignees(vec![me])
            .send()
            .await
            .map_err(Error::Api)?;

        info!(
            owner = %self.owner,
            repo = %self.repo,
            number = issue.number,
            "Created todo issue"
        );

        Ok(issue.html_url.to_string())
    }
}

impl std::fmt::Debug for GitHubTodoRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubTodoRepo")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}
