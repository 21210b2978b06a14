//! GitHub API client using octocrab

use crate::{Error, Result};
use octocrab::Octocrab;
use tracing::{debug, info};

/// One configured GitHub account
pub struct GitHubSource {
    name: String,
    client: Octocrab,
}

impl GitHubSource {
    /// Create a source for the account with the given personal access token
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let name = name.into();

        let client = Octocrab::builder()
            .personal_token(token.into())
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        info!(account = %name, "Created GitHub client");

        Ok(Self { name, client })
    }

    /// Get the account name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the underlying octocrab client
    pub fn client(&self) -> &Octocrab {
        &self.client
    }

    /// Login of the authenticated user
    pub async fn login(&self) -> Result<String> {
        debug!(account = %self.name, "Fetching authenticated GitHub user");

        let user = self.client.current().user().await.map_err(|e| match e {
            octocrab::Error::GitHub { source, .. }
                if source.message.contains("Bad credentials") =>
            {
                Error::Auth("Invalid GitHub token".to_string())
            }
            other => Error::Api(other),
        })?;

        Ok(user.login)
    }
}

impl std::fmt::Debug for GitHubSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSource")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Parse an `owner/repo` reference
///
/// Accepts the shorthand form and full HTTPS URLs.
pub(crate) fn parse_repo(repo: &str) -> Result<(String, String)> {
    if repo.starts_with("https://") || repo.starts_with("http://") {
        let url = url::Url::parse(repo).map_err(|e| Error::Parse(e.to_string()))?;
        let path = url.path().trim_start_matches('/').trim_end_matches(".git");
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() >= 2 {
            return Ok((parts[0].to_string(), parts[1].to_string()));
        }
        return Err(Error::Parse(format!("Invalid GitHub URL path: {}", path)));
    }

    let parts: Vec<&str> = repo.split('/').collect();
    if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
        return Ok((
            parts[0].to_string(),
            parts[1].trim_end_matches(".git").to_string(),
        ));
    }

    Err(Error::Parse(format!(
        "Invalid repository format: {}. Expected owner/repo",
        repo
    )))
}
