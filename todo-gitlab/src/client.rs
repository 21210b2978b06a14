//! GitLab REST v4 client built on reqwest

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::wire::{GitLabErrorBody, GitLabUser};
use crate::{Error, Result};

const PER_PAGE: u32 = 100;

/// One configured GitLab account
#[derive(Clone)]
pub struct GitLabSource {
    name: String,
    base: Url,
    http: reqwest::Client,
    token: String,
}

impl GitLabSource {
    /// Create a source for the instance at `base_url` with the given token
    pub fn new(
        name: impl Into<String>,
        base_url: &str,
        token: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        let base = Url::parse(base_url)
            .map_err(|e| Error::Parse(format!("Invalid GitLab URL {}: {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("todo-merger/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(account = %name, url = %base, "Created GitLab client");

        Ok(Self {
            name,
            base,
            http,
            token: token.into(),
        })
    }

    /// Get the account name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build an `/api/v4` URL from path segments
    ///
    /// Segments are percent-encoded, so a `group/project` path passed as a
    /// single segment becomes the `group%2Fproject` form project endpoints
    /// expect.
    pub(crate) fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::Parse(format!("URL {} cannot be a base", self.base)))?;
            path.pop_if_empty();
            path.push("api");
            path.push("v4");
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Auth("Invalid GitLab token".to_string()));
        }

        let message = match response.json::<GitLabErrorBody>().await {
            Ok(body) => body
                .message
                .map(|m| m.to_string())
                .unwrap_or_else(|| "unknown error".to_string()),
            Err(_) => "unknown error".to_string(),
        };

        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// GET a single JSON object
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!(account = %self.name, url = %url, "GitLab GET");

        let response = self
            .http
            .get(url)
            .header("PRIVATE-TOKEN", &self.token)
            .query(query)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// GET a paginated collection, following pages until one comes back empty
    pub(crate) async fn get_paginated<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut all = Vec::new();
        let mut page = 1u32;

        loop {
            let mut query = query.to_vec();
            query.push(("per_page", PER_PAGE.to_string()));
            query.push(("page", page.to_string()));

            let items: Vec<T> = self.get_json(url.clone(), &query).await?;
            let count = items.len();
            all.extend(items);

            if count < PER_PAGE as usize {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    /// POST a JSON body and decode the JSON response
    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T> {
        debug!(account = %self.name, url = %url, "GitLab POST");

        let response = self
            .http
            .post(url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(body)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// The authenticated user
    pub(crate) async fn current_user(&self) -> Result<GitLabUser> {
        self.get_json(self.api_url(&["user"])?, &[]).await
    }
}

impl std::fmt::Debug for GitLabSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabSource")
            .field("name", &self.name)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}
