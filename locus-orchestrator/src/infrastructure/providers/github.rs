//! GitHub existence and size checks

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::http_client;
use crate::domain::services::{SourceProvider, SourceProviderError};
use crate::domain::value_objects::{RepositoryId, SourceKind};

const PROVIDER: &str = "GitHub";

#[derive(Debug, Deserialize)]
struct RepositoryMetadata {
    /// Repository size in KiB
    #[serde(default)]
    size: u64,
}

/// Queries `GET /repos/{owner}/{name}` on the GitHub REST API
pub struct GitHubProvider {
    client: reqwest::Client,
    api_base_url: String,
    web_host: String,
    token: Option<String>,
}

impl GitHubProvider {
    pub fn new(api_base_url: impl Into<String>, web_host: impl Into<String>) -> Self {
        Self {
            client: http_client(Duration::from_secs(15)),
            api_base_url: api_base_url.into(),
            web_host: web_host.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.client = http_client(Duration::from_secs(timeout_seconds));
        self
    }

    /// Fetch repository metadata; `None` when the repository does not exist.
    async fn fetch(
        &self,
        repository: &RepositoryId,
    ) -> Result<Option<RepositoryMetadata>, SourceProviderError> {
        let url = format!(
            "{}/repos/{}/{}",
            self.api_base_url.trim_end_matches('/'),
            repository.owner(),
            repository.name()
        );

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceProviderError::Transport {
                provider: PROVIDER,
                source: Box::new(e),
            })?;

        match response.status() {
            status if status.is_success() => {
                let metadata = response.json::<RepositoryMetadata>().await.map_err(|e| {
                    SourceProviderError::Malformed {
                        provider: PROVIDER,
                        message: e.to_string(),
                    }
                })?;
                Ok(Some(metadata))
            }
            // Private repositories answer 404 to anonymous callers too
            reqwest::StatusCode::NOT_FOUND => Ok(None),
            status => Err(SourceProviderError::UnexpectedStatus {
                provider: PROVIDER,
                status: status.as_u16(),
            }),
        }
    }
}

#[async_trait]
impl SourceProvider for GitHubProvider {
    fn kind(&self) -> SourceKind {
        SourceKind::GitHub
    }

    fn clone_url(&self, repository: &RepositoryId) -> String {
        format!("https://{}/{}", self.web_host, repository)
    }

    async fn repository_exists(
        &self,
        repository: &RepositoryId,
    ) -> Result<bool, SourceProviderError> {
        let exists = self.fetch(repository).await?.is_some();
        debug!(repository = %repository, exists, "GitHub existence check");
        Ok(exists)
    }

    async fn repository_size_mb(
        &self,
        repository: &RepositoryId,
    ) -> Result<u64, SourceProviderError> {
        let metadata = self
            .fetch(repository)
            .await?
            .ok_or_else(|| SourceProviderError::UnexpectedStatus {
                provider: PROVIDER,
                status: 404,
            })?;
        // `size` is KiB; partial megabytes count against the limit
        Ok(metadata.size.div_ceil(1024))
    }
}
