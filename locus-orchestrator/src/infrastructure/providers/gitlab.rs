//! GitLab existence and size checks

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{BYTES_PER_MB, http_client};
use crate::domain::services::{SourceProvider, SourceProviderError};
use crate::domain::value_objects::{RepositoryId, SourceKind};

const PROVIDER: &str = "GitLab";

#[derive(Debug, Deserialize)]
struct ProjectMetadata {
    /// Only present for callers allowed to see statistics
    statistics: Option<ProjectStatistics>,
}

#[derive(Debug, Deserialize)]
struct ProjectStatistics {
    /// Repository size in bytes
    #[serde(default)]
    repository_size: u64,
}

/// Queries `GET /projects/{owner%2Fname}?statistics=true` on the GitLab API
pub struct GitLabProvider {
    client: reqwest::Client,
    api_base_url: String,
    web_host: String,
    token: Option<String>,
}

impl GitLabProvider {
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

    fn project_url(&self, repository: &RepositoryId) -> String {
        let id: String =
            url::form_urlencoded::byte_serialize(repository.to_string().as_bytes()).collect();
        format!(
            "{}/projects/{}",
            self.api_base_url.trim_end_matches('/'),
            id
        )
    }

    async fn fetch(
        &self,
        repository: &RepositoryId,
    ) -> Result<Option<ProjectMetadata>, SourceProviderError> {
        let mut request = self
            .client
            .get(self.project_url(repository))
            .query(&[("statistics", "true")]);
        if let Some(token) = &self.token {
            request = request.header("PRIVATE-TOKEN", token);
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
                let metadata = response.json::<ProjectMetadata>().await.map_err(|e| {
                    SourceProviderError::Malformed {
                        provider: PROVIDER,
                        message: e.to_string(),
                    }
                })?;
                Ok(Some(metadata))
            }
            reqwest::StatusCode::NOT_FOUND => Ok(None),
            status => Err(SourceProviderError::UnexpectedStatus {
                provider: PROVIDER,
                status: status.as_u16(),
            }),
        }
    }
}

#[async_trait]
impl SourceProvider for GitLabProvider {
    fn kind(&self) -> SourceKind {
        SourceKind::GitLab
    }

    fn clone_url(&self, repository: &RepositoryId) -> String {
        format!("https://{}/{}", self.web_host, repository)
    }

    async fn repository_exists(
        &self,
        repository: &RepositoryId,
    ) -> Result<bool, SourceProviderError> {
        let exists = self.fetch(repository).await?.is_some();
        debug!(repository = %repository, exists, "GitLab existence check");
        Ok(exists)
    }

    /// Size from project statistics; 0 when the API withholds them.
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
        let bytes = metadata
            .statistics
            .map(|s| s.repository_size)
            .unwrap_or_default();
        Ok(bytes.div_ceil(BYTES_PER_MB))
    }
}
