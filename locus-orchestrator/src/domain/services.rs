//! Orchestrator domain services
//!
//! Collaborators the pipeline drives but does not implement: remote source
//! providers, the clone and extraction tools, and the line-counting engine.
//! Every method returns a result value so the use cases never inspect
//! process exit codes themselves, and tests can swap in fakes.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::entities::RequestContext;
use super::value_objects::{RepositoryId, SourceKind};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Existence and size checks for one remote hosting service
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Source kind this provider answers for
    fn kind(&self) -> SourceKind;

    /// HTTPS URL the repository is cloned from
    fn clone_url(&self, repository: &RepositoryId) -> String;

    async fn repository_exists(&self, repository: &RepositoryId)
    -> Result<bool, SourceProviderError>;

    /// Repository size in MB as reported by the host, rounded up
    async fn repository_size_mb(&self, repository: &RepositoryId)
    -> Result<u64, SourceProviderError>;

    /// Measure the repository, record the size in `context` and compare it
    /// against `limit_mb`.
    async fn exceeds_size(
        &self,
        repository: &RepositoryId,
        context: &mut RequestContext,
        limit_mb: u64,
    ) -> Result<bool, SourceProviderError> {
        let size_mb = self.repository_size_mb(repository).await?;
        context.size_mb = size_mb;
        Ok(size_mb > limit_mb)
    }
}

/// Stop signal shared between a pipeline and the tool it is waiting on
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Clones a remote repository into a local directory
#[async_trait]
pub trait RepositoryCloner: Send + Sync {
    /// Clone `url` into `destination`.
    ///
    /// Implementations should stop soon after `cancel` is raised. The
    /// returned future must not resolve while anything is still writing
    /// into `destination`.
    async fn clone_repository(
        &self,
        url: &str,
        destination: &Path,
        cancel: CancelFlag,
    ) -> Result<(), ToolError>;
}

/// Unpacks an archive into a directory
#[async_trait]
pub trait ArchiveExtractor: Send + Sync {
    async fn extract(&self, archive: &Path, destination: &Path) -> Result<(), ToolError>;
}

/// Runs the line-counting engine and returns its raw JSON report
#[async_trait]
pub trait LineCounter: Send + Sync {
    async fn count(&self, tree: &Path) -> Result<Vec<u8>, ToolError>;
}

/// Streamed body of an uploaded file
#[async_trait]
pub trait UploadBody: Send {
    /// Next chunk of the upload, `None` once the body is exhausted.
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, BoxError>;
}

/// Source provider error
#[derive(Debug, thiserror::Error)]
pub enum SourceProviderError {
    #[error("Request to {provider} failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("{provider} answered with unexpected status {status}")]
    UnexpectedStatus { provider: &'static str, status: u16 },

    #[error("Malformed response from {provider}: {message}")]
    Malformed {
        provider: &'static str,
        message: String,
    },
}

/// Failure of an external tool (clone, extraction, counting)
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error(transparent)]
    Backend(BoxError),
}
