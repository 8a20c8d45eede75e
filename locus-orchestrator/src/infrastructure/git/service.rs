use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{CheckoutNotificationType, FetchOptions, RemoteCallbacks, opts};
use tracing::{debug, info};

use crate::domain::services::{CancelFlag, RepositoryCloner, ToolError};

/// libgit2 settings for [`GitCloner`]
#[derive(Debug, Clone)]
pub struct GitClonerConfig {
    /// Connect and per-read server timeout. The overall clone deadline is
    /// enforced by the caller.
    pub server_timeout: Duration,
}

impl Default for GitClonerConfig {
    fn default() -> Self {
        Self {
            server_timeout: Duration::from_secs(30),
        }
    }
}

/// Errors emitted by the Git cloner.
#[derive(Debug, thiserror::Error)]
pub enum GitServiceError {
    #[error("Refusing to clone {0}: only https:// URLs are cloned")]
    UnsupportedScheme(String),
    #[error("libgit2: {0}")]
    Git(#[from] git2::Error),
    #[error("Clone worker did not finish: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<GitServiceError> for ToolError {
    fn from(error: GitServiceError) -> Self {
        ToolError::Backend(Box::new(error))
    }
}

/// Shallow-clones repositories with libgit2.
#[derive(Debug, Default)]
pub struct GitCloner {
    config: GitClonerConfig,
}

/// Flags the blocking clone as abandoned once the awaiting future is dropped.
struct CancelOnDrop(CancelFlag);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

impl GitCloner {
    pub fn new(config: GitClonerConfig) -> Self {
        Self { config }
    }

    /// Clone `repository_url` at depth 1 into `destination`, which must be
    /// missing or empty.
    ///
    /// libgit2 runs on the blocking pool and polls `cancel` while it
    /// negotiates, downloads and plans the checkout. Awaiting this future to
    /// completion waits for that worker to return.
    pub async fn clone_into(
        &self,
        repository_url: &str,
        destination: &Path,
        cancel: CancelFlag,
    ) -> Result<(), GitServiceError> {
        if !repository_url.starts_with("https://") {
            return Err(GitServiceError::UnsupportedScheme(
                repository_url.to_string(),
            ));
        }

        let dest_for_clone = destination.to_path_buf();
        let repo_url = repository_url.to_string();
        let _guard = CancelOnDrop(cancel.clone());

        info!(repository = %repo_url, "Starting Git clone");

        Self::apply_server_timeouts(self.config.server_timeout)?;

        let worker = tokio::task::spawn_blocking(move || {
            Self::perform_clone(dest_for_clone.as_path(), &repo_url, cancel)
        });
        let head_commit = worker.await??;

        debug!(
            path = %destination.display(),
            head = head_commit.as_deref().unwrap_or("unknown"),
            "Git clone completed"
        );

        Ok(())
    }

    fn perform_clone(
        destination: &Path,
        repository_url: &str,
        cancel: CancelFlag,
    ) -> Result<Option<String>, GitServiceError> {
        // Every callback below aborts libgit2 by returning false
        let mut callbacks = RemoteCallbacks::new();
        let on_sideband = cancel.clone();
        callbacks.sideband_progress(move |_| !on_sideband.is_cancelled());
        let on_transfer = cancel.clone();
        callbacks.transfer_progress(move |_| !on_transfer.is_cancelled());

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(callbacks);
        fetch_options.download_tags(git2::AutotagOption::None);
        fetch_options.update_fetchhead(false);
        fetch_options.depth(1);

        let mut checkout = CheckoutBuilder::new();
        checkout.notify_on(CheckoutNotificationType::UPDATED);
        checkout.notify(move |_, _, _, _, _| !cancel.is_cancelled());

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_options);
        builder.with_checkout(checkout);
        let repo = builder.clone(repository_url, destination)?;
        let head = repo
            .head()
            .ok()
            .and_then(|h| h.target())
            .map(|oid| oid.to_string());
        Ok(head)
    }

    fn apply_server_timeouts(timeout: Duration) -> Result<(), GitServiceError> {
        let millis = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX).max(1);
        // SAFETY: libgit2 global options; the values are process-wide and
        // identical for every clone, so concurrent writes are benign.
        unsafe {
            opts::set_server_connect_timeout_in_milliseconds(millis)?;
            opts::set_server_timeout_in_milliseconds(millis)?;
        }
        Ok(())
    }
}

#[async_trait]
impl RepositoryCloner for GitCloner {
    async fn clone_repository(
        &self,
        url: &str,
        destination: &Path,
        cancel: CancelFlag,
    ) -> Result<(), ToolError> {
        Ok(self.clone_into(url, destination, cancel).await?)
    }
}
