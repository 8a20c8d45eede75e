//! Line-counting pipelines
//!
//! Both pipelines end in the same [`CountLinesUseCase`]. They differ only in
//! how the source tree gets into the workspace: a shallow clone for remote
//! repositories, an extracted archive for uploads. Every exit path after the
//! workspace exists goes through [`Workspace::release`] or, if the future is
//! dropped, the guard's `Drop`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, instrument, warn};

use locus_core::application::errors::Operation;
use locus_core::{ApplicationError, Config};

use crate::domain::aggregation::aggregate;
use crate::domain::entities::{LanguageRecordOut, RequestContext};
use crate::domain::services::{
    ArchiveExtractor, CancelFlag, LineCounter, RepositoryCloner, UploadBody,
};
use crate::domain::value_objects::RepositoryId;
use crate::infrastructure::providers::SourceProviderRegistry;
use crate::infrastructure::scc::decode_report;
use crate::infrastructure::workspace::{SOURCE_DIR, Workspace, WorkspaceManager};

/// Limits and deadlines shared by both pipelines
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_repo_size_mb: u64,
    pub clone_timeout: Duration,
    pub extract_timeout: Duration,
    pub count_timeout: Duration,
    /// Fail the request when the engine output cannot be decoded
    pub strict_decode: bool,
    /// How long a timed-out clone may take to stop writing into its
    /// workspace before the workspace is removed anyway
    pub cancel_grace: Duration,
}

const DEFAULT_CANCEL_GRACE: Duration = Duration::from_secs(15);

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_repo_size_mb: config.limits.max_repo_size_mb,
            clone_timeout: config.tools.clone_timeout(),
            extract_timeout: config.tools.extract_timeout(),
            count_timeout: config.tools.count_timeout(),
            strict_decode: config.tools.strict_decode,
            cancel_grace: DEFAULT_CANCEL_GRACE,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Keep only the final component of a client-supplied filename.
///
/// Returns `None` when nothing usable is left, or when the name would
/// shadow the extraction directory.
pub fn sanitize_upload_name(filename: &str) -> Option<String> {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .unwrap_or_default();
    match name {
        "" | "." | ".." => None,
        name if name.eq_ignore_ascii_case(SOURCE_DIR) => None,
        name => Some(name.to_string()),
    }
}

/// Run the counting engine over a tree and aggregate its report
pub struct CountLinesUseCase {
    counter: Arc<dyn LineCounter>,
    timeout: Duration,
    strict_decode: bool,
}

impl CountLinesUseCase {
    pub fn new(counter: Arc<dyn LineCounter>, timeout: Duration, strict_decode: bool) -> Self {
        Self {
            counter,
            timeout,
            strict_decode,
        }
    }

    /// Count `tree` and store both raw and aggregated rows in `context`.
    #[instrument(skip(self, context), fields(order = %context.order, target = %context.target))]
    pub async fn execute(
        &self,
        tree: &Path,
        context: &mut RequestContext,
    ) -> Result<(), ApplicationError> {
        let raw = match tokio::time::timeout(self.timeout, self.counter.count(tree)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                error!(tree = %tree.display(), error = %e, "Line counter failed");
                return Err(ApplicationError::ToolInvocation {
                    target: context.target.clone(),
                    source: Box::new(e),
                });
            }
            Err(_) => {
                return Err(ApplicationError::Timeout {
                    operation: Operation::Count,
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        context.languages_in = match decode_report(&raw) {
            Ok(records) => records,
            Err(e) if self.strict_decode => {
                return Err(ApplicationError::Decode {
                    target: context.target.clone(),
                    source: Box::new(e),
                });
            }
            Err(e) => {
                warn!(error = %e, "Undecodable line counter output, reporting zero totals");
                Vec::new()
            }
        };
        context.languages_out = aggregate(&context.languages_in);

        debug!(languages = context.languages_in.len(), "Line count aggregated");
        Ok(())
    }
}

/// Gate, clone and count a remote repository
pub struct AnalyzeRepositoryUseCase {
    providers: SourceProviderRegistry,
    workspaces: WorkspaceManager,
    cloner: Arc<dyn RepositoryCloner>,
    count_lines: Arc<CountLinesUseCase>,
    settings: PipelineSettings,
}

impl AnalyzeRepositoryUseCase {
    pub fn new(
        providers: SourceProviderRegistry,
        workspaces: WorkspaceManager,
        cloner: Arc<dyn RepositoryCloner>,
        count_lines: Arc<CountLinesUseCase>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            providers,
            workspaces,
            cloner,
            count_lines,
            settings,
        }
    }

    #[instrument(skip(self, context), fields(order = %context.order, source = %context.source))]
    pub async fn execute(
        &self,
        repository: &RepositoryId,
        context: &mut RequestContext,
    ) -> Result<Vec<LanguageRecordOut>, ApplicationError> {
        context.target = repository.to_string();

        let provider =
            self.providers
                .get(context.source)
                .ok_or_else(|| ApplicationError::UnsupportedSource {
                    source_kind: context.source.to_string(),
                })?;

        let upstream = |e: crate::domain::services::SourceProviderError| {
            ApplicationError::Upstream {
                repository: repository.to_string(),
                source: Box::new(e),
            }
        };

        if !provider
            .repository_exists(repository)
            .await
            .map_err(upstream)?
        {
            info!(repository = %repository, "Repository not found");
            return Err(ApplicationError::NotFound {
                repository: repository.to_string(),
            });
        }

        let limit_mb = self.settings.max_repo_size_mb;
        if provider
            .exceeds_size(repository, context, limit_mb)
            .await
            .map_err(upstream)?
        {
            info!(repository = %repository, size_mb = context.size_mb, limit_mb, "Repository over size limit");
            return Err(ApplicationError::PolicyViolation {
                repository: repository.to_string(),
                limit_mb,
                size_mb: context.size_mb,
            });
        }

        let workspace = self.workspaces.create(&context.order).await.map_err(|e| {
            ApplicationError::Workspace {
                target: repository.to_string(),
                source: Box::new(e),
            }
        })?;
        context.workspace = Some(workspace.path().to_path_buf());

        let url = provider.clone_url(repository);
        let outcome = self.clone_and_count(&url, &workspace, context).await;
        workspace.release().await;
        context.workspace = None;

        outcome.map(|()| context.languages_out.clone())
    }

    async fn clone_and_count(
        &self,
        url: &str,
        workspace: &Workspace,
        context: &mut RequestContext,
    ) -> Result<(), ApplicationError> {
        let timeout = self.settings.clone_timeout;
        let cancel = CancelFlag::new();
        let mut clone = self
            .cloner
            .clone_repository(url, workspace.path(), cancel.clone());
        let outcome = tokio::time::timeout(timeout, &mut clone).await;
        match outcome {
            Ok(Ok(())) => info!(url, "Repository cloned"),
            Ok(Err(e)) => {
                error!(url, error = %e, "Clone failed");
                return Err(ApplicationError::acquisition(
                    format!("Can't clone repo {}", context.target),
                    e,
                ));
            }
            Err(_) => {
                // The clone may still be writing; removing the workspace
                // before it stops would leave files behind
                cancel.cancel();
                let grace = self.settings.cancel_grace;
                if tokio::time::timeout(grace, clone).await.is_err() {
                    warn!(
                        url,
                        grace_secs = grace.as_secs(),
                        "Clone still running after cancellation"
                    );
                }
                return Err(ApplicationError::Timeout {
                    operation: Operation::Clone,
                    seconds: timeout.as_secs(),
                });
            }
        }

        self.count_lines.execute(workspace.path(), context).await
    }
}

/// Persist, extract and count an uploaded archive
pub struct AnalyzeUploadUseCase {
    workspaces: WorkspaceManager,
    extractor: Arc<dyn ArchiveExtractor>,
    count_lines: Arc<CountLinesUseCase>,
    settings: PipelineSettings,
}

impl AnalyzeUploadUseCase {
    pub fn new(
        workspaces: WorkspaceManager,
        extractor: Arc<dyn ArchiveExtractor>,
        count_lines: Arc<CountLinesUseCase>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            workspaces,
            extractor,
            count_lines,
            settings,
        }
    }

    /// `filename` must already be sanitized with [`sanitize_upload_name`].
    #[instrument(skip(self, body, context), fields(order = %context.order))]
    pub async fn execute(
        &self,
        filename: &str,
        body: &mut dyn UploadBody,
        context: &mut RequestContext,
    ) -> Result<Vec<LanguageRecordOut>, ApplicationError> {
        context.target = filename.to_string();
        if sanitize_upload_name(filename).as_deref() != Some(filename) {
            return Err(ApplicationError::validation(format!(
                "Unusable upload file name {filename}"
            )));
        }

        let workspace = self.workspaces.create(&context.order).await.map_err(|e| {
            ApplicationError::Workspace {
                target: filename.to_string(),
                source: Box::new(e),
            }
        })?;
        context.workspace = Some(workspace.path().to_path_buf());

        let outcome = self
            .extract_and_count(filename, body, &workspace, context)
            .await;
        workspace.release().await;
        context.workspace = None;

        outcome.map(|()| context.languages_out.clone())
    }

    async fn extract_and_count(
        &self,
        filename: &str,
        body: &mut dyn UploadBody,
        workspace: &Workspace,
        context: &mut RequestContext,
    ) -> Result<(), ApplicationError> {
        let archive = workspace.path().join(filename);
        let written = persist_upload(&archive, body).await.map_err(|e| {
            error!(file = %archive.display(), error = %e, "Failed to store upload");
            ApplicationError::Acquisition {
                message: format!("Error creating file {filename}"),
                source: Some(e),
            }
        })?;
        debug!(file = %archive.display(), bytes = written, "Upload stored");

        let tree: PathBuf = workspace.source_dir();
        let timeout = self.settings.extract_timeout;
        match tokio::time::timeout(timeout, self.extractor.extract(&archive, &tree)).await {
            Ok(Ok(())) => info!(file = filename, "Upload extracted"),
            Ok(Err(e)) => {
                error!(file = filename, error = %e, "Extraction failed");
                return Err(ApplicationError::acquisition(
                    format!("Error unziping {filename}"),
                    e,
                ));
            }
            Err(_) => {
                return Err(ApplicationError::Timeout {
                    operation: Operation::Extract,
                    seconds: timeout.as_secs(),
                });
            }
        }

        self.count_lines.execute(&tree, context).await
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Stream the upload body to `path`, returning the number of bytes written.
async fn persist_upload(path: &Path, body: &mut dyn UploadBody) -> Result<u64, BoxError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = body.next_chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}
