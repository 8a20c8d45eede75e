//! Pipeline and router harness

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use tempfile::TempDir;

use locus_core::Config;
use locus_orchestrator::application::use_cases::{
    AnalyzeRepositoryUseCase, AnalyzeUploadUseCase, CountLinesUseCase, PipelineSettings,
};
use locus_orchestrator::domain::services::SourceProvider;
use locus_orchestrator::infrastructure::{OrderTokenIssuer, SourceProviderRegistry, WorkspaceManager};
use locus_orchestrator::presentation::controllers::OrchestratorState;
use locus_orchestrator::presentation::routes::create_router;

use super::mocks::{FakeCloner, FakeCounter, FakeExtractor};

/// Settings with short deadlines so timeout tests finish quickly
pub fn test_settings() -> PipelineSettings {
    PipelineSettings {
        max_repo_size_mb: 500,
        clone_timeout: Duration::from_secs(5),
        extract_timeout: Duration::from_secs(5),
        count_timeout: Duration::from_secs(5),
        strict_decode: false,
        cancel_grace: Duration::from_secs(5),
    }
}

/// Both use cases wired to fakes over a temporary workspace root
pub struct Harness {
    _temp: TempDir,
    pub root: PathBuf,
    pub repository: Arc<AnalyzeRepositoryUseCase>,
    pub upload: Arc<AnalyzeUploadUseCase>,
    pub order_tokens: Arc<OrderTokenIssuer>,
}

impl Harness {
    pub fn new(
        providers: Vec<Arc<dyn SourceProvider>>,
        cloner: Arc<FakeCloner>,
        extractor: Arc<FakeExtractor>,
        counter: Arc<FakeCounter>,
        settings: PipelineSettings,
    ) -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("loc");
        let workspaces = WorkspaceManager::new(&root).unwrap();

        let mut registry = SourceProviderRegistry::new();
        for provider in providers {
            registry.register(provider);
        }

        let count_lines = Arc::new(CountLinesUseCase::new(
            counter,
            settings.count_timeout,
            settings.strict_decode,
        ));
        let repository = Arc::new(AnalyzeRepositoryUseCase::new(
            registry,
            workspaces.clone(),
            cloner,
            count_lines.clone(),
            settings.clone(),
        ));
        let upload = Arc::new(AnalyzeUploadUseCase::new(
            workspaces,
            extractor,
            count_lines,
            settings,
        ));

        Self {
            _temp: temp,
            root,
            repository,
            upload,
            order_tokens: Arc::new(OrderTokenIssuer::new()),
        }
    }

    pub fn router(&self) -> Router {
        let mut config = Config::default();
        config.server.enable_docs = false;
        let state = OrchestratorState {
            analyze_repository: self.repository.clone(),
            analyze_upload: self.upload.clone(),
            order_tokens: self.order_tokens.clone(),
            api_version: config.server.api_version.clone(),
            startup_time: Instant::now(),
        };
        create_router(state, &config)
    }

    /// Entries left under the workspace root
    pub fn leftovers(&self) -> Vec<PathBuf> {
        entries(&self.root)
    }

    /// Entries left once drop-time removals on the blocking pool have run
    pub async fn settled_leftovers(&self) -> Vec<PathBuf> {
        for _ in 0..200 {
            if self.leftovers().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.leftovers()
    }
}

pub fn entries(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
