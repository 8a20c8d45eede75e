//! Application setup and wiring

use std::sync::Arc;
use std::time::Instant;

use axum::Router;

use locus_core::Config;
use locus_orchestrator::application::use_cases::{
    AnalyzeRepositoryUseCase, AnalyzeUploadUseCase, CountLinesUseCase, PipelineSettings,
};
use locus_orchestrator::infrastructure::{
    GitCloner, GitClonerConfig, GitHubProvider, GitLabProvider, OrderTokenIssuer, SccLineCounter,
    SevenZipExtractor, SourceProviderRegistry, WorkspaceManager,
};
use locus_orchestrator::presentation::controllers::OrchestratorState;
use locus_orchestrator::presentation::routes::create_router;

/// Handle returned from create_app
pub struct AppHandle {
    pub router: Router,
    pub workspaces: WorkspaceManager,
}

/// Log the version of the external tools, warning when one is missing.
/// The server still starts; requests needing the tool will fail.
fn spawn_tool_checks(counter: Arc<SccLineCounter>, extractor: Arc<SevenZipExtractor>) {
    tokio::spawn(async move {
        match counter.check_installation().await {
            Ok(version) => tracing::info!(version = %version, "scc available"),
            Err(e) => tracing::warn!(error = %e, "scc is not installed or not runnable"),
        }
        match extractor.check_installation().await {
            Ok(version) => tracing::info!(version = %version, "7-Zip available"),
            Err(e) => tracing::warn!(error = %e, "7z is not installed or not runnable"),
        }
    });
}

fn source_providers(config: &Config) -> SourceProviderRegistry {
    let github = &config.sources.github;
    let gitlab = &config.sources.gitlab;

    let mut registry = SourceProviderRegistry::new();
    registry.register(Arc::new(
        GitHubProvider::new(&github.api_base_url, &github.web_host)
            .with_token(github.token.clone())
            .with_timeout(github.timeout_seconds),
    ));
    registry.register(Arc::new(
        GitLabProvider::new(&gitlab.api_base_url, &gitlab.web_host)
            .with_token(gitlab.token.clone())
            .with_timeout(gitlab.timeout_seconds),
    ));
    registry
}

/// Create the application router with every collaborator wired in
pub async fn create_app(config: Config) -> Result<AppHandle, Box<dyn std::error::Error>> {
    let workspaces = WorkspaceManager::new(&config.workspace.root)?;
    if config.workspace.purge_on_startup {
        workspaces.purge_stale()?;
    }
    tracing::info!(root = %workspaces.root().display(), "Workspace root ready");

    let counter = Arc::new(SccLineCounter::new(&config.tools.scc_path));
    let extractor = Arc::new(SevenZipExtractor::new(&config.tools.extractor_path));
    spawn_tool_checks(counter.clone(), extractor.clone());

    let settings = PipelineSettings::from_config(&config);
    let count_lines = Arc::new(CountLinesUseCase::new(
        counter,
        settings.count_timeout,
        settings.strict_decode,
    ));

    let analyze_repository = Arc::new(AnalyzeRepositoryUseCase::new(
        source_providers(&config),
        workspaces.clone(),
        Arc::new(GitCloner::new(GitClonerConfig::default())),
        count_lines.clone(),
        settings.clone(),
    ));
    let analyze_upload = Arc::new(AnalyzeUploadUseCase::new(
        workspaces.clone(),
        extractor,
        count_lines,
        settings,
    ));

    let state = OrchestratorState {
        analyze_repository,
        analyze_upload,
        order_tokens: Arc::new(OrderTokenIssuer::new()),
        api_version: config.server.api_version.clone(),
        startup_time: Instant::now(),
    };

    let router = create_router(state, &config);
    Ok(AppHandle { router, workspaces })
}
