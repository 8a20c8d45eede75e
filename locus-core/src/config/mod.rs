//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub workspace: WorkspaceConfig,
    pub limits: LimitsConfig,
    pub tools: ToolsConfig,
    pub sources: SourcesConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Whether to expose interactive API docs (Swagger UI).
    pub enable_docs: bool,
    /// Global request timeout in seconds applied at the HTTP layer.
    /// Must cover clone + extraction + counting of the largest accepted input.
    pub request_timeout_seconds: u64,
    /// Allowed CORS origins. Use ["*"] to allow any.
    pub allowed_origins: Vec<String>,
    /// First path segment every analysis request must carry (e.g. `v1`).
    pub api_version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_docs: true,
            request_timeout_seconds: 600,
            allowed_origins: vec!["*".to_string()],
            api_version: "v1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// One of `json`, `pretty`, `compact`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

/// Per-request workspace staging
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Staging directory; each request gets `<root>/<order token>`.
    pub root: PathBuf,
    /// Remove leftovers from a previous process at startup. Order tokens
    /// restart at 1, so stale directories would otherwise collide.
    pub purge_on_startup: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("_tmp/loc"),
            purge_on_startup: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Remote repositories larger than this are refused before cloning.
    pub max_repo_size_mb: u64,
    /// Maximum accepted request body for uploads.
    pub max_upload_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_repo_size_mb: 500,
            max_upload_bytes: 100 * 1024 * 1024,
        }
    }
}

/// External tool invocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Path to the `scc` executable (or `scc` if in PATH)
    pub scc_path: String,
    /// Path to the archive extractor (7-Zip command line)
    pub extractor_path: String,
    pub clone_timeout_seconds: u64,
    pub extract_timeout_seconds: u64,
    pub count_timeout_seconds: u64,
    /// Fail the request when the counter output cannot be decoded instead of
    /// answering with an all-zero total.
    pub strict_decode: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            scc_path: "scc".to_string(),
            extractor_path: "7z".to_string(),
            clone_timeout_seconds: 300,
            extract_timeout_seconds: 120,
            count_timeout_seconds: 120,
            strict_decode: false,
        }
    }
}

impl ToolsConfig {
    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.clone_timeout_seconds)
    }

    pub fn extract_timeout(&self) -> Duration {
        Duration::from_secs(self.extract_timeout_seconds)
    }

    pub fn count_timeout(&self) -> Duration {
        Duration::from_secs(self.count_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SourcesConfig {
    pub github: GitHubConfig,
    pub gitlab: GitLabConfig,
}

/// GitHub host used for `?github=owner/name` requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Host used to build clone URLs (`https://<web_host>/<owner>/<name>`).
    pub web_host: String,
    /// REST API base used for existence and size checks.
    pub api_base_url: String,
    /// Optional token to raise API rate limits.
    pub token: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            web_host: "github.com".to_string(),
            api_base_url: "https://api.github.com".to_string(),
            token: None,
            timeout_seconds: 15,
        }
    }
}

/// GitLab host used for `?gitlab=owner/name` requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitLabConfig {
    pub web_host: String,
    pub api_base_url: String,
    pub token: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            web_host: "gitlab.com".to_string(),
            api_base_url: "https://gitlab.com/api/v4".to_string(),
            token: None,
            timeout_seconds: 15,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        // Add environment-specific config if ENV is set
        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        // Add local config and environment variables last (highest priority)
        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("LOCUS")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            );

        let config: Config = builder.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}
