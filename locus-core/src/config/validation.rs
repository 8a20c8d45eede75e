//! Configuration validation module

use crate::config::{
    Config, GitHubConfig, GitLabConfig, LimitsConfig, LoggingConfig, ServerConfig, ToolsConfig,
    WorkspaceConfig,
};

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Server configuration error: {message}")]
    Server { message: String },

    #[error("Logging configuration error: {message}")]
    Logging { message: String },

    #[error("Workspace configuration error: {message}")]
    Workspace { message: String },

    #[error("Limits configuration error: {message}")]
    Limits { message: String },

    #[error("Tools configuration error: {message}")]
    Tools { message: String },

    #[error("Source configuration error: {message}")]
    Source { message: String },
}

impl ValidationError {
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }

    pub fn workspace(message: impl Into<String>) -> Self {
        Self::Workspace {
            message: message.into(),
        }
    }

    pub fn limits(message: impl Into<String>) -> Self {
        Self::Limits {
            message: message.into(),
        }
    }

    pub fn tools(message: impl Into<String>) -> Self {
        Self::Tools {
            message: message.into(),
        }
    }

    pub fn source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        // u16 cannot exceed 65535, so only 0 is out of range
        if self.port == 0 {
            return Err(ValidationError::server(format!(
                "Port must be in range 1-65535, got {}",
                self.port
            )));
        }

        if self.host.is_empty() {
            return Err(ValidationError::server("Host cannot be empty"));
        }

        if self.request_timeout_seconds == 0 {
            return Err(ValidationError::server(
                "Request timeout must be greater than 0",
            ));
        }

        if self.api_version.is_empty() || self.api_version.contains('/') {
            return Err(ValidationError::server(format!(
                "API version must be a single non-empty path segment, got '{}'",
                self.api_version
            )));
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.format.as_str() {
            "json" | "pretty" | "compact" => Ok(()),
            other => Err(ValidationError::logging(format!(
                "Unknown log format '{}', expected json, pretty or compact",
                other
            ))),
        }
    }
}

impl Validate for WorkspaceConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.root.as_os_str().is_empty() {
            return Err(ValidationError::workspace("Workspace root cannot be empty"));
        }
        if self.root.parent().is_none() {
            return Err(ValidationError::workspace(format!(
                "Workspace root {} must not be a filesystem root",
                self.root.display()
            )));
        }
        Ok(())
    }
}

impl Validate for LimitsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_repo_size_mb == 0 {
            return Err(ValidationError::limits(
                "Maximum repository size must be greater than 0 MB",
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err(ValidationError::limits(
                "Maximum upload size must be greater than 0 bytes",
            ));
        }
        Ok(())
    }
}

impl Validate for ToolsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.scc_path.trim().is_empty() {
            return Err(ValidationError::tools("scc path cannot be empty"));
        }
        if self.extractor_path.trim().is_empty() {
            return Err(ValidationError::tools("Extractor path cannot be empty"));
        }
        for (name, value) in [
            ("clone", self.clone_timeout_seconds),
            ("extract", self.extract_timeout_seconds),
            ("count", self.count_timeout_seconds),
        ] {
            if value == 0 {
                return Err(ValidationError::tools(format!(
                    "{} timeout must be greater than 0",
                    name
                )));
            }
        }
        Ok(())
    }
}

fn validate_host(
    name: &str,
    web_host: &str,
    api_base_url: &str,
    timeout_seconds: u64,
) -> Result<(), ValidationError> {
    if web_host.is_empty() || web_host.contains('/') {
        return Err(ValidationError::source(format!(
            "{} web host must be a bare host name, got '{}'",
            name, web_host
        )));
    }
    if !api_base_url.starts_with("https://") && !api_base_url.starts_with("http://") {
        return Err(ValidationError::source(format!(
            "{} API base URL must be http(s), got '{}'",
            name, api_base_url
        )));
    }
    if timeout_seconds == 0 {
        return Err(ValidationError::source(format!(
            "{} timeout must be greater than 0",
            name
        )));
    }
    Ok(())
}

impl Validate for GitHubConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_host(
            "GitHub",
            &self.web_host,
            &self.api_base_url,
            self.timeout_seconds,
        )
    }
}

impl Validate for GitLabConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_host(
            "GitLab",
            &self.web_host,
            &self.api_base_url,
            self.timeout_seconds,
        )
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.logging.validate()?;
        self.workspace.validate()?;
        self.limits.validate()?;
        self.tools.validate()?;
        self.sources.github.validate()?;
        self.sources.gitlab.validate()?;
        Ok(())
    }
}
