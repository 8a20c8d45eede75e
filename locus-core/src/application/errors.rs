//! Application error taxonomy
//!
//! Every failure of the line-counting pipeline ends up as one of these
//! variants. The `Display` text is the human-readable message sent back to
//! the caller, so it is phrased for end users; the underlying cause travels
//! separately in `source` and is only logged.

use std::fmt;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the line-counting pipeline
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    /// Malformed path, query or form. Raised before any resource is touched.
    #[error("{message}")]
    Validation { message: String },

    /// The request named a source kind no provider is registered for.
    #[error("Unsupported source '{source_kind}'")]
    UnsupportedSource { source_kind: String },

    /// The remote repository does not exist.
    #[error("{repository} doesn't exist")]
    NotFound { repository: String },

    /// The remote repository is larger than the configured limit.
    #[error("repo {repository} too big (>{limit_mb}MB) = {size_mb} MB")]
    PolicyViolation {
        repository: String,
        limit_mb: u64,
        size_mb: u64,
    },

    /// The per-request workspace could not be created.
    #[error("Cant create temporal dir for {target}")]
    Workspace {
        target: String,
        #[source]
        source: BoxError,
    },

    /// Clone, upload persistence or extraction failed.
    #[error("{message}")]
    Acquisition {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The counting tool could not be run or exited unsuccessfully.
    #[error("Error counting LOC in {target}")]
    ToolInvocation {
        target: String,
        #[source]
        source: BoxError,
    },

    /// The counting tool ran but its output could not be decoded.
    #[error("Error decoding LOC output for {target}")]
    Decode {
        target: String,
        #[source]
        source: BoxError,
    },

    /// A source provider could not be reached.
    #[error("Source provider unavailable while checking {repository}")]
    Upstream {
        repository: String,
        #[source]
        source: BoxError,
    },

    /// An external step exceeded its deadline.
    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: Operation, seconds: u64 },
}

/// External step a [`ApplicationError::Timeout`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Clone,
    Extract,
    Count,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Clone => f.write_str("Clone"),
            Operation::Extract => f.write_str("Extraction"),
            Operation::Count => f.write_str("Line count"),
        }
    }
}

impl ApplicationError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn acquisition(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Acquisition {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Short, stable machine-readable code for the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::UnsupportedSource { .. } => "UNSUPPORTED_SOURCE",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::PolicyViolation { .. } => "REPOSITORY_TOO_LARGE",
            Self::Workspace { .. } => "WORKSPACE_ERROR",
            Self::Acquisition { .. } => "ACQUISITION_FAILED",
            Self::ToolInvocation { .. } => "TOOL_INVOCATION_FAILED",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::Upstream { .. } => "UPSTREAM_UNAVAILABLE",
            Self::Timeout { .. } => "TIMEOUT",
        }
    }

    /// Whether the caller is at fault. Client errors are logged at a lower level.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::UnsupportedSource { .. }
                | Self::NotFound { .. }
                | Self::PolicyViolation { .. }
        )
    }
}
