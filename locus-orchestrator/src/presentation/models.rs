//! API response models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Error envelope returned for every failed request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    #[schema(example = "REPOSITORY_TOO_LARGE")]
    pub code: String,

    /// Human-readable error message
    #[schema(example = "repo octo/huge too big (>500MB) = 731 MB")]
    pub message: String,

    /// Underlying cause, omitted when running with `ENV=production`
    #[schema(example = r#"{"error": "scc exited with exit status: 2"}"#)]
    pub details: Option<serde_json::Value>,

    /// Request identifier, also present in the access log
    pub request_id: Uuid,

    #[schema(example = "2024-01-15T10:30:00Z")]
    pub timestamp: DateTime<Utc>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,

    #[schema(example = "0.3.0")]
    pub version: String,

    /// Seconds since the server started
    #[schema(example = 3600)]
    pub uptime_seconds: u64,

    pub timestamp: DateTime<Utc>,
}

/// Multipart form accepted by the upload pipeline
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadForm {
    /// Archive to analyse (any format the extractor understands)
    #[serde(rename = "inputFile")]
    #[schema(value_type = String, format = Binary)]
    pub input_file: Vec<u8>,
}
