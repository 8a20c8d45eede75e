//! HTTP middleware and error mapping

use std::time::Instant;

use axum::{
    extract::Request,
    http::{StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use uuid::Uuid;

use locus_core::ApplicationError;

use crate::presentation::models::ErrorResponse;

/// Identifier assigned to each request by [`logging_middleware`]
#[derive(Debug, Clone, Copy)]
pub struct RequestId(pub Uuid);

/// HTTP status for each error kind
pub fn status_for(error: &ApplicationError) -> StatusCode {
    match error {
        ApplicationError::Validation { .. } | ApplicationError::UnsupportedSource { .. } => {
            StatusCode::BAD_REQUEST
        }
        ApplicationError::NotFound { .. } => StatusCode::NOT_FOUND,
        ApplicationError::PolicyViolation { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        ApplicationError::Acquisition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ApplicationError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        ApplicationError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        ApplicationError::Workspace { .. }
        | ApplicationError::ToolInvocation { .. }
        | ApplicationError::Decode { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert ApplicationError to HTTP response
pub fn application_error_to_response(
    error: ApplicationError,
    uri: &Uri,
    request_id: Option<RequestId>,
) -> Response {
    let sanitize_errors = std::env::var("ENV").unwrap_or_default() == "production";
    let status = status_for(&error);
    let code = error.code();
    let cause = std::error::Error::source(&error).map(|source| source.to_string());

    if error.is_client_error() {
        tracing::warn!(
            error = %error,
            uri = %uri,
            http_status = %status,
            error_code = code,
            "Request rejected"
        );
    } else {
        tracing::error!(
            error = %error,
            cause = cause.as_deref().unwrap_or_default(),
            uri = %uri,
            http_status = %status,
            error_code = code,
            "Application error mapped to HTTP response"
        );
    }

    let error_response = ErrorResponse {
        code: code.to_string(),
        message: error.to_string(),
        details: match cause {
            Some(cause) if !sanitize_errors => Some(serde_json::json!({ "error": cause })),
            _ => None,
        },
        request_id: request_id.map(|id| id.0).unwrap_or_else(Uuid::new_v4),
        timestamp: Utc::now(),
    };

    (status, Json(error_response)).into_response()
}

/// Access log middleware; tags the request with a [`RequestId`]
pub async fn logging_middleware(mut request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = Uuid::new_v4();
    let start_time = Instant::now();
    request.extensions_mut().insert(RequestId(request_id));

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        "Processing request"
    );

    let response = next.run(request).await;
    let duration = start_time.elapsed();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}
