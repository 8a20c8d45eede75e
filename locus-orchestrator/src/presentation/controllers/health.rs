//! Health endpoint

use axum::{extract::State, response::Json};
use chrono::Utc;

use crate::presentation::controllers::OrchestratorState;
use crate::presentation::models::HealthResponse;

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<OrchestratorState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.startup_time.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}
