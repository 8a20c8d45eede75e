//! Route definitions and server setup

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    routing::get,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use locus_core::Config;

use crate::domain::entities::LanguageRecordOut;
use crate::presentation::{
    controllers::{OrchestratorState, dispatch, health::health_check},
    middleware::logging_middleware,
    models::{ErrorResponse, HealthResponse, UploadForm},
};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::controllers::loc::dispatch,
        crate::presentation::controllers::health::health_check
    ),
    components(schemas(LanguageRecordOut, ErrorResponse, HealthResponse, UploadForm)),
    tags(
        (name = "loc", description = "Lines of code per language"),
        (name = "health", description = "Service health")
    ),
    info(
        title = "Locus API",
        description = "Counts lines of code in GitHub or GitLab repositories and uploaded archives"
    )
)]
pub struct ApiDoc;

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
        .max_age(Duration::from_secs(3600));

    if allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| tracing::warn!(origin, "Invalid CORS origin in config; skipping"))
                .ok()
        })
        .collect();
    layer.allow_origin(origins)
}

/// Build the application router.
///
/// Analysis requests have no fixed route: they reach [`dispatch`] as the
/// fallback so that every path shape gets the same classification.
pub fn create_router(state: OrchestratorState, config: &Config) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .fallback(dispatch)
        .with_state(state);

    if config.server.enable_docs {
        router =
            router.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    router
        .layer(DefaultBodyLimit::max(config.limits.max_upload_bytes))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.request_timeout_seconds),
        ))
        .layer(cors_layer(&config.server.allowed_origins))
        .layer(TraceLayer::new_for_http())
}
