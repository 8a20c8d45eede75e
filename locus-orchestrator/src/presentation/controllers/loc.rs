//! Line-of-code endpoint
//!
//! Every path except `/health` and the docs lands in [`dispatch`], which
//! classifies the request before any resource is touched. POST selects the
//! upload pipeline; any other method must name exactly one remote source in
//! the query string.

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Multipart, Request, State, multipart::Field},
    http::{Method, Uri},
    response::{IntoResponse, Json, Response},
};
use tracing::{Instrument, info, info_span};

use locus_core::ApplicationError;

use crate::application::use_cases::sanitize_upload_name;
use crate::domain::entities::{LanguageRecordOut, RequestContext};
use crate::domain::services::UploadBody;
use crate::domain::value_objects::{RepositoryId, SourceKind};
use crate::presentation::controllers::OrchestratorState;
use crate::presentation::middleware::{RequestId, application_error_to_response};
use crate::presentation::models::{ErrorResponse, UploadForm};

/// Multipart field carrying the uploaded archive
pub const UPLOAD_FIELD: &str = "inputFile";

const INCORRECT_REPOSITORY: &str = "Incorrect user/repo";

/// Check the `/<version>/<op>` shape. The path is matched lowercased and a
/// single trailing slash is ignored. Returns the operation segment.
pub fn classify_path(path: &str, api_version: &str) -> Result<String, ApplicationError> {
    let path = path.to_lowercase();
    let path = path.strip_prefix('/').unwrap_or(&path);
    let path = path.strip_suffix('/').unwrap_or(path);

    let segments: Vec<&str> = path.split('/').collect();
    match segments.as_slice() {
        [version, op] if *version == api_version.to_lowercase() && !op.is_empty() => {
            Ok((*op).to_string())
        }
        _ => Err(ApplicationError::validation("Bad Request")),
    }
}

/// Resolve the query string of a remote request to a source and repository.
pub fn parse_remote_query(
    query: Option<&str>,
) -> Result<(SourceKind, RepositoryId), ApplicationError> {
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let (key, value) = match pairs.as_slice() {
        [] => return Err(ApplicationError::validation(INCORRECT_REPOSITORY)),
        [pair] => pair,
        _ => {
            return Err(ApplicationError::validation(
                "Exactly one source parameter is allowed",
            ));
        }
    };

    let repository: RepositoryId = value
        .parse()
        .map_err(|_| ApplicationError::validation(INCORRECT_REPOSITORY))?;
    let kind = SourceKind::from_query_key(key).ok_or_else(|| ApplicationError::UnsupportedSource {
        source_kind: key.clone(),
    })?;

    Ok((kind, repository))
}

/// Line-of-code analysis
///
/// Query form counts a remote repository; a multipart POST counts an
/// uploaded archive. The response lists one row per language followed by
/// a `Total` row.
#[utoipa::path(
    method(get, post),
    path = "/v1/{op}",
    params(
        ("op" = String, Path, description = "Operation name"),
        ("github" = Option<String>, Query, description = "GitHub repository as owner/name"),
        ("gitlab" = Option<String>, Query, description = "GitLab repository as owner/name")
    ),
    request_body(
        content = UploadForm,
        content_type = "multipart/form-data",
        description = "Archive upload (POST only)"
    ),
    responses(
        (status = 200, description = "Per-language counts with a trailing Total", body = Vec<LanguageRecordOut>),
        (status = 400, description = "Malformed path, query or form", body = ErrorResponse),
        (status = 404, description = "Repository does not exist", body = ErrorResponse),
        (status = 413, description = "Repository over the size limit", body = ErrorResponse),
        (status = 422, description = "Clone or extraction failed", body = ErrorResponse),
        (status = 500, description = "Counting failed", body = ErrorResponse)
    ),
    tag = "loc"
)]
pub async fn dispatch(State(state): State<OrchestratorState>, request: Request) -> Response {
    let uri = request.uri().clone();
    let request_id = request.extensions().get::<RequestId>().copied();

    let outcome = if request.method() == Method::POST {
        analyze_upload(&state, request).await
    } else {
        analyze_repository(&state, &uri).await
    };

    match outcome {
        Ok(languages) => Json(languages).into_response(),
        Err(error) => application_error_to_response(error, &uri, request_id),
    }
}

async fn analyze_repository(
    state: &OrchestratorState,
    uri: &Uri,
) -> Result<Vec<LanguageRecordOut>, ApplicationError> {
    classify_path(uri.path(), &state.api_version)?;
    let (kind, repository) = parse_remote_query(uri.query())?;

    let order = state.order_tokens.issue();
    let mut context = RequestContext::new(order, kind, repository.to_string());
    let span = info_span!("loc", order = %order, source = %kind, target = %repository);

    async {
        info!("Remote analysis dispatched");
        state
            .analyze_repository
            .execute(&repository, &mut context)
            .await
    }
    .instrument(span)
    .await
}

async fn analyze_upload(
    state: &OrchestratorState,
    request: Request,
) -> Result<Vec<LanguageRecordOut>, ApplicationError> {
    classify_path(request.uri().path(), &state.api_version)?;

    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| ApplicationError::validation(e.body_text()))?;

    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(UPLOAD_FIELD) => break field,
            Ok(Some(_)) => continue,
            Ok(None) => {
                return Err(ApplicationError::validation(format!(
                    "Missing form field {UPLOAD_FIELD}"
                )));
            }
            Err(e) => return Err(ApplicationError::validation(e.body_text())),
        }
    };

    let filename = field
        .file_name()
        .and_then(sanitize_upload_name)
        .ok_or_else(|| {
            ApplicationError::validation(format!(
                "Missing or reserved file name for {UPLOAD_FIELD}"
            ))
        })?;

    let order = state.order_tokens.issue();
    let mut context = RequestContext::new(order, SourceKind::Upload, filename.clone());
    let span = info_span!("loc", order = %order, source = %SourceKind::Upload, target = %filename);

    let mut body = FieldBody(field);
    async {
        info!("Upload analysis dispatched");
        state
            .analyze_upload
            .execute(&filename, &mut body, &mut context)
            .await
    }
    .instrument(span)
    .await
}

/// Streams a multipart field into the upload pipeline
struct FieldBody<'a>(Field<'a>);

#[async_trait]
impl<'a> UploadBody for FieldBody<'a> {
    async fn next_chunk(
        &mut self,
    ) -> Result<Option<Vec<u8>>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.0.chunk().await?.map(|bytes| bytes.to_vec()))
    }
}
