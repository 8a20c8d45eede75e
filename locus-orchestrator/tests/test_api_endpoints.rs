//! Router tests driven through `tower::ServiceExt::oneshot`

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use tower::ServiceExt;

use common::*;
use locus_orchestrator::domain::services::SourceProvider;
use locus_orchestrator::domain::value_objects::SourceKind;

struct Api {
    harness: Harness,
    github: Arc<FakeProvider>,
    cloner: Arc<FakeCloner>,
    extractor: Arc<FakeExtractor>,
}

fn api(github: FakeProvider, report: Vec<u8>) -> Api {
    let github = Arc::new(github);
    let cloner = Arc::new(FakeCloner::new(Behaviour::Succeed));
    let extractor = Arc::new(FakeExtractor::new(Behaviour::Succeed));
    let harness = Harness::new(
        vec![
            github.clone() as Arc<dyn SourceProvider>,
            Arc::new(FakeProvider::existing(SourceKind::GitLab, 1)),
        ],
        cloner.clone(),
        extractor.clone(),
        Arc::new(FakeCounter::new(report)),
        test_settings(),
    );
    Api {
        harness,
        github,
        cloner,
        extractor,
    }
}

fn default_api() -> Api {
    api(
        FakeProvider::existing(SourceKind::GitHub, 2),
        two_language_report(),
    )
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn upload_request(uri: &str, field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let boundary = "locus-test-boundary";
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(multipart_body(boundary, field, filename, content)))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let t = default_api();
    let response = t.harness.router().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_remote_request_returns_language_rows() {
    let t = default_api();
    let response = t
        .harness
        .router()
        .oneshot(get("/v1/loc?github=octo/demo"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["language"], "Rust");
    assert_eq!(rows[2]["language"], "Total");
    assert_eq!(rows[2]["files"], 10);
    assert_eq!(rows[2]["linesOfCode"], 820);
    assert_eq!(t.cloner.calls()[0].0, "https://github.com/octo/demo");
    assert!(t.harness.leftovers().is_empty());
}

#[tokio::test]
async fn test_path_is_case_insensitive_and_tolerates_trailing_slash() {
    let t = default_api();
    let response = t
        .harness
        .router()
        .oneshot(get("/V1/Loc/?github=octo/demo"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_bad_paths_touch_nothing() {
    for uri in [
        "/",
        "/v1",
        "/v2/loc?github=octo/demo",
        "/v1/loc/extra?github=octo/demo",
        "/loc?github=octo/demo",
    ] {
        let t = default_api();
        let response = t.harness.router().oneshot(get(uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR", "{uri}");
        assert!(t.github.calls().is_empty(), "{uri}");
        assert!(t.cloner.calls().is_empty(), "{uri}");
        assert_eq!(t.harness.order_tokens.issued(), 0, "{uri}");
        assert!(t.harness.leftovers().is_empty(), "{uri}");
    }
}

#[tokio::test]
async fn test_malformed_repository_is_rejected_without_side_effects() {
    for uri in [
        "/v1/loc",
        "/v1/loc?github=octo",
        "/v1/loc?github=/demo",
        "/v1/loc?github=octo/",
        "/v1/loc?github=a/b/c",
    ] {
        let t = default_api();
        let response = t.harness.router().oneshot(get(uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body = body_json(response).await;
        assert_eq!(body["message"], "Incorrect user/repo", "{uri}");
        assert!(t.github.calls().is_empty(), "{uri}");
        assert!(t.harness.leftovers().is_empty(), "{uri}");
    }
}

#[tokio::test]
async fn test_unknown_source_is_rejected() {
    let t = default_api();
    let response = t
        .harness
        .router()
        .oneshot(get("/v1/loc?bitbucket=octo/demo"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "UNSUPPORTED_SOURCE");
    assert_eq!(t.harness.order_tokens.issued(), 0);
}

#[tokio::test]
async fn test_more_than_one_source_is_rejected() {
    let t = default_api();
    let response = t
        .harness
        .router()
        .oneshot(get("/v1/loc?github=octo/demo&gitlab=octo/demo"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(t.github.calls().is_empty());
}

#[tokio::test]
async fn test_missing_repository_maps_to_404() {
    let t = api(FakeProvider::missing(SourceKind::GitHub), two_language_report());
    let response = t
        .harness
        .router()
        .oneshot(get("/v1/loc?github=octo/ghost"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["message"], "octo/ghost doesn't exist");
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn test_oversized_repository_maps_to_413() {
    let t = api(
        FakeProvider::existing(SourceKind::GitHub, 900),
        two_language_report(),
    );
    let response = t
        .harness
        .router()
        .oneshot(get("/v1/loc?github=octo/huge"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = body_json(response).await;
    assert_eq!(body["code"], "REPOSITORY_TOO_LARGE");
    assert_eq!(body["message"], "repo octo/huge too big (>500MB) = 900 MB");
    assert!(t.cloner.calls().is_empty());
}

#[tokio::test]
async fn test_multipart_upload_is_counted() {
    let t = api(
        FakeProvider::existing(SourceKind::GitHub, 1),
        single_language_report(),
    );
    let request = upload_request("/v1/upload", "inputFile", "project.7z", b"7z-bytes");

    let response = t.harness.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["files"], 10);
    assert_eq!(rows[1]["language"], "Total");

    let archives = t.extractor.archives();
    assert_eq!(archives.len(), 1);
    assert!(archives[0].0.ends_with("1/project.7z"));
    assert_eq!(archives[0].1, b"7z-bytes".to_vec());
    assert!(t.github.calls().is_empty());
    assert!(t.harness.leftovers().is_empty());
}

#[tokio::test]
async fn test_post_ignores_query_and_operation() {
    let t = api(
        FakeProvider::existing(SourceKind::GitHub, 1),
        single_language_report(),
    );
    let request = upload_request("/v1/anything?github=octo/demo", "inputFile", "a.zip", b"zip");

    let response = t.harness.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(t.github.calls().is_empty());
    assert!(t.cloner.calls().is_empty());
}

#[tokio::test]
async fn test_upload_filename_is_reduced_to_last_component() {
    let t = api(
        FakeProvider::existing(SourceKind::GitHub, 1),
        single_language_report(),
    );
    let request = upload_request("/v1/loc", "inputFile", "../../escape.zip", b"zip");

    let response = t.harness.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let archives = t.extractor.archives();
    assert!(archives[0].0.ends_with("1/escape.zip"));
}

#[tokio::test]
async fn test_upload_named_like_extraction_dir_is_rejected() {
    let t = default_api();
    let request = upload_request("/v1/loc", "inputFile", "archive/src", b"zip");

    let response = t.harness.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Missing or reserved file name for inputFile");
    assert!(t.extractor.archives().is_empty());
    assert!(t.harness.leftovers().is_empty());
}

#[tokio::test]
async fn test_upload_without_input_file_is_rejected() {
    let t = default_api();
    let request = upload_request("/v1/loc", "attachment", "code.zip", b"zip");

    let response = t.harness.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Missing form field inputFile");
    assert!(t.extractor.archives().is_empty());
    assert_eq!(t.harness.order_tokens.issued(), 0);
    assert!(t.harness.leftovers().is_empty());
}

#[tokio::test]
async fn test_non_multipart_post_is_rejected() {
    let t = default_api();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/loc")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = t.harness.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(t.harness.leftovers().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_get_distinct_workspaces() {
    let t = default_api();
    let router = t.harness.router();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            router.oneshot(get("/v1/loc?github=octo/demo")).await.unwrap()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().status(), StatusCode::OK);
    }

    let mut destinations: Vec<_> = t.cloner.calls().into_iter().map(|(_, dest)| dest).collect();
    destinations.sort();
    destinations.dedup();
    assert_eq!(destinations.len(), 16);
    assert_eq!(t.harness.order_tokens.issued(), 16);
    assert!(t.harness.leftovers().is_empty());
}
