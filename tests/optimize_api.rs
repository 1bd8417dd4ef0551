use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use resume_optimizer::{
    backend::mock::{MockBackend, MockReply},
    build_app,
    state::AppState,
};
use serde_json::Value;
use tower::util::ServiceExt;

fn app_with(backend: Arc<MockBackend>) -> Router {
    build_app(AppState::new(backend))
}

async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_owned()))
                .expect("request build"),
        )
        .await
        .expect("request execution");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body should be readable");
    let json = serde_json::from_slice(&bytes).expect("response body should be JSON");
    (status, json)
}

#[tokio::test]
async fn returns_optimized_markdown_on_success() {
    let backend = Arc::new(
        MockBackend::default().with_replies([MockReply::Content("## Resume\n- Shipped".into())]),
    );

    let (status, body) = post_json(
        app_with(backend.clone()),
        "/api/optimize-resume",
        r#"{"resumeText":"Jane Doe\nEngineer","jobDescription":"Rust Developer","tone":"Impactful"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["optimized"], "## Resume\n- Shipped");
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn rejects_missing_resume_text_without_calling_backend() {
    for payload in [
        r#"{"jobDescription":"Rust Developer"}"#,
        r#"{"resumeText":null}"#,
        r#"{"resumeText":12}"#,
        r#"{"resumeText":""}"#,
        "null",
        "[]",
        r#"["Jane Doe"]"#,
    ] {
        let backend = Arc::new(MockBackend::default());
        let (status, body) = post_json(app_with(backend.clone()), "/api/optimize-resume", payload).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {payload}");
        assert_eq!(body["error"], "Missing resumeText");
        assert_eq!(backend.calls(), 0);
    }
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let backend = Arc::new(MockBackend::default());
    let (status, body) = post_json(app_with(backend.clone()), "/api/optimize-resume", "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON body");
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn empty_backend_content_is_still_ok() {
    let backend = Arc::new(MockBackend::default().with_replies([MockReply::Content(String::new())]));
    let (status, body) =
        post_json(app_with(backend), "/api/optimize", r#"{"resumeText":"Jane"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["optimized"], "");
}

#[tokio::test]
async fn backend_failures_use_the_error_envelope() {
    let backend = Arc::new(
        MockBackend::named("Ollama").with_replies([
            MockReply::Unreachable,
            MockReply::Status {
                status: 503,
                body: "model is loading".into(),
            },
        ]),
    );
    let app = app_with(backend);

    let (status, body) =
        post_json(app.clone(), "/api/optimize-resume", r#"{"resumeText":"Jane"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Cannot reach Ollama. Is it running?");

    let (status, body) = post_json(app, "/api/optimize-resume", r#"{"resumeText":"Jane"}"#).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Ollama error: model is loading");
}

async fn scrape_metrics(app: Router) -> String {
    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .expect("request build"),
        )
        .await
        .expect("request execution");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("metrics should be UTF-8")
}

#[tokio::test]
async fn metrics_label_requests_by_matched_route() {
    let app = app_with(Arc::new(MockBackend::default()));

    for _ in 0..2 {
        let (status, _) = post_json(app.clone(), "/api/optimize", r#"{"resumeText":"Jane"}"#).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) =
        post_json(app.clone(), "/api/optimize-resume", r#"{"resumeText":"Jane"}"#).await;
    assert_eq!(status, StatusCode::OK);

    let text = scrape_metrics(app).await;
    let count_for = |path: &str| {
        text.lines()
            .find(|line| {
                line.starts_with("resume_http_requests_total{")
                    && line.contains(&format!("path=\"{path}\""))
            })
            .and_then(|line| line.rsplit(' ').next())
            .map(ToOwned::to_owned)
    };
    assert_eq!(count_for("/api/optimize").as_deref(), Some("2"));
    assert_eq!(count_for("/api/optimize-resume").as_deref(), Some("1"));
}

#[tokio::test]
async fn metrics_count_optimize_requests() {
    let backend = Arc::new(MockBackend::default());
    let app = app_with(backend);

    let (status, _) = post_json(app.clone(), "/api/optimize-resume", r#"{"resumeText":"Jane"}"#).await;
    assert_eq!(status, StatusCode::OK);

    let text = scrape_metrics(app).await;
    assert!(text.contains("resume_http_requests_total"));
    assert!(text.contains("status=\"200\""));
}
