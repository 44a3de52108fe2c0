//! Integration tests for the skillmatch HTTP service.
//!
//! State is built around a pinned-vector embedder, so no model files are
//! required.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use common::{scenario_matcher, READ_QUERY, WEATHER_QUERY};
use skillmatch::{
    definition_handler, health_handler, index_handler, match_handler, ready_handler, AppState,
    Config,
};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower::ServiceExt;

async fn create_state() -> Arc<AppState> {
    let matcher = scenario_matcher().await;
    Arc::new(AppState::from_parts(Arc::new(matcher), Config::default()))
}

/// Helper to create a test router with every endpoint.
fn create_test_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/match", post(match_handler))
        .route("/skills/:id", get(definition_handler))
        .route("/index", get(index_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .with_state(state)
}

/// Helper to make a JSON request to the router.
async fn json_request(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let req = match method {
        "GET" => Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
        "POST" => Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.unwrap_or(json!({})).to_string()))
            .unwrap(),
        _ => panic!("Unsupported method"),
    };

    let response = app.oneshot(req).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));

    (status, body)
}

// ============================================================================
// Health Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint_returns_200() {
    let app = Router::new().route("/health", get(health_handler));
    let (status, body) = json_request(app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body.get("skills").is_none());
}

#[tokio::test]
async fn test_ready_endpoint_reports_skills() {
    let app = create_test_app(create_state().await);
    let (status, body) = json_request(app, "GET", "/ready", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["skills"], 3);
}

#[tokio::test]
async fn test_ready_endpoint_not_ready() {
    let state = create_state().await;
    state.ready.store(false, Ordering::SeqCst);
    let app = create_test_app(state);

    let (status, body) = json_request(app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "not_ready");
}

// ============================================================================
// Match Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_match_returns_ranked_skills_and_cost() {
    let app = create_test_app(create_state().await);

    let (status, body) = json_request(
        app,
        "POST",
        "/match",
        Some(json!({ "query": READ_QUERY, "top_k": 2, "threshold": 0.3 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "semantic");
    assert!(body["request_id"].is_string());

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], "file_read");
    assert_eq!(results[0]["cost_tokens"], 150);
    assert_eq!(body["estimated_cost"], 450);
}

#[tokio::test]
async fn test_match_uses_config_defaults() {
    let app = create_test_app(create_state().await);

    // threshold defaults to 0.3, so only file_read qualifies
    let (status, body) =
        json_request(app, "POST", "/match", Some(json!({ "query": READ_QUERY }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_match_no_relevant_skill_is_empty_200() {
    let app = create_test_app(create_state().await);

    let (status, body) = json_request(
        app,
        "POST",
        "/match",
        Some(json!({ "query": WEATHER_QUERY, "top_k": 3 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["results"].as_array().unwrap().is_empty());
    assert_eq!(body["estimated_cost"], 300);
}

#[tokio::test]
async fn test_match_empty_query_returns_400() {
    let app = create_test_app(create_state().await);

    let (status, body) = json_request(app, "POST", "/match", Some(json!({ "query": "  " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_match_invalid_threshold_returns_400() {
    let app = create_test_app(create_state().await);

    let (status, body) = json_request(
        app,
        "POST",
        "/match",
        Some(json!({ "query": READ_QUERY, "threshold": 2.0 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("threshold"));
}

#[tokio::test]
async fn test_match_embedding_failure_returns_503() {
    let app = create_test_app(create_state().await);

    let (status, body) = json_request(
        app,
        "POST",
        "/match",
        Some(json!({ "query": "text the embedder has never seen" })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "matching temporarily unavailable");
}

#[tokio::test]
async fn test_match_lexical_mode() {
    let app = create_test_app(create_state().await);

    let (status, body) = json_request(
        app,
        "POST",
        "/match",
        Some(json!({ "query": "save the report", "mode": "lexical" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "lexical");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], "file_write");
    assert_eq!(results[0]["score"], 1.0);
    assert_eq!(body["estimated_cost"], 420);
}

// ============================================================================
// Definition and Index Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_definition_returns_full_schema() {
    let app = create_test_app(create_state().await);

    let (status, body) = json_request(app, "GET", "/skills/file_read", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "file_read");
    assert_eq!(body["cost_tokens"], 150);
    assert_eq!(body["definition"]["name"], "read_file");
    assert_eq!(body["definition"]["parameters"][0]["name"], "path");
    assert_eq!(body["definition"]["parameters"][0]["type"], "string");
    assert!(body["definition"]["examples"].is_array());
}

#[tokio::test]
async fn test_definition_unknown_id_returns_404() {
    let app = create_test_app(create_state().await);

    let (status, body) = json_request(app, "GET", "/skills/nonexistent_id", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("unknown tool id"));
}

#[tokio::test]
async fn test_index_lists_catalog_and_savings() {
    let app = create_test_app(create_state().await);

    let (status, body) = json_request(app, "GET", "/index", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["skills"].as_array().unwrap().len(), 3);
    assert_eq!(body["index_cost"], 300);

    let index = body["index"].as_str().unwrap();
    assert!(index.contains("[files]"));
    assert!(index.contains("- exec_cmd: Run shell commands"));

    assert_eq!(body["savings"]["traditional"], 350);
}
