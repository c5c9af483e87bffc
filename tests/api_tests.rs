//! Integration tests for the arr-warden HTTP surface
//!
//! Covers the webhook intake contract: missing routing header and
//! unknown routing key are synchronous client errors, a known key is
//! accepted immediately regardless of pipeline outcome, and the
//! health endpoint needs no routing header.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

use arr_warden::config::{ConfigFormat, ConfigSource, Document};
use arr_warden::store::ProfileStore;
use arr_warden::{api, build_router, AppState};

/// Test helper: profile file with one Sonarr instance routed by "main"
fn setup_source(dir: &TempDir) -> ConfigSource {
    let source = ConfigSource::new(dir.path().join("profiles.yaml"), ConfigFormat::Yaml);
    let mut doc = Document::new();
    doc.insert(
        "main".to_string(),
        json!({
            "inst_type": "sonarr",
            "base_path": "http://127.0.0.1:9",
            "api_key": "test-key",
            "language_map": {
                "/media/anime": { "required_languages_audio": ["jpn"] }
            }
        }),
    );
    source.write_document(&doc).unwrap();
    source
}

fn setup_app(dir: &TempDir) -> axum::Router {
    let store = ProfileStore::open(setup_source(dir)).unwrap();
    build_router(AppState::new(Arc::new(store)))
}

async fn body_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_needs_no_routing_header() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "arr-warden");
}

#[tokio::test]
async fn webhook_without_routing_header_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn webhook_with_unknown_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header(api::ROUTING_HEADER, "nobody")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn webhook_with_known_key_is_accepted_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir);

    // The pipeline runs detached; even a body that will fail payload
    // validation still gets a success response at intake.
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header(api::ROUTING_HEADER, "main")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
