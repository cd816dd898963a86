//! Integration tests for callqa-audit API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use base64::prelude::*;
use http_body_util::BodyExt;
use serde_json::json;
use tower::util::ServiceExt;

use callqa_audit::db::CallStore;
use callqa_audit::services::analysis::AnalysisClient;
use callqa_audit::services::transcription::TranscriptionClient;
use callqa_common::config::TomlConfig;

/// Test helper: app with an in-memory database and a throwaway upload dir
///
/// The returned temp dir keeps the upload directory alive for the test.
async fn create_test_app() -> (axum::Router, tempfile::TempDir) {
    let (app, dir, _pool) = create_test_app_with_pool().await;
    (app, dir)
}

/// Variant exposing the pool for tests that break the database on purpose
async fn create_test_app_with_pool() -> (axum::Router, tempfile::TempDir, sqlx::SqlitePool) {
    // A multi-connection pool would hand each connection its own
    // private :memory: database
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    callqa_audit::db::init_tables(&pool)
        .await
        .expect("Failed to initialize database schema");

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let mut config = TomlConfig::default();
    config.upload_dir = temp_dir.path().to_path_buf();
    // Unroutable collaborator endpoints; these tests never reach them
    config.transcription_url = "http://127.0.0.1:1/v1/transcribe".to_string();
    config.analysis_url = "http://127.0.0.1:1/v1/analyze".to_string();
    config.max_upload_bytes = 1024;

    let transcriber = TranscriptionClient::new(
        config.transcription_url.clone(),
        None,
        config.max_upload_bytes,
    )
    .expect("Failed to build transcription client");
    let analyzer =
        AnalysisClient::new(config.analysis_url.clone(), None).expect("Failed to build analysis client");

    let state =
        callqa_audit::AppState::new(CallStore::new(pool.clone()), transcriber, analyzer, config);
    (callqa_audit::build_router(state), temp_dir, pool)
}

fn upload_request(filename: &str, audio: &[u8], agent_id: Option<&str>) -> Request<Body> {
    let mut body = json!({
        "filename": filename,
        "audio_base64": BASE64_STANDARD.encode(audio),
    });
    if let Some(agent) = agent_id {
        body["agent_id"] = json!(agent);
    }

    Request::builder()
        .method("POST")
        .uri("/api/calls")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _dir) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "callqa-audit");
}

#[tokio::test]
async fn test_upload_creates_record_and_stores_audio() {
    let (app, dir) = create_test_app().await;

    let response = app
        .oneshot(upload_request("call.mp3", b"fake_mp3_data", Some("agent-7")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let json = response_json(response).await;
    assert_eq!(json["status"], "Uploaded");
    assert_eq!(json["filename"], "call.mp3");
    assert_eq!(json["agent_id"], "agent-7");
    assert!(json["transcript"].is_null());
    assert!(json["scores"].is_null());

    // Audio landed in the upload directory under the record id
    let id = json["id"].as_str().unwrap();
    let audio_path = dir.path().join(format!("{id}.mp3"));
    assert_eq!(std::fs::read(&audio_path).unwrap(), b"fake_mp3_data");
}

#[tokio::test]
async fn test_upload_rejects_unsupported_format() {
    let (app, _dir) = create_test_app().await;

    let response = app
        .oneshot(upload_request("call.flac", b"data", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_upload_rejects_invalid_base64() {
    let (app, _dir) = create_test_app().await;

    let body = json!({
        "filename": "call.mp3",
        "audio_base64": "not valid base64!!!",
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/calls")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_rejects_oversized_payload() {
    let (app, dir) = create_test_app().await;

    // The test config caps uploads at 1024 bytes
    let response = app
        .oneshot(upload_request("call.wav", &[0u8; 2048], None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");

    // Nothing was written to disk for the rejected upload
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_failed_record_creation_leaves_no_orphaned_audio() {
    let (app, dir, pool) = create_test_app_with_pool().await;

    // A closed pool fails the insert after the audio has been stored
    pool.close().await;

    let response = app
        .oneshot(upload_request("call.mp3", b"fake_mp3_data", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_get_unknown_call_is_not_found() {
    let (app, _dir) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/calls/{}", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = response_json(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_filters_by_agent() {
    let (app, _dir) = create_test_app().await;

    app.clone()
        .oneshot(upload_request("a.mp3", b"a", Some("agent-a")))
        .await
        .unwrap();
    app.clone()
        .oneshot(upload_request("b.mp3", b"b", Some("agent-b")))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/calls?agent_id=agent-b")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["filename"], "b.mp3");
}

#[tokio::test]
async fn test_list_rejects_unknown_status_filter() {
    let (app, _dir) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/calls?status=Done")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_removes_record_and_audio() {
    let (app, dir) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(upload_request("call.ogg", b"audio", None))
        .await
        .unwrap();
    let id = response_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/calls/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Both the record and its stored audio are gone
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/calls/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!dir.path().join(format!("{id}.ogg")).exists());
}

#[tokio::test]
async fn test_advance_unknown_call_is_not_found() {
    let (app, _dir) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/calls/{}/advance", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_metrics_empty_store() {
    let (app, _dir) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/dashboard/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["total_calls"], 0);
    assert!(json["average_score"].is_null());
    // Distributions are zero-filled, never empty
    assert_eq!(json["sentiment_distribution"].as_array().unwrap().len(), 4);
    assert_eq!(json["urgency_distribution"].as_array().unwrap().len(), 3);
    assert_eq!(
        json["escalation_risk_histogram"].as_array().unwrap().len(),
        10
    );
}

#[tokio::test]
async fn test_dashboard_counts_uploaded_calls() {
    let (app, _dir) = create_test_app().await;

    app.clone()
        .oneshot(upload_request("a.mp3", b"a", None))
        .await
        .unwrap();
    app.clone()
        .oneshot(upload_request("b.wav", b"b", None))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/dashboard/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = response_json(response).await;
    assert_eq!(json["total_calls"], 2);
    // Unscored calls carry no average
    assert!(json["average_score"].is_null());
    assert_eq!(json["daily_trends"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_sentiment_chart_slice() {
    let (app, _dir) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/dashboard/charts/sentiment")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    let labels: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, ["Positive", "Neutral", "Negative", "Mixed"]);
}
