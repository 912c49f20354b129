// Router-level checks for the read-only HTTP endpoints.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use challenge_studio::config::{parse_config, StudioConfig};
use challenge_studio::protocol::BankOut;
use challenge_studio::routes::build_router;
use challenge_studio::state::AppState;

async fn get_json(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
    let app = build_router(Arc::new(state));
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = get_json(AppState::default(), "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "ok": true }));
}

#[tokio::test]
async fn bank_falls_back_to_samples() {
    let (status, body) = get_json(AppState::from_config(StudioConfig::default()), "/api/v1/bank").await;
    assert_eq!(status, StatusCode::OK);
    let bank: BankOut = serde_json::from_value(body).unwrap();
    assert_eq!(bank.number_options, 5);
    assert_eq!(bank.items.len(), 2);
}

#[tokio::test]
async fn bank_lists_configured_entries() {
    let cfg = parse_config(
        r#"
number_options = 3

[[challenges]]
kind = "subjective"
title = "Haiku"
prompt = "Write a haiku about compilers."
summary = "form"
evaluation_criteria = "5-7-5"
"#,
        std::path::Path::new("inline.toml"),
    )
    .unwrap();
    let (_, body) = get_json(AppState::from_config(cfg), "/api/v1/bank").await;
    assert_eq!(
        body,
        serde_json::json!({
            "number_options": 3,
            "items": [{ "title": "Haiku", "challenge_type": "subjective" }]
        })
    );
}
