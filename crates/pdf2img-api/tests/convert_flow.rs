//! End-to-end coverage for the service's HTTP surface, in a crate-root
//! `tests/` directory the way `riptide-config/tests/api_key_validation_tests.rs`
//! exercises its crate from the outside.

use pdf2img_api::routes::build_router;
use pdf2img_api::state::AppState;
use pdf2img_config::ServiceConfig;
use std::net::SocketAddr;

async fn spawn_service() -> SocketAddr {
    let state = AppState::new(ServiceConfig::default());
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn health_endpoint_reports_ok_under_generous_thresholds() {
    let addr = spawn_service().await;
    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert!(resp.status().is_success() || resp.status().as_u16() == 503);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body.get("data").is_some());
}

#[tokio::test]
async fn metrics_endpoint_returns_zeroed_snapshot_before_any_requests() {
    let addr = spawn_service().await;
    let resp = reqwest::get(format!("http://{addr}/metrics")).await.unwrap();
    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["successCount"], 0);
}

#[tokio::test]
async fn convert_rejects_missing_url_with_400() {
    let addr = spawn_service().await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/pdf2img"))
        .json(&serde_json::json!({ "globalPadId": "pad-1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "URL is required");
}

#[tokio::test]
async fn convert_rejects_malformed_url_with_400() {
    let addr = spawn_service().await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/pdf2img"))
        .json(&serde_json::json!({ "url": "not a url", "globalPadId": "pad-1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn workers_endpoint_reports_pool_shape() {
    let addr = spawn_service().await;
    let resp = reqwest::get(format!("http://{addr}/workers")).await.unwrap();
    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["workers"]["count"].as_u64().unwrap() >= 2);
}
