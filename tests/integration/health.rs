//! Health endpoint integration tests

use std::io::Write;

use claude_proxy::routes::health::HealthResponse;
use claude_proxy::AuthKind;
use pretty_assertions::assert_eq;

use crate::common::ProxyTestHarness;

#[tokio::test]
async fn test_health_reports_configuration() {
    let harness = ProxyTestHarness::new().await;

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(
        health,
        HealthResponse {
            status: "ok".to_string(),
            target: harness.upstream.uri(),
            auth_type: AuthKind::ApiKey,
            cf_access: false,
            has_token: true,
        }
    );
}

#[tokio::test]
async fn test_health_never_calls_upstream() {
    let harness = ProxyTestHarness::new().await;

    harness.server.get("/health").await.assert_status_ok();

    assert!(harness.upstream.received().await.is_empty());
    assert_eq!(harness.state.requests_seen(), 0);
}

#[tokio::test]
async fn test_health_answers_any_method_locally() {
    let harness = ProxyTestHarness::new().await;

    let response = harness.server.post("/health").json(&serde_json::json!({})).await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert!(harness.upstream.received().await.is_empty());
}

#[tokio::test]
async fn test_health_without_token_file_is_still_ok() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("auth.json");
    let harness = ProxyTestHarness::with_config(|config| {
        config.auth_type = AuthKind::TokenFile;
        config.api_key = missing.to_string_lossy().into_owned();
    })
    .await;

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert!(!health.has_token);
    assert_eq!(health.auth_type, AuthKind::TokenFile);
}

#[tokio::test]
async fn test_health_with_empty_token_reports_no_token() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"https://login.example.com": {{"token": ""}}}}"#).unwrap();
    let path = file.path().to_string_lossy().into_owned();

    let harness = ProxyTestHarness::with_config(|config| {
        config.auth_type = AuthKind::TokenFile;
        config.api_key = path;
        config.login_url = "https://login.example.com".to_string();
    })
    .await;

    let health: HealthResponse = harness.server.get("/health").await.json();
    assert!(!health.has_token);
}

#[tokio::test]
async fn test_health_with_empty_api_key_reports_no_token() {
    let harness = ProxyTestHarness::with_config(|config| {
        config.api_key = String::new();
    })
    .await;

    let health: HealthResponse = harness.server.get("/health").await.json();
    assert!(!health.has_token);
}
