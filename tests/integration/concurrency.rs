//! Concurrent request handling

use futures::future::join_all;
use serde_json::json;
use wiremock::ResponseTemplate;

use crate::common::{messages_request, ProxyTestHarness};

#[tokio::test]
async fn test_concurrent_requests_each_get_a_sequence_number() {
    let harness = ProxyTestHarness::new().await;
    harness
        .upstream
        .mock_any(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .await;
    let base_url = harness.spawn_listener().await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let requests = (0..50).map(|i| {
        let model = if i % 2 == 0 { "claude-a" } else { "claude-b" };
        client
            .post(format!("{}/v1/messages", base_url))
            .header("content-type", "application/json")
            .body(messages_request(model).to_string())
            .send()
    });

    for response in join_all(requests).await {
        assert_eq!(response.unwrap().status(), 200);
    }

    assert_eq!(harness.state.requests_seen(), 50);
    assert_eq!(harness.upstream.received().await.len(), 50);
}

#[tokio::test]
async fn test_health_does_not_consume_sequence_numbers() {
    let harness = ProxyTestHarness::new().await;
    harness
        .upstream
        .mock_any(ResponseTemplate::new(200).set_body_json(json!({})))
        .await;

    harness.server.get("/health").await.assert_status_ok();
    harness
        .server
        .post("/v1/messages")
        .json(&messages_request("claude-3"))
        .await
        .assert_status_ok();

    assert_eq!(harness.state.requests_seen(), 1);
}
