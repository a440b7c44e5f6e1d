//! Event-stream relay integration tests

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock, ResponseTemplate,
};

use crate::common::{streaming_messages_request, ProxyTestHarness};
use crate::mocks::upstream::sample_event_stream;

#[tokio::test]
async fn test_stream_is_relayed_verbatim_with_event_stream_headers() {
    let harness = ProxyTestHarness::new().await;
    let frames = sample_event_stream();
    harness.upstream.mock_messages_stream(&frames).await;

    let response = harness
        .server
        .post("/v1/messages")
        .json(&streaming_messages_request("claude-3-5-sonnet-20241022"))
        .await;

    response.assert_status_ok();
    assert_eq!(response.headers()["content-type"], "text/event-stream");
    assert_eq!(response.headers()["cache-control"], "no-cache");
    assert_eq!(response.text(), frames.concat());
}

#[tokio::test]
async fn test_stream_flag_is_forwarded() {
    let harness = ProxyTestHarness::new().await;
    harness
        .upstream
        .mock_messages_stream(&sample_event_stream())
        .await;

    harness
        .server
        .post("/v1/messages")
        .json(&streaming_messages_request("claude-3"))
        .await
        .assert_status_ok();

    let body = harness.upstream.single_json_body().await;
    assert_eq!(body["stream"], json!(true));
}

#[tokio::test]
async fn test_unterminated_tail_is_delivered() {
    let harness = ProxyTestHarness::new().await;
    harness
        .upstream
        .mock_messages_stream(&["data: first\n", "\n", "data: partial"])
        .await;

    let response = harness
        .server
        .post("/v1/messages")
        .json(&streaming_messages_request("claude-3"))
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "data: first\n\ndata: partial");
}

#[tokio::test]
async fn test_streamed_request_with_upstream_error_is_buffered() {
    let harness = ProxyTestHarness::new().await;
    let error_body = json!({
        "type": "error",
        "error": {"type": "invalid_request_error", "message": "bad model"}
    });

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(400).set_body_json(error_body.clone()))
        .mount(harness.upstream.server())
        .await;

    let response = harness
        .server
        .post("/v1/messages")
        .json(&streaming_messages_request("claude-3"))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(response.json::<Value>(), error_body);
}

#[tokio::test]
async fn test_non_streamed_event_stream_response_is_buffered() {
    let harness = ProxyTestHarness::new().await;
    harness
        .upstream
        .mock_messages_stream(&["data: x\n", "\n"])
        .await;

    // stream is a string, not a boolean, so the request is treated as non-streaming
    let mut request = streaming_messages_request("claude-3");
    request["stream"] = json!("true");

    let response = harness.server.post("/v1/messages").json(&request).await;

    response.assert_status_ok();
    // Upstream headers are mirrored in buffered mode
    assert_eq!(response.headers()["content-type"], "text/event-stream");
    assert_eq!(response.text(), "data: x\n\n");
}
