//! Mock Anthropic-compatible upstream for testing
//!
//! Provides wiremock-based mocks for the endpoints the proxy forwards to:
//! - POST /v1/messages - buffered and SSE responses
//! - any other path via `mock_any`
//!
//! # Example
//!
//! ```rust,ignore
//! let upstream = MockUpstream::start().await;
//! upstream.mock_messages_json(200, json!({"ok": true})).await;
//! // point the proxy target at upstream.uri()
//! ```

use serde_json::Value;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, Request, ResponseTemplate,
};

/// Mock upstream server wrapper
pub struct MockUpstream {
    server: MockServer,
}

impl MockUpstream {
    /// Start a new mock upstream server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get the mock server URI
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Access the underlying server for custom mocks
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Every request the upstream has received so far
    pub async fn received(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Body of the only request received, parsed as JSON
    pub async fn single_json_body(&self) -> Value {
        let requests = self.received().await;
        assert_eq!(requests.len(), 1, "expected exactly one upstream request");
        serde_json::from_slice(&requests[0].body).expect("upstream body is JSON")
    }

    // =========================================================================
    // POST /v1/messages
    // =========================================================================

    /// Mock a JSON response with the given status
    pub async fn mock_messages_json(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock an SSE response whose body is exactly `frames` concatenated
    pub async fn mock_messages_stream(&self, frames: &[&str]) {
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(frames.concat(), "text/event-stream")
                    .insert_header("Cache-Control", "no-cache"),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock a raw response for any request
    pub async fn mock_any(&self, template: ResponseTemplate) {
        Mock::given(wiremock::matchers::any())
            .respond_with(template)
            .mount(&self.server)
            .await;
    }
}

/// Sample Anthropic event stream, one element per line
pub fn sample_event_stream() -> Vec<&'static str> {
    vec![
        "event: message_start\n",
        "data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\",\"model\":\"claude-3-5-sonnet-20241022\"}}\n",
        "\n",
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hello\"}}\n",
        "\n",
        "event: message_stop\n",
        "data: {\"type\":\"message_stop\"}\n",
        "\n",
    ]
}
