//! Common test utilities and fixtures
//!
//! Provides a harness that wires the proxy router to a wiremock upstream.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};

use claude_proxy::{routes::create_router, AppState, AuthKind, ProxyConfig};

use crate::mocks::upstream::MockUpstream;

/// API key the default harness is configured with
pub const TEST_API_KEY: &str = "sk-ant-test-key";

/// Test harness for the proxy
pub struct ProxyTestHarness {
    pub server: TestServer,
    pub upstream: MockUpstream,
    pub state: Arc<AppState>,
}

impl ProxyTestHarness {
    /// Harness with api-key auth and no gateway headers
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Harness whose config is adjusted by `configure` before the router is built
    pub async fn with_config<F>(configure: F) -> Self
    where
        F: FnOnce(&mut ProxyConfig),
    {
        let upstream = MockUpstream::start().await;

        let mut config = ProxyConfig {
            target: upstream.uri(),
            auth_type: AuthKind::ApiKey,
            api_key: TEST_API_KEY.to_string(),
            cf_access: false,
            ..ProxyConfig::default()
        };
        configure(&mut config);
        let config = config.validate().expect("test config is valid");

        // Ignore any proxy set in the test environment; the mock is on loopback
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("test client builds");

        let state = Arc::new(AppState::with_client(config, client));
        let server = TestServer::new(create_router(state.clone())).expect("test server starts");

        Self {
            server,
            upstream,
            state,
        }
    }

    /// Serve the same state on a real loopback listener and return its base URL
    ///
    /// Use this when several requests must be in flight at once.
    pub async fn spawn_listener(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback listener");
        let addr = listener.local_addr().expect("listener address");
        let app = create_router(self.state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("proxy server runs");
        });

        format!("http://{}", addr)
    }
}

/// A minimal non-streaming messages request
pub fn messages_request(model: &str) -> Value {
    json!({
        "model": model,
        "max_tokens": 64,
        "messages": [{"role": "user", "content": "Hello"}]
    })
}

/// A minimal streaming messages request
pub fn streaming_messages_request(model: &str) -> Value {
    let mut body = messages_request(model);
    body["stream"] = json!(true);
    body
}

/// A sample Anthropic messages response
pub fn sample_message_response() -> Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-sonnet-20241022",
        "content": [{"type": "text", "text": "Hi there"}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 5, "output_tokens": 3}
    })
}
