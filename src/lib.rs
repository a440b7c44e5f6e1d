//! Claude Proxy - local auth-rewriting reverse proxy
//!
//! Sits between an AI-assistant CLI and an Anthropic-compatible upstream.
//! Each request has its credential attached per the configured auth policy,
//! its body stripped of client-only fields, and its response relayed either
//! buffered or frame by frame for event streams.

pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod proxy;
pub mod routes;
pub mod sanitize;
pub mod streaming;

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;

pub use crate::config::{AuthKind, ProxyConfig, ServerSettings};
pub use crate::credentials::{CredentialKind, ResolvedCredential};
pub use crate::proxy::{ModelTracker, UpstreamClient};

/// Process-wide state shared across all request handlers
///
/// Built before the listener accepts connections. Only the request counter
/// and the logging-only model tracker change afterwards.
pub struct AppState {
    pub config: ProxyConfig,
    pub upstream: UpstreamClient,
    pub model_tracker: ModelTracker,
    request_counter: AtomicU64,
}

impl AppState {
    /// Create application state, building the outbound client from the config
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let client = proxy::build_http_client(&config)?;
        Ok(Self::with_client(config, client))
    }

    /// Create application state around an existing HTTP client
    pub fn with_client(config: ProxyConfig, client: reqwest::Client) -> Self {
        let upstream = UpstreamClient::new(client, &config);
        Self {
            config,
            upstream,
            model_tracker: ModelTracker::new(),
            request_counter: AtomicU64::new(0),
        }
    }

    /// Assign the next request sequence number, starting at 1
    pub fn next_request_id(&self) -> u64 {
        self.request_counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Number of sequence numbers handed out so far
    pub fn requests_seen(&self) -> u64 {
        self.request_counter.load(Ordering::Relaxed)
    }
}
