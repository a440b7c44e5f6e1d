//! Request lifecycle logging
//!
//! Every line for one request carries the same `request_id`, a per-process
//! sequence number. Start/done/model-switch lines are `info`, per-stage detail
//! is `debug`; the subscriber filter decides which ones reach the output.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::http::Method;
use tracing::{debug, info, warn};

/// Context for tracking one request through the proxy
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Sequence number for log correlation
    pub request_id: u64,
    /// When the request entered the handler
    pub start_time: Instant,
    pub method: Method,
    pub path: String,
    /// Model named in the request body (if any)
    pub model: Option<String>,
    pub streaming: bool,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(request_id: u64, method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id,
            start_time: Instant::now(),
            method,
            path: path.into(),
            model: None,
            streaming: false,
        }
    }

    /// Set the model for this request
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Mark this as a streaming request
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// `stream` or `sync`
    pub fn mode(&self) -> &'static str {
        if self.streaming {
            "stream"
        } else {
            "sync"
        }
    }

    /// Elapsed wall time rounded to the millisecond
    pub fn elapsed(&self) -> Duration {
        round_to_millis(self.start_time.elapsed())
    }

    pub fn log_received(&self) {
        debug!(
            request_id = self.request_id,
            method = %self.method,
            path = %self.path,
            "REQ"
        );
    }

    /// Log request initiation
    pub fn log_request_start(&self) {
        info!(
            request_id = self.request_id,
            method = %self.method,
            path = %self.path,
            mode = self.mode(),
            "START"
        );
    }

    pub fn log_request_details(&self) {
        debug!(
            request_id = self.request_id,
            model = self.model.as_deref().unwrap_or(""),
            stream = self.streaming,
            "REQ details"
        );
    }

    /// Log request being sent upstream
    pub fn log_upstream_request(&self, url: &str, auth_scheme: &str) {
        debug!(
            request_id = self.request_id,
            url = %url,
            auth = auth_scheme,
            "PROXY"
        );
    }

    /// Log response received from upstream
    pub fn log_upstream_response(&self, status: u16) {
        debug!(
            request_id = self.request_id,
            status = status,
            elapsed_ms = self.start_time.elapsed().as_millis() as u64,
            "RES"
        );
    }

    /// Log request completion with the number of body bytes relayed
    pub fn log_request_complete(&self, bytes: u64) {
        info!(
            request_id = self.request_id,
            mode = self.mode(),
            bytes = bytes,
            elapsed = ?self.elapsed(),
            "DONE"
        );
    }

    /// Log stream ended early because the caller went away
    pub fn log_caller_gone(&self, frames: usize) {
        debug!(
            request_id = self.request_id,
            frames = frames,
            "STREAM caller disconnected"
        );
    }

    /// Log upstream body read error while streaming
    pub fn log_stream_read_error(&self, error: &str) {
        debug!(
            request_id = self.request_id,
            error = %error,
            "STREAM read error"
        );
    }

    /// Log request failure
    pub fn log_error(&self, stage: &str, error: &str) {
        warn!(
            request_id = self.request_id,
            stage = stage,
            error = %error,
            elapsed = ?self.elapsed(),
            "ERROR"
        );
    }
}

fn round_to_millis(duration: Duration) -> Duration {
    let micros = duration.as_micros();
    let millis = (micros + 500) / 1000;
    Duration::from_millis(millis as u64)
}

/// Remembers the last model seen so switches are logged once
#[derive(Debug, Default)]
pub struct ModelTracker {
    last: Mutex<Option<String>>,
}

impl ModelTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `model`; returns true when it differs from the previous one
    pub fn observe(&self, model: &str) -> bool {
        if model.is_empty() {
            return false;
        }
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if last.as_deref() == Some(model) {
            return false;
        }
        *last = Some(model.to_string());
        true
    }

    /// Record `model` and log the switch at info level
    pub fn log_if_switched(&self, request_id: u64, model: Option<&str>) {
        if let Some(model) = model {
            if self.observe(model) {
                info!(request_id = request_id, model = model, "MODEL");
            }
        }
    }
}
