//! Inbound request body sanitizing
//!
//! Strips client-side-only fields the upstream rejects and pulls out the two
//! facts the rest of the pipeline needs: streaming intent and model name.

use bytes::Bytes;
use serde_json::{Map, Value};

/// Keys the CLI sends that the upstream does not accept
pub const STRIPPED_KEYS: &[&str] = &["context_management", "mcp_servers"];

/// Result of sanitizing a request body
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedBody {
    /// Bytes to forward upstream
    pub body: Bytes,
    pub is_streaming: bool,
    pub model: Option<String>,
}

impl SanitizedBody {
    fn passthrough(body: Bytes) -> Self {
        Self {
            body,
            is_streaming: false,
            model: None,
        }
    }
}

/// Sanitize a raw request body
///
/// Bodies that are empty, not JSON, or not a JSON object are forwarded as-is.
/// Objects lose the keys in [`STRIPPED_KEYS`]; when none were present the
/// original bytes are kept so the upstream sees exactly what the client sent.
pub fn sanitize(body: Bytes) -> SanitizedBody {
    if body.is_empty() {
        return SanitizedBody::passthrough(body);
    }

    let mut object: Map<String, Value> = match serde_json::from_slice(&body) {
        Ok(Value::Object(object)) => object,
        _ => return SanitizedBody::passthrough(body),
    };

    let is_streaming = object
        .get("stream")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let model = object
        .get("model")
        .and_then(Value::as_str)
        .map(str::to_string);

    let mut removed = false;
    for key in STRIPPED_KEYS {
        removed |= object.shift_remove(*key).is_some();
    }

    let body = if removed {
        match serde_json::to_vec(&object) {
            Ok(bytes) => Bytes::from(bytes),
            // Map<String, Value> always serializes
            Err(_) => body,
        }
    } else {
        body
    };

    SanitizedBody {
        body,
        is_streaming,
        model,
    }
}
