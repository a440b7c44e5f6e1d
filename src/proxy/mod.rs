//! Proxy module
//!
//! Handles outbound client setup, auth headers, request forwarding and
//! relaying the upstream response back to the caller.

pub mod client;
pub mod headers;
pub mod logging;
pub mod relay;
pub mod upstream;

pub use client::build_http_client;
pub use headers::AuthScheme;
pub use logging::{ModelTracker, RequestContext};
pub use upstream::UpstreamClient;
