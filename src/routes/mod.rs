//! HTTP routes for the proxy
//!
//! `/health` is answered locally for any method; every other path is proxied
//! upstream.

pub mod health;
pub mod proxy;

use std::sync::Arc;

use axum::{routing::any, Router};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", any(health::health_check))
        .fallback(proxy::proxy_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
