//! Catch-all proxy handler
//!
//! Every request not matched by another route lands here and goes through
//! the full pipeline: sanitize, resolve credential, forward, relay.

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Request, State},
    http::Method,
    response::Response,
};

use crate::{
    credentials,
    error::AppError,
    proxy::{relay::relay_response, AuthScheme, RequestContext},
    sanitize::sanitize,
    AppState,
};

/// Proxy handler for all paths
///
/// This handler:
/// 1. Reads and sanitizes the request body
/// 2. Resolves the credential and picks the auth scheme
/// 3. Forwards to `<target><path>` with the same method
/// 4. Relays the response, streaming it when the client asked for a stream
pub async fn proxy_handler(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    method: Method,
    request: Request,
) -> Result<Response, AppError> {
    let ctx = RequestContext::new(state.next_request_id(), method.clone(), uri.path());
    ctx.log_received();

    let raw = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .map_err(|e| {
            ctx.log_error("read", &e.to_string());
            AppError::BadRequest(format!("Failed to read request body: {}", e))
        })?;

    let sanitized = sanitize(raw);
    state
        .model_tracker
        .log_if_switched(ctx.request_id, sanitized.model.as_deref());

    let ctx = ctx
        .with_model(sanitized.model)
        .with_streaming(sanitized.is_streaming);
    ctx.log_request_start();
    ctx.log_request_details();

    let credential = credentials::resolve(&state.config).await.map_err(|e| {
        ctx.log_error("auth", &e.to_string());
        AppError::from(e)
    })?;
    let scheme = AuthScheme::select(&state.config, credential);

    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    let upstream = state
        .upstream
        .forward(&ctx, method, path_and_query, &scheme, sanitized.body)
        .await?;

    relay_response(ctx, upstream).await
}
