//! Upstream forwarder
//!
//! Sends the sanitized request to `<target><path>` with the inbound method,
//! the fixed header set and the selected auth headers. Failed calls are not
//! retried.

use axum::http::Method;
use bytes::Bytes;
use reqwest::Client;

use crate::{
    config::ProxyConfig,
    credentials::CredentialError,
    error::{AppError, AppResult},
    proxy::headers::{build_upstream_headers, AuthScheme},
    proxy::logging::RequestContext,
};

/// Client for the configured upstream
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    /// Create a new upstream client
    pub fn new(client: Client, config: &ProxyConfig) -> Self {
        Self {
            client,
            base_url: config.target.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full upstream URL for an inbound path (and query)
    pub fn url_for(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    /// Forward a request and return the upstream response unread
    pub async fn forward(
        &self,
        ctx: &RequestContext,
        method: Method,
        path_and_query: &str,
        scheme: &AuthScheme,
        body: Bytes,
    ) -> AppResult<reqwest::Response> {
        let url = self.url_for(path_and_query);
        let headers = build_upstream_headers(scheme).map_err(|_| {
            ctx.log_error("auth", "credential is not a valid header value");
            AppError::Credential(CredentialError::InvalidToken)
        })?;

        ctx.log_upstream_request(&url, scheme.name());

        let response = self
            .client
            .request(method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                ctx.log_error("upstream", &e.to_string());
                AppError::UpstreamUnavailable(e.to_string())
            })?;

        ctx.log_upstream_response(response.status().as_u16());
        Ok(response)
    }
}
