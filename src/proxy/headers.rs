//! Header utilities for upstream requests
//!
//! Builds the fixed outbound header set, picks the auth scheme, and filters
//! hop-by-hop headers out of relayed responses. Client headers are never
//! forwarded upstream.

use axum::http::header::{self, HeaderName};
use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::config::ProxyConfig;
use crate::credentials::{CredentialKind, ResolvedCredential};

/// API version pinned on every upstream request
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const ANTHROPIC_VERSION_HEADER: &str = "anthropic-version";
pub const API_KEY_HEADER: &str = "x-api-key";
pub const GATEWAY_TOKEN_HEADER: &str = "cf-access-token";
pub const GATEWAY_CLIENT_ID_HEADER: &str = "cf-access-client-id";
pub const GATEWAY_CLIENT_SECRET_HEADER: &str = "cf-access-client-secret";

/// Hop-by-hop headers that must never be relayed
const HOP_BY_HOP_HEADERS: &[HeaderName] = &[
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// How the credential is attached to the upstream request
///
/// Exactly one scheme applies per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    /// Access-gateway token, with service-token headers when both halves are set
    Gateway {
        token: String,
        client: Option<(String, String)>,
    },
    /// `x-api-key`
    ApiKey(String),
    /// `Authorization: Bearer`
    Bearer(String),
}

impl AuthScheme {
    /// Pick the scheme for a resolved credential
    ///
    /// Gateway access wins regardless of credential kind.
    pub fn select(config: &ProxyConfig, credential: ResolvedCredential) -> Self {
        if config.cf_access {
            let client = (!config.cf_client_id.is_empty() && !config.cf_client_secret.is_empty())
                .then(|| (config.cf_client_id.clone(), config.cf_client_secret.clone()));
            return AuthScheme::Gateway {
                token: credential.token,
                client,
            };
        }

        match credential.kind {
            CredentialKind::ApiKey => AuthScheme::ApiKey(credential.token),
            CredentialKind::Bearer => AuthScheme::Bearer(credential.token),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuthScheme::Gateway { .. } => "gateway",
            AuthScheme::ApiKey(_) => "apikey",
            AuthScheme::Bearer(_) => "bearer",
        }
    }

    /// Insert this scheme's headers
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<(), InvalidHeaderValue> {
        match self {
            AuthScheme::Gateway { token, client } => {
                headers.insert(GATEWAY_TOKEN_HEADER, sensitive(token)?);
                if let Some((id, secret)) = client {
                    headers.insert(GATEWAY_CLIENT_ID_HEADER, HeaderValue::from_str(id)?);
                    headers.insert(GATEWAY_CLIENT_SECRET_HEADER, sensitive(secret)?);
                }
            }
            AuthScheme::ApiKey(key) => {
                headers.insert(API_KEY_HEADER, sensitive(key)?);
            }
            AuthScheme::Bearer(token) => {
                headers.insert(AUTHORIZATION, sensitive(&format!("Bearer {}", token))?);
            }
        }
        Ok(())
    }
}

fn sensitive(value: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut value = HeaderValue::from_str(value)?;
    value.set_sensitive(true);
    Ok(value)
}

/// Build the full header set for an upstream request
pub fn build_upstream_headers(scheme: &AuthScheme) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        ANTHROPIC_VERSION_HEADER,
        HeaderValue::from_static(ANTHROPIC_VERSION),
    );
    scheme.apply(&mut headers)?;

    Ok(headers)
}

/// Check if a header is a hop-by-hop header that should not be relayed
pub fn is_hop_by_hop_header(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(name) || name.as_str() == "keep-alive"
}

/// Filter hop-by-hop headers from an upstream response
///
/// Repeated headers (e.g. several `set-cookie`) are all kept.
pub fn filter_response_headers(response_headers: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(response_headers.len());

    for (name, value) in response_headers {
        if !is_hop_by_hop_header(name) {
            filtered.append(name.clone(), value.clone());
        }
    }

    filtered
}
