//! Credential resolution
//!
//! Resolves the token attached to upstream requests. Resolution runs fresh for
//! every request so a re-login that rewrites the token file takes effect
//! without restarting the proxy.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::config::{AuthKind, ProxyConfig};

/// Tag deciding where the token goes when no access gateway is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// Literal API key, sent as `x-api-key`
    ApiKey,
    /// Session token, sent as `Authorization: Bearer`
    Bearer,
}

/// A token and the kind that determines its header placement
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub token: String,
    pub kind: CredentialKind,
}

impl ResolvedCredential {
    pub fn new(token: impl Into<String>, kind: CredentialKind) -> Self {
        Self {
            token: token.into(),
            kind,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }
}

// Keep tokens out of debug logs.
impl std::fmt::Debug for ResolvedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedCredential")
            .field("token", &"<redacted>")
            .field("kind", &self.kind)
            .finish()
    }
}

/// Credential resolution failures
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("API key is empty")]
    EmptyApiKey,

    #[error("failed to read auth file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse auth file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no token found for {0}")]
    MissingEntry(String),

    #[error("token contains characters not allowed in an HTTP header")]
    InvalidToken,
}

/// One entry of the token file; fields other than `token` are ignored
#[derive(Debug, Deserialize)]
struct TokenEntry {
    #[serde(default)]
    token: String,
}

/// Resolve the credential described by `config`
pub async fn resolve(config: &ProxyConfig) -> Result<ResolvedCredential, CredentialError> {
    match config.auth_type {
        AuthKind::ApiKey => {
            if config.api_key.is_empty() {
                return Err(CredentialError::EmptyApiKey);
            }
            Ok(ResolvedCredential::new(
                config.api_key.clone(),
                CredentialKind::ApiKey,
            ))
        }
        AuthKind::TokenFile => {
            let path = config.token_file_path();
            let data = tokio::fs::read(&path)
                .await
                .map_err(|source| CredentialError::Unreadable {
                    path: path.clone(),
                    source,
                })?;
            let token = lookup_token(&data, &config.login_url)
                .map_err(|source| CredentialError::Malformed { path, source })?
                .ok_or_else(|| CredentialError::MissingEntry(config.login_url.clone()))?;
            Ok(ResolvedCredential::new(token, CredentialKind::Bearer))
        }
    }
}

/// Find the token stored under `key` in a token file's contents
fn lookup_token(data: &[u8], key: &str) -> Result<Option<String>, serde_json::Error> {
    let mut entries: HashMap<String, TokenEntry> = serde_json::from_slice(data)?;
    Ok(entries.remove(key).map(|entry| entry.token))
}
