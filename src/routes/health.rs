//! Health check endpoint
//!
//! Reports the configured target and whether a credential can currently be
//! resolved. Never calls upstream and always answers 200.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{config::AuthKind, credentials, AppState};

/// Health check response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub target: String,
    pub auth_type: AuthKind,
    pub cf_access: bool,
    pub has_token: bool,
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let has_token = credentials::resolve(&state.config)
        .await
        .map(|credential| !credential.is_empty())
        .unwrap_or(false);

    Json(HealthResponse {
        status: "ok".to_string(),
        target: state.config.target.clone(),
        auth_type: state.config.auth_type,
        cf_access: state.config.cf_access,
        has_token,
    })
}
