//! Error types for the proxy
//!
//! Request-scoped failures render as Anthropic-style error bodies so the
//! CLI on the other side reports them the same way it reports API errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::credentials::CredentialError;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Failed to get auth token: {0}")]
    Credential(#[from] CredentialError),

    #[error("Upstream request failed: {0}")]
    UpstreamUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub error: ErrorBody,
}

/// Error details
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: &'static str,
    pub message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Credential(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (error_type, message) = match &self {
            AppError::BadRequest(_) => ("invalid_request_error", self.to_string()),
            AppError::Credential(_) => ("authentication_error", self.to_string()),
            AppError::UpstreamUnavailable(_) => ("api_error", self.to_string()),
            AppError::Internal(_) => ("api_error", "Internal server error".to_string()),
        };

        let body = ErrorResponse {
            kind: "error",
            error: ErrorBody {
                error_type,
                message,
            },
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
