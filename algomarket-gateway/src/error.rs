//! Error types for the gateway crate.

use algomarket_core::{AlgorithmId, CoreError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors that can occur during gateway request handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// No bearer token, or one that matches no session.
    #[error("authentication required")]
    Unauthorized,

    /// The caller is signed in but may not moderate.
    #[error("moderation rights required")]
    Forbidden,

    /// The algorithm ID does not exist in the store.
    #[error("algorithm not found: {0}")]
    AlgorithmNotFound(AlgorithmId),

    /// The algorithm already received a verdict.
    #[error("{0}")]
    AlreadyModerated(CoreError),

    /// The request body is malformed or contains invalid values.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<CoreError> for GatewayError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AlreadyModerated { .. } => Self::AlreadyModerated(err),
            other => Self::InvalidRequest(other.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden => StatusCode::FORBIDDEN,
            GatewayError::AlgorithmNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::AlreadyModerated(_) => StatusCode::CONFLICT,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}
