//! Error types for the client crate.

use std::fmt;
use std::time::Duration;

use algomarket_core::CoreError;

/// Errors raised while talking to the marketplace API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The server answered with a non-success status code.
    #[error("HTTP {status} from {path}: {body}")]
    Status { status: u16, path: String, body: String },

    /// The request did not complete within the configured timeout.
    #[error("request to {path} timed out after {timeout:?}")]
    Timeout { path: String, timeout: Duration },

    /// Connection, handshake or body transfer failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not the expected JSON.
    #[error("failed to decode response from {path}: {reason}")]
    Decode { path: String, reason: String },

    /// The client configuration cannot be used.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// The HTTP status code, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The workflow step an error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Load,
    Decide,
    Submit,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Load => "load algorithms for moderation",
            Self::Decide => "apply the moderation decision",
            Self::Submit => "submit the algorithm",
        })
    }
}

/// Display-ready error surfaced by the moderation workflow.
///
/// Backend failures are classified by [`ModerationError::classify`]; nothing
/// below the workflow boundary leaks past it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ModerationError {
    /// HTTP 403: the signed-in user lacks moderation rights.
    #[error("you do not have moderation rights")]
    Forbidden,

    /// HTTP 404: the moderation endpoint is missing or misconfigured.
    #[error("moderation endpoint not found; the backend may need configuration")]
    EndpointMissing,

    /// Any other backend or transport failure. Retry manually.
    #[error("failed to {operation}")]
    Failed { operation: Operation },

    /// Refused locally before any request was made.
    #[error("{0}")]
    Validation(#[from] CoreError),
}

impl ModerationError {
    /// Maps an API failure during `operation` to its user-facing class.
    #[must_use]
    pub fn classify(error: &ApiError, operation: Operation) -> Self {
        match error.status() {
            Some(403) => Self::Forbidden,
            Some(404) => Self::EndpointMissing,
            _ => Self::Failed { operation },
        }
    }

    /// Authorization failures are shown as errors, everything else as warnings.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden)
    }
}
