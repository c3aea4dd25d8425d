//! Error types for the offline cache manager
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the offline cache manager.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Outbound fetch failed (timeout, DNS, connection refused)
    #[error("Network error: {0}")]
    Network(String),

    /// Origin answered with a status that cannot be stored
    #[error("Unexpected status {status} for {url}")]
    UnexpectedStatus { url: String, status: u16 },

    /// Network is down and neither the resource nor the offline document is cached
    #[error("Offline and no cached fallback for {0}")]
    OfflineUnavailable(String),

    /// Store write would exceed its byte quota
    #[error("Quota exceeded in store '{store}': {needed} bytes needed, {available} available")]
    QuotaExceeded {
        store: String,
        needed: usize,
        available: usize,
    },

    /// Entry could not be encoded for storage
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored payload could not be decoded
    #[error("Corrupt entry: {0}")]
    Corrupt(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rejected configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::Network(_) | CacheError::UnexpectedStatus { .. } => {
                StatusCode::BAD_GATEWAY
            }
            CacheError::OfflineUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::QuotaExceeded { .. }
            | CacheError::Serialization(_)
            | CacheError::Corrupt(_)
            | CacheError::InvalidConfig(_)
            | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the offline cache manager.
pub type Result<T> = std::result::Result<T, CacheError>;
