//! Chat relay error types with HTTP status code mapping.
//!
//! [`ChatError`] is the central error type for both halves of the crate.
//! Server-side variants map to an HTTP status code and structured JSON
//! error response; client-side variants are surfaced through the UI or
//! the diagnostic log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "username must not be empty",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Central error enum for the relay and the embedded client.
///
/// # Error Code Ranges
///
/// | Range     | Category         | HTTP Status               |
/// |-----------|------------------|---------------------------|
/// | 1000–1999 | Validation       | 400 Bad Request           |
/// | 3000–3999 | Transport/Server | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Username was empty (or whitespace only) after trimming.
    #[error("username must not be empty")]
    EmptyUsername,

    /// The configured server URL could not be parsed.
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A wire frame could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// WebSocket transport failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::EmptyUsername => 1001,
            Self::InvalidUrl(_) => 1002,
            Self::Serialization(_) => 1003,
            Self::Transport(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::EmptyUsername | Self::InvalidUrl(_) | Self::Serialization(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Transport(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
