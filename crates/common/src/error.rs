//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::Unauthorized`] → 401
/// - [`ServiceError::BadGateway`] → 502
/// - [`ServiceError::Unavailable`] → 503
/// - [`ServiceError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed: missing field, invalid JSON, or a token that is not hex.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The caller could not be identified, or its mail credentials were rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The upstream mail server refused or failed to deliver a relayed message.
    #[error("bad gateway: {0}")]
    BadGateway(String),

    /// The credential store is unreachable or returned an unreadable value.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::Unauthorized(_) => 401,
            ServiceError::BadGateway(_) => 502,
            ServiceError::Unavailable(_) => 503,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code placed in [`crate::protocol::ErrorResponse::code`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::Unauthorized(_) => "unauthorized",
            ServiceError::BadGateway(_) => "bad_gateway",
            ServiceError::Unavailable(_) => "service_unavailable",
            ServiceError::Internal(_) => "internal_error",
        }
    }

    /// The caller-safe message, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            ServiceError::BadRequest(m)
            | ServiceError::Unauthorized(m)
            | ServiceError::BadGateway(m)
            | ServiceError::Unavailable(m)
            | ServiceError::Internal(m) => m,
        }
    }
}
