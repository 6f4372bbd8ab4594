//! Request and response types exchanged over the public HTTP API.
//!
//! Field names follow the wire format existing clients already send, so a few
//! of them are camelCase (`htmlBody`).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Register endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /credential/register`.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Mailbox address that will later be used as the `From` of relayed mail.
    pub email: String,
    /// SMTP password for `email`. Also the source of the bearer token.
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Successful response body for `POST /credential/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Lowercase hex bearer token. Required for every later relay request.
    pub token: String,
    /// Reminder for the caller to keep the token safe.
    pub message: String,
}

// ---------------------------------------------------------------------------
// Send endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /send-email`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailRequest {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body, sent verbatim.
    #[serde(rename = "htmlBody")]
    pub html_body: String,
}

/// Successful response body for `POST /send-email`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailResponse {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.message())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Whether the credential store answered a ping.
    pub store_reachable: bool,
}
