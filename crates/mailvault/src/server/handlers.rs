//! Axum request handlers for all service endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::{
    protocol::{
        ErrorResponse, HealthResponse, RegisterRequest, RegisterResponse, SendEmailRequest,
        SendEmailResponse,
    },
    ServiceError,
};
use tracing::warn;

use super::state::AppState;
use crate::vault::{Credential, RelayMessage, VaultError};

/// `POST /credential/register`: exchange an email/password pair for a token.
///
/// Responds `201` with the token once the welcome message has been delivered
/// and the encrypted record stored.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => return json_rejection(rejection),
    };

    let credential = Credential::new(req.email, req.password);
    match state.vault.register(&credential).await {
        Ok(token) => {
            let body = RegisterResponse {
                token,
                message: "Keep this token safe: it is required for every request and cannot be recovered".into(),
            };
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(e) => vault_error(e),
    }
}

/// `POST /send-email`: relay a message as the mailbox behind the bearer token.
pub async fn send_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> Response {
    let token = match bearer_token(&headers) {
        Ok(t) => t,
        Err(e) => return error_response(e),
    };

    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => return json_rejection(rejection),
    };

    let message = RelayMessage {
        to: req.to,
        subject: req.subject,
        html_body: req.html_body,
    };
    match state.vault.relay(token, message).await {
        Ok(()) => {
            let body = SendEmailResponse {
                message: "Email sent successfully".into(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => vault_error(e),
    }
}

/// `GET /health`: liveness and readiness check.
///
/// Returns `200 OK` when the credential store answers a ping.
/// Returns `503 Service Unavailable` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let store_reachable = match state.vault.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "store ping failed");
            false
        }
    };

    let (status_code, status_str) = if store_reachable {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        store_reachable,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Extract `<token>` from `Authorization: Bearer <token>`.
///
/// The header must be exactly two whitespace-separated fields, the first
/// being `Bearer`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ServiceError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ServiceError::Unauthorized("missing Authorization header".into()))?;
    let invalid = || ServiceError::Unauthorized("invalid Authorization header format".into());

    let value = value.to_str().map_err(|_| invalid())?;
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(invalid()),
    }
}

fn json_rejection(rejection: JsonRejection) -> Response {
    error_response(ServiceError::BadRequest(format!(
        "invalid request body: {}",
        rejection.body_text()
    )))
}

fn vault_error(err: VaultError) -> Response {
    let service_err = ServiceError::from(&err);
    if service_err.http_status() >= 500 {
        warn!(error = %err, "request failed");
    }
    error_response(service_err)
}

fn error_response(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(&err))).into_response()
}
