//! Vault error taxonomy and its mapping onto [`common::ServiceError`].

use common::ServiceError;
use thiserror::Error;

use crate::crypto::CipherError;
use crate::mail::TransportError;
use crate::store::StoreError;

/// Errors produced by vault operations. Every variant aborts the request.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Caller input is missing or empty.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The registration notification could not be delivered. Since the relay
    /// login uses the submitted password, this is how bad credentials surface.
    #[error("registration notification failed: {0}")]
    Notification(#[source] TransportError),

    /// A relayed message could not be delivered.
    #[error("relay failed: {0}")]
    Transport(#[source] TransportError),

    /// Key length mismatch or a structurally invalid envelope.
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// A hex string (the presented token or a stored field) did not decode.
    #[error("{field} is not valid hex: {source}")]
    Decode {
        field: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Name used in [`VaultError::Decode`] when the presented token is malformed.
pub const TOKEN_FIELD: &str = "token";

impl VaultError {
    pub(crate) fn decode(field: &'static str) -> impl FnOnce(hex::FromHexError) -> Self {
        move |source| VaultError::Decode { field, source }
    }
}

impl From<&VaultError> for ServiceError {
    fn from(err: &VaultError) -> Self {
        match err {
            VaultError::Validation(m) => ServiceError::BadRequest(m.clone()),
            VaultError::Decode { field, .. } if *field == TOKEN_FIELD => {
                ServiceError::BadRequest("invalid token".into())
            }
            VaultError::Decode { .. } => {
                ServiceError::Internal("stored credential is corrupt".into())
            }
            VaultError::Notification(_) => ServiceError::Unauthorized("invalid credentials".into()),
            VaultError::Store(StoreError::NotFound) => {
                ServiceError::Unauthorized("unknown token".into())
            }
            VaultError::Store(_) => {
                ServiceError::Unavailable("credential store unavailable".into())
            }
            VaultError::Transport(e) => ServiceError::BadGateway(format!("failed to send message: {e}")),
            VaultError::Cipher(_) => ServiceError::Internal("credential cipher failure".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: VaultError) -> u16 {
        ServiceError::from(&err).http_status()
    }

    #[test]
    fn status_mapping() {
        assert_eq!(status(VaultError::Validation("x".into())), 400);
        assert_eq!(
            status(VaultError::Notification(TransportError::Timeout(1))),
            401
        );
        assert_eq!(status(VaultError::Store(StoreError::NotFound)), 401);
        assert_eq!(status(VaultError::Store(StoreError::Io("down".into()))), 503);
        assert_eq!(status(VaultError::Transport(TransportError::Timeout(1))), 502);
        assert_eq!(status(VaultError::Cipher(CipherError::InvalidKeyLength(2))), 500);
    }

    #[test]
    fn token_decode_is_client_error_but_record_decode_is_not() {
        let bad = hex::decode("zz").unwrap_err();
        assert_eq!(status(VaultError::decode(TOKEN_FIELD)(bad.clone())), 400);
        assert_eq!(status(VaultError::decode("stored email")(bad)), 500);
    }

    #[test]
    fn notification_message_hides_transport_detail() {
        let err = VaultError::Notification(TransportError::Timeout(30));
        assert_eq!(ServiceError::from(&err).message(), "invalid credentials");
    }
}
