//! Outbound mail capability.
//!
//! The vault only needs one operation: send an HTML message *as* a mailbox,
//! authenticating to the relay with that mailbox's own password. A successful
//! send is also how registration proves the submitted credentials work.

pub mod smtp;
pub mod welcome;

pub use smtp::SmtpMailer;

use async_trait::async_trait;
use thiserror::Error;

/// Errors produced by the mail layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A sender or recipient address could not be parsed.
    #[error("invalid mailbox address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),

    /// The message could not be assembled.
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    /// The SMTP relay refused the login or the message, or the connection failed.
    #[error("smtp delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// The send did not finish within the configured budget.
    #[error("send timed out after {0} seconds")]
    Timeout(u64),
}

/// A message to relay, together with the sender's SMTP login.
#[derive(Clone)]
pub struct OutboundMail {
    pub from: String,
    pub from_password: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

impl std::fmt::Debug for OutboundMail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundMail")
            .field("from", &self.from)
            .field("from_password", &"[REDACTED]")
            .field("to", &self.to)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

/// Mail-sending capability consumed by the vault.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver `mail`, logging in as `mail.from` with `mail.from_password`.
    async fn send(&self, mail: &OutboundMail) -> Result<(), TransportError>;
}
