//! [`SmtpMailer`]: [`MailTransport`] over an authenticated STARTTLS relay.

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

use super::{MailTransport, OutboundMail, TransportError};

/// SMTP relay settings. A fresh authenticated transport is built per send
/// because every message logs in with a different mailbox's credentials.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    host: String,
    port: u16,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }
}

/// Assemble the RFC 5322 message for `mail` with an HTML body.
pub(crate) fn build_message(mail: &OutboundMail) -> Result<Message, TransportError> {
    let from: Mailbox = mail.from.parse()?;
    let to: Mailbox = mail.to.parse()?;
    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(mail.html_body.clone())?;
    Ok(message)
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: &OutboundMail) -> Result<(), TransportError> {
        let message = build_message(mail)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)?
            .port(self.port)
            .credentials(Credentials::new(
                mail.from.clone(),
                mail.from_password.clone(),
            ))
            .timeout(Some(self.timeout))
            .build();

        let response = transport.send(message).await?;
        debug!(code = %response.code(), "smtp relay accepted message");
        Ok(())
    }
}
