//! The credential vault: `register`, `unlock`, and `relay`.
//!
//! # Flow
//!
//! - **register** derives the token from the password, seals both fields under
//!   the raw token bytes, proves the credentials by mailing the token from the
//!   mailbox to itself, and only then writes the record at the hex token.
//! - **unlock** decodes the presented token, fetches its record, and decrypts
//!   with the presented token. Nothing else is checked: finding the record is
//!   the whole authorization step.
//! - **relay** unlocks and sends a caller-supplied message as the mailbox.
//!
//! # Invariants
//!
//! - A record is written only after the notification succeeded.
//! - Neither the password, the token, nor the email is logged.
//! - Every outbound send is bounded by the configured timeout.

pub mod error;

pub use error::VaultError;

use std::{sync::Arc, time::Duration};

use lettre::message::Mailbox;
use tracing::{info, warn};

use crate::crypto::{self, Token};
use crate::mail::{welcome::welcome_mail, MailTransport, OutboundMail, TransportError};
use crate::store::{CredentialStore, EncryptedRecord};
use error::TOKEN_FIELD;

/// Mailbox login submitted at registration, or recovered by [`Vault::unlock`].
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub email: String,
    pub password: String,
}

impl Credential {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A caller-specified message to send as the unlocked mailbox.
#[derive(Debug, Clone)]
pub struct RelayMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Orchestrates token derivation, the cipher envelope, the store, and mail.
///
/// Cheap to clone; all collaborators are behind `Arc`.
#[derive(Clone)]
pub struct Vault {
    store: Arc<dyn CredentialStore>,
    mailer: Arc<dyn MailTransport>,
    send_timeout: Duration,
    guide_url: Arc<str>,
}

impl Vault {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        mailer: Arc<dyn MailTransport>,
        send_timeout: Duration,
        guide_url: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            store,
            mailer,
            send_timeout,
            guide_url: guide_url.into(),
        }
    }

    /// The injected store, for health checks.
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Register `credential` and return its hex token.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Validation`] if either field is empty.
    /// - [`VaultError::Notification`] if the welcome message cannot be sent;
    ///   nothing is stored in that case.
    /// - [`VaultError::Cipher`] or [`VaultError::Store`] on sealing or
    ///   persistence failure.
    pub async fn register(&self, credential: &Credential) -> Result<String, VaultError> {
        ensure_non_empty(&credential.email, "email")?;
        ensure_non_empty(&credential.password, "password")?;

        let token = Token::derive(credential.password.as_bytes());
        let record = EncryptedRecord::from_envelopes(
            &crypto::encrypt(credential.password.as_bytes(), token.as_bytes())?,
            &crypto::encrypt(credential.email.as_bytes(), token.as_bytes())?,
        );
        let token_hex = token.to_hex();

        let notification = welcome_mail(
            &credential.email,
            &credential.password,
            &token_hex,
            &self.guide_url,
        );
        if let Err(e) = self.send_bounded(&notification).await {
            warn!(error = %e, "registration notification failed; nothing stored");
            return Err(VaultError::Notification(e));
        }

        self.store.put(&token_hex, &record).await?;
        info!("credential registered");
        Ok(token_hex)
    }

    /// Recover the credential stored under the presented `token`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Decode`] if `token` is not hex (checked before any
    ///   store access) or a stored field is not hex.
    /// - [`VaultError::Store`] with [`crate::store::StoreError::NotFound`] if
    ///   nothing is stored under `token`.
    /// - [`VaultError::Cipher`] if the decoded token is not a valid key length.
    pub async fn unlock(&self, token: &str) -> Result<Credential, VaultError> {
        let key = hex::decode(token).map_err(VaultError::decode(TOKEN_FIELD))?;
        let record = self.store.get(token).await?;

        let password_envelope = hex::decode(&record.encrypted_password)
            .map_err(VaultError::decode("stored password"))?;
        let email_envelope =
            hex::decode(&record.encrypted_email).map_err(VaultError::decode("stored email"))?;

        let password = crypto::decrypt(&password_envelope, &key)?;
        let email = crypto::decrypt(&email_envelope, &key)?;

        Ok(Credential {
            email: String::from_utf8_lossy(&email).into_owned(),
            password: String::from_utf8_lossy(&password).into_owned(),
        })
    }

    /// Unlock `token` and send `message` as the recovered mailbox.
    ///
    /// # Errors
    ///
    /// Any [`Vault::unlock`] error, [`VaultError::Validation`] for an empty or
    /// unparseable recipient (checked before the store is read), or [`VaultError::Transport`] if the send fails.
    pub async fn relay(&self, token: &str, message: RelayMessage) -> Result<(), VaultError> {
        ensure_non_empty(&message.to, "to")?;
        if message.to.parse::<Mailbox>().is_err() {
            return Err(VaultError::Validation(
                "to is not a valid mailbox address".into(),
            ));
        }

        let credential = self.unlock(token).await?;
        let mail = OutboundMail {
            from: credential.email,
            from_password: credential.password,
            to: message.to,
            subject: message.subject,
            html_body: message.html_body,
        };

        self.send_bounded(&mail)
            .await
            .map_err(VaultError::Transport)?;
        info!("message relayed");
        Ok(())
    }

    async fn send_bounded(&self, mail: &OutboundMail) -> Result<(), TransportError> {
        match tokio::time::timeout(self.send_timeout, self.mailer.send(mail)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(self.send_timeout.as_secs())),
        }
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<(), VaultError> {
    if value.is_empty() {
        return Err(VaultError::Validation(format!(
            "{name} is required and must not be empty"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::crypto::CipherError;
    use crate::mail::MockMailTransport;
    use crate::store::{MemoryStore, MockCredentialStore, StoreError};

    const GUIDE: &str = "https://guide.example";

    fn accepting_mailer() -> MockMailTransport {
        let mut mailer = MockMailTransport::new();
        mailer.expect_send().returning(|_| Ok(()));
        mailer
    }

    fn vault_with(store: MemoryStore, mailer: MockMailTransport) -> Vault {
        Vault::new(
            Arc::new(store),
            Arc::new(mailer),
            Duration::from_secs(5),
            GUIDE,
        )
    }

    #[tokio::test]
    async fn unlock_after_register_returns_submitted_credential() {
        let vault = vault_with(MemoryStore::new(), accepting_mailer());
        let token = vault
            .register(&Credential::new("a@x.com", "secret"))
            .await
            .unwrap();

        let unlocked = vault.unlock(&token).await.unwrap();
        assert_eq!(unlocked, Credential::new("a@x.com", "secret"));
    }

    #[tokio::test]
    async fn register_returns_password_digest() {
        let vault = vault_with(MemoryStore::new(), accepting_mailer());
        let token = vault
            .register(&Credential::new("a@x.com", "secret"))
            .await
            .unwrap();
        assert_eq!(token, Token::derive(b"secret").to_hex());
    }

    #[tokio::test]
    async fn stored_record_is_ciphertext_under_token() {
        let store = MemoryStore::new();
        let vault = vault_with(store.clone(), accepting_mailer());
        let token = vault
            .register(&Credential::new("a@x.com", "secret"))
            .await
            .unwrap();

        let record = store.get(&token).await.unwrap();
        let key = Token::derive(b"secret");
        let expected_pw = hex::encode(crypto::encrypt(b"secret", key.as_bytes()).unwrap());
        let expected_email = hex::encode(crypto::encrypt(b"a@x.com", key.as_bytes()).unwrap());
        assert_eq!(record.encrypted_password, expected_pw);
        assert_eq!(record.encrypted_email, expected_email);
        assert!(!record.encrypted_email.contains(&hex::encode("a@x.com")));
    }

    #[tokio::test]
    async fn welcome_mail_goes_to_registered_mailbox_with_token() {
        let token = Token::derive(b"secret").to_hex();
        let mut mailer = MockMailTransport::new();
        let expected = token.clone();
        mailer
            .expect_send()
            .withf(move |m| {
                m.from == "a@x.com"
                    && m.to == "a@x.com"
                    && m.from_password == "secret"
                    && m.html_body.contains(&expected)
            })
            .times(1)
            .returning(|_| Ok(()));

        let vault = vault_with(MemoryStore::new(), mailer);
        vault
            .register(&Credential::new("a@x.com", "secret"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failed_notification_stores_nothing() {
        let store = MemoryStore::new();
        let mut mailer = MockMailTransport::new();
        mailer
            .expect_send()
            .times(1)
            .returning(|_| Err(TransportError::Timeout(1)));
        let vault = vault_with(store.clone(), mailer);

        let err = vault
            .register(&Credential::new("a@x.com", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::Notification(_)));
        assert_eq!(store.len().await, 0);
    }

    struct StalledMailer;

    #[async_trait]
    impl MailTransport for StalledMailer {
        async fn send(&self, _mail: &OutboundMail) -> Result<(), TransportError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn stalled_notification_times_out_and_stores_nothing() {
        let store = MemoryStore::new();
        let vault = Vault::new(
            Arc::new(store.clone()),
            Arc::new(StalledMailer),
            Duration::from_millis(50),
            GUIDE,
        );

        let err = vault
            .register(&Credential::new("a@x.com", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VaultError::Notification(TransportError::Timeout(_))
        ));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn same_password_registration_overwrites_previous_email() {
        let store = MemoryStore::new();
        let vault = vault_with(store.clone(), accepting_mailer());
        let first = vault
            .register(&Credential::new("first@x.com", "shared"))
            .await
            .unwrap();
        let second = vault
            .register(&Credential::new("second@x.com", "shared"))
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(store.len().await, 1);

        let unlocked = vault.unlock(&second).await.unwrap();
        assert_eq!(unlocked.email, "second@x.com");
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_without_sending() {
        let mut mailer = MockMailTransport::new();
        mailer.expect_send().never();
        let vault = vault_with(MemoryStore::new(), mailer);

        for (email, password) in [("", "secret"), ("a@x.com", "")] {
            let err = vault
                .register(&Credential::new(email, password))
                .await
                .unwrap_err();
            assert!(matches!(err, VaultError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn whitespace_password_is_accepted() {
        let vault = vault_with(MemoryStore::new(), accepting_mailer());
        let token = vault
            .register(&Credential::new("a@x.com", "   "))
            .await
            .unwrap();
        assert_eq!(token, Token::derive(b"   ").to_hex());
        assert_eq!(vault.unlock(&token).await.unwrap().password, "   ");
    }

    #[tokio::test]
    async fn relay_rejects_unparseable_recipient_before_store_access() {
        let mut store = MockCredentialStore::new();
        store.expect_get().never();
        let vault = Vault::new(
            Arc::new(store),
            Arc::new(MockMailTransport::new()),
            Duration::from_secs(5),
            GUIDE,
        );

        let err = vault
            .relay(
                &Token::derive(b"secret").to_hex(),
                RelayMessage {
                    to: "not an address".into(),
                    subject: "s".into(),
                    html_body: "b".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
    }

    #[tokio::test]
    async fn unlock_unknown_token_is_not_found() {
        let vault = vault_with(MemoryStore::new(), MockMailTransport::new());
        let err = vault.unlock(&"0".repeat(64)).await.unwrap_err();
        assert!(matches!(err, VaultError::Store(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn unlock_non_hex_token_fails_before_store_access() {
        let mut store = MockCredentialStore::new();
        store.expect_get().never();
        let vault = Vault::new(
            Arc::new(store),
            Arc::new(MockMailTransport::new()),
            Duration::from_secs(5),
            GUIDE,
        );

        let err = vault.unlock("not-hex").await.unwrap_err();
        assert!(matches!(err, VaultError::Decode { field: TOKEN_FIELD, .. }));
    }

    #[tokio::test]
    async fn unlock_short_token_with_record_is_cipher_error() {
        let store = MemoryStore::new();
        let record = EncryptedRecord::from_envelopes(&[0u8; 32], &[0u8; 32]);
        store.put("abcd", &record).await.unwrap();
        let vault = vault_with(store, MockMailTransport::new());

        let err = vault.unlock("abcd").await.unwrap_err();
        assert!(matches!(
            err,
            VaultError::Cipher(CipherError::InvalidKeyLength(2))
        ));
    }

    #[tokio::test]
    async fn unlock_corrupt_record_is_decode_error() {
        let store = MemoryStore::new();
        let token = Token::derive(b"secret").to_hex();
        let record = EncryptedRecord {
            encrypted_password: "not hex at all".into(),
            encrypted_email: "00".into(),
        };
        store.put(&token, &record).await.unwrap();
        let vault = vault_with(store, MockMailTransport::new());

        let err = vault.unlock(&token).await.unwrap_err();
        assert!(matches!(err, VaultError::Decode { field: "stored password", .. }));
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_store_error() {
        let mut store = MockCredentialStore::new();
        store
            .expect_put()
            .returning(|_, _| Err(StoreError::Io("connection reset".into())));
        let vault = Vault::new(
            Arc::new(store),
            Arc::new(accepting_mailer()),
            Duration::from_secs(5),
            GUIDE,
        );

        let err = vault
            .register(&Credential::new("a@x.com", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::Store(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn relay_sends_as_unlocked_mailbox() {
        let mut mailer = MockMailTransport::new();
        mailer
            .expect_send()
            .withf(|m| m.to == "a@x.com")
            .times(1)
            .returning(|_| Ok(()));
        mailer
            .expect_send()
            .withf(|m| {
                m.from == "a@x.com"
                    && m.from_password == "secret"
                    && m.to == "bob@y.com"
                    && m.subject == "Hi"
                    && m.html_body == "<b>hello</b>"
            })
            .times(1)
            .returning(|_| Ok(()));
        let vault = vault_with(MemoryStore::new(), mailer);

        let token = vault
            .register(&Credential::new("a@x.com", "secret"))
            .await
            .unwrap();
        vault
            .relay(
                &token,
                RelayMessage {
                    to: "bob@y.com".into(),
                    subject: "Hi".into(),
                    html_body: "<b>hello</b>".into(),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn relay_send_failure_is_transport_error() {
        let mut mailer = MockMailTransport::new();
        mailer
            .expect_send()
            .withf(|m| m.to == "a@x.com")
            .returning(|_| Ok(()));
        mailer
            .expect_send()
            .withf(|m| m.to == "bob@y.com")
            .returning(|_| Err(TransportError::Timeout(5)));
        let vault = vault_with(MemoryStore::new(), mailer);

        let token = vault
            .register(&Credential::new("a@x.com", "secret"))
            .await
            .unwrap();
        let err = vault
            .relay(
                &token,
                RelayMessage {
                    to: "bob@y.com".into(),
                    subject: "Hi".into(),
                    html_body: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::Transport(_)));
    }

    #[tokio::test]
    async fn relay_requires_recipient() {
        let vault = vault_with(MemoryStore::new(), MockMailTransport::new());
        let err = vault
            .relay(
                &Token::derive(b"x").to_hex(),
                RelayMessage {
                    to: " ".into(),
                    subject: "s".into(),
                    html_body: "b".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
    }

    #[test]
    fn credential_debug_hides_password() {
        let dbg = format!("{:?}", Credential::new("a@x.com", "secret"));
        assert!(!dbg.contains("secret"));
    }
}
