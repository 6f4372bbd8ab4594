//! Credential store: token (hex string) → [`EncryptedRecord`].
//!
//! # Semantics
//!
//! - Every interaction is a single atomic `put` or `get`; there is no
//!   read-modify-write and no client-side locking.
//! - Concurrent `put`s to the same key race; the last write wins.
//! - Entries never expire and are never deleted.
//!
//! The production backend is Redis ([`RedisStore`]). [`MemoryStore`] implements
//! the same contract in-process and is selected with a `memory://` URL.

pub mod memory;
pub mod record;
pub mod redis;

pub use memory::MemoryStore;
pub use record::EncryptedRecord;
pub use self::redis::RedisStore;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists under the requested key.
    #[error("no record stored under the requested token")]
    NotFound,

    /// The backing service could not be reached or rejected the command.
    #[error("store I/O failure: {0}")]
    Io(String),

    /// A stored value could not be encoded or decoded as a record.
    #[error("store value is not a valid record: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-value capability consumed by the vault.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Store `record` under `token`, replacing any existing value.
    async fn put(&self, token: &str, record: &EncryptedRecord) -> Result<(), StoreError>;

    /// Fetch the record stored under `token`.
    async fn get(&self, token: &str) -> Result<EncryptedRecord, StoreError>;

    /// Round-trip to the backend without touching any record.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Open the store addressed by `url`.
///
/// `redis://` and `rediss://` URLs connect to Redis; `memory://` returns an
/// empty in-process store.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the URL is not understood or the initial
/// connection fails.
pub async fn connect(url: &str) -> Result<Arc<dyn CredentialStore>, StoreError> {
    if url.starts_with("memory://") {
        return Ok(Arc::new(MemoryStore::new()));
    }
    let store = RedisStore::connect(url).await?;
    Ok(Arc::new(store))
}
