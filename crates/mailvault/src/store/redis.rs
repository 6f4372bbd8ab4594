//! [`RedisStore`]: credential store backed by a Redis server.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::debug;

use super::{CredentialStore, EncryptedRecord, StoreError};

/// Redis-backed store.
///
/// Holds a [`ConnectionManager`], which multiplexes commands over one
/// connection and reconnects transparently. Cloning is cheap; every clone
/// shares the same connection. The connection closes when the last clone is
/// dropped.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Parse `url` and open the managed connection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the URL is invalid or the server cannot
    /// be reached.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(io_error)?;
        let conn = ConnectionManager::new(client).await.map_err(io_error)?;
        debug!("redis connection established");
        Ok(Self { conn })
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The URL may embed a password.
        f.write_str("RedisStore")
    }
}

#[async_trait]
impl CredentialStore for RedisStore {
    async fn put(&self, token: &str, record: &EncryptedRecord) -> Result<(), StoreError> {
        let payload = record.to_json()?;
        let mut conn = self.conn.clone();
        let _: () = conn.set(token, payload).await.map_err(io_error)?;
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<EncryptedRecord, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(token).await.map_err(io_error)?;
        match raw {
            Some(raw) => EncryptedRecord::from_json(&raw),
            None => Err(StoreError::NotFound),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(io_error)?;
        Ok(())
    }
}

fn io_error(e: redis::RedisError) -> StoreError {
    StoreError::Io(e.to_string())
}
