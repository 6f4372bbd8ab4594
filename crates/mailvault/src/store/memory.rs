//! [`MemoryStore`]: in-process credential store.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CredentialStore, EncryptedRecord, StoreError};

/// Thread-safe in-process store with the same semantics as [`super::RedisStore`].
///
/// Wraps an `Arc<RwLock<HashMap<_, _>>>` so clones share one map. Each `put`
/// takes the write lock once and replaces the whole entry, so concurrent
/// writers to one key resolve as last-write-wins.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, EncryptedRecord>>>,
}

impl MemoryStore {
    /// Create a new, empty [`MemoryStore`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn put(&self, token: &str, record: &EncryptedRecord) -> Result<(), StoreError> {
        let mut lock = self.inner.write().await;
        lock.insert(token.to_owned(), record.clone());
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<EncryptedRecord, StoreError> {
        let lock = self.inner.read().await;
        lock.get(token).cloned().ok_or(StoreError::NotFound)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
