use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::token::errors::RevocationStoreError;
use crate::domain::token::ports::RevocationStore;

/// Process-local revocation store.
///
/// Maps `jti` to the instant its revocation stops mattering. Entries do not survive a
/// restart; use the Postgres store when several instances share revocations.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRevocationStore {
    entries: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn blacklist(
        &self,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RevocationStoreError> {
        self.entries
            .write()
            .await
            .entry(jti.to_string())
            .or_insert(expires_at);
        Ok(())
    }

    async fn is_blacklisted(&self, jti: &str) -> Result<bool, RevocationStoreError> {
        Ok(self.entries.read().await.contains_key(jti))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RevocationStoreError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}
