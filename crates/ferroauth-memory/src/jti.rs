//! In-memory assertion JTI tracking.

use std::collections::HashMap;

use async_trait::async_trait;
use ferroauth::storage::JtiStorage;
use ferroauth::AuthResult;
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// Used assertion JTIs with their retention deadline.
#[derive(Default)]
pub struct InMemoryJtiStorage {
    used: RwLock<HashMap<String, OffsetDateTime>>,
}

impl InMemoryJtiStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JtiStorage for InMemoryJtiStorage {
    async fn mark_used(&self, jti: &str, expires_at: OffsetDateTime) -> AuthResult<bool> {
        // insert-if-absent under the write lock: one caller sees true
        let mut used = self.used.write().await;
        if used.contains_key(jti) {
            return Ok(false);
        }
        used.insert(jti.to_string(), expires_at);
        Ok(true)
    }

    async fn is_used(&self, jti: &str) -> AuthResult<bool> {
        Ok(self.used.read().await.contains_key(jti))
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut used = self.used.write().await;
        let now = OffsetDateTime::now_utc();
        let before = used.len();
        used.retain(|_, expires_at| *expires_at > now);
        Ok((before - used.len()) as u64)
    }
}
