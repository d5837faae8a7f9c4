//! In-memory revoked token blacklist.

use std::collections::HashMap;

use async_trait::async_trait;
use ferroauth::storage::{RevokedTokenStorage, RevokedTokenType};
use ferroauth::AuthResult;
use time::OffsetDateTime;
use tokio::sync::RwLock;

struct Entry {
    #[allow(dead_code)]
    token_type: RevokedTokenType,
    expires_at: OffsetDateTime,
}

/// Blacklist entries keyed by token identifier.
#[derive(Default)]
pub struct InMemoryRevokedTokenStorage {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryRevokedTokenStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevokedTokenStorage for InMemoryRevokedTokenStorage {
    async fn revoke(
        &self,
        token_id: &str,
        token_type: RevokedTokenType,
        expires_at: OffsetDateTime,
    ) -> AuthResult<()> {
        self.entries.write().await.insert(
            token_id.to_string(),
            Entry {
                token_type,
                expires_at,
            },
        );
        Ok(())
    }

    async fn is_revoked(&self, token_id: &str) -> AuthResult<bool> {
        Ok(self.entries.read().await.contains_key(token_id))
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut entries = self.entries.write().await;
        let now = OffsetDateTime::now_utc();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}
