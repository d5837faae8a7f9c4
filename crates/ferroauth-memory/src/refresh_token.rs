//! In-memory refresh token storage.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use ferroauth::storage::RefreshTokenStorage;
use ferroauth::types::RefreshToken;
use ferroauth::AuthResult;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Refresh tokens keyed by token hash.
#[derive(Default)]
pub struct InMemoryRefreshTokenStorage {
    tokens: RwLock<HashMap<String, RefreshToken>>,
}

impl InMemoryRefreshTokenStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStorage for InMemoryRefreshTokenStorage {
    async fn create(&self, token: &RefreshToken) -> AuthResult<()> {
        self.tokens
            .write()
            .await
            .insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
        Ok(self.tokens.read().await.get(token_hash).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<RefreshToken>> {
        Ok(self
            .tokens
            .read()
            .await
            .values()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn revoke(&self, token_hash: &str) -> AuthResult<bool> {
        // check-and-set under the write lock: one caller wins
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(token_hash) {
            Some(token) if token.revoked_at.is_none() => {
                token.revoked_at = Some(OffsetDateTime::now_utc());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_chain(&self, id: Uuid) -> AuthResult<Vec<RefreshToken>> {
        let mut tokens = self.tokens.write().await;

        let mut chain: HashSet<Uuid> = HashSet::new();
        chain.insert(id);
        // predecessors
        let mut cursor = id;
        while let Some(prev) = tokens
            .values()
            .find(|t| t.id == cursor)
            .and_then(|t| t.previous_token_id)
        {
            if !chain.insert(prev) {
                break;
            }
            cursor = prev;
        }
        // successors
        let mut cursor = id;
        while let Some(next) = tokens
            .values()
            .find(|t| t.previous_token_id == Some(cursor))
            .map(|t| t.id)
        {
            if !chain.insert(next) {
                break;
            }
            cursor = next;
        }

        let now = OffsetDateTime::now_utc();
        let mut affected = Vec::new();
        for token in tokens.values_mut() {
            if chain.contains(&token.id) {
                if token.revoked_at.is_none() {
                    token.revoked_at = Some(now);
                }
                affected.push(token.clone());
            }
        }
        Ok(affected)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut tokens = self.tokens.write().await;
        let now = OffsetDateTime::now_utc();
        let before = tokens.len();
        tokens.retain(|_, token| token.expires_at > now);
        Ok((before - tokens.len()) as u64)
    }
}
