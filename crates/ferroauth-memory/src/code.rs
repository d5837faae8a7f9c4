//! In-memory authorization code storage.

use std::collections::HashMap;

use async_trait::async_trait;
use ferroauth::storage::AuthorizationCodeStorage;
use ferroauth::types::AuthorizationCode;
use ferroauth::{AuthError, AuthResult};
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// Authorization codes keyed by code hash.
#[derive(Default)]
pub struct InMemoryAuthorizationCodeStorage {
    codes: RwLock<HashMap<String, AuthorizationCode>>,
}

impl InMemoryAuthorizationCodeStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorizationCodeStorage for InMemoryAuthorizationCodeStorage {
    async fn store(&self, code: &AuthorizationCode) -> AuthResult<()> {
        self.codes
            .write()
            .await
            .insert(code.code_hash.clone(), code.clone());
        Ok(())
    }

    async fn consume(&self, code_hash: &str) -> AuthResult<AuthorizationCode> {
        // remove under the write lock: exactly one redeemer wins
        self.codes
            .write()
            .await
            .remove(code_hash)
            .ok_or_else(|| AuthError::invalid_grant("Invalid authorization code"))
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut codes = self.codes.write().await;
        let now = OffsetDateTime::now_utc();
        let before = codes.len();
        codes.retain(|_, code| code.expires_at > now);
        Ok((before - codes.len()) as u64)
    }
}
