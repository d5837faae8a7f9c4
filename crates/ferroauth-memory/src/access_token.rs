//! In-memory access token record storage.

use std::collections::HashMap;

use async_trait::async_trait;
use ferroauth::storage::AccessTokenStorage;
use ferroauth::types::AccessTokenRecord;
use ferroauth::AuthResult;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Access token records keyed by JWT ID.
#[derive(Default)]
pub struct InMemoryAccessTokenStorage {
    records: RwLock<HashMap<String, AccessTokenRecord>>,
}

impl InMemoryAccessTokenStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessTokenStorage for InMemoryAccessTokenStorage {
    async fn store(&self, record: &AccessTokenRecord) -> AuthResult<()> {
        self.records
            .write()
            .await
            .insert(record.jti.clone(), record.clone());
        Ok(())
    }

    async fn find_by_jti(&self, jti: &str) -> AuthResult<Option<AccessTokenRecord>> {
        Ok(self.records.read().await.get(jti).cloned())
    }

    async fn revoke(&self, jti: &str) -> AuthResult<()> {
        if let Some(record) = self.records.write().await.get_mut(jti)
            && record.revoked_at.is_none()
        {
            record.revoked_at = Some(OffsetDateTime::now_utc());
        }
        Ok(())
    }

    async fn revoke_by_grant(
        &self,
        client_id: &str,
        user_id: Option<Uuid>,
    ) -> AuthResult<Vec<AccessTokenRecord>> {
        let mut records = self.records.write().await;
        let now = OffsetDateTime::now_utc();
        let mut affected = Vec::new();
        for record in records.values_mut() {
            if record.client_id == client_id
                && record.user_id == user_id
                && record.revoked_at.is_none()
            {
                record.revoked_at = Some(now);
                affected.push(record.clone());
            }
        }
        Ok(affected)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut records = self.records.write().await;
        let now = OffsetDateTime::now_utc();
        let before = records.len();
        records.retain(|_, record| record.expires_at > now);
        Ok((before - records.len()) as u64)
    }
}
