//! Access token record storage trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::AccessTokenRecord;

/// Storage backend for access token issuance records.
#[async_trait]
pub trait AccessTokenStorage: Send + Sync {
    /// Stores a record for a newly issued access token.
    async fn store(&self, record: &AccessTokenRecord) -> AuthResult<()>;

    /// Finds a record by JWT ID.
    async fn find_by_jti(&self, jti: &str) -> AuthResult<Option<AccessTokenRecord>>;

    /// Marks the record with the given JWT ID as revoked.
    ///
    /// No-op if the record does not exist or is already revoked.
    async fn revoke(&self, jti: &str) -> AuthResult<()>;

    /// Revokes all active records issued to a client on behalf of a
    /// user (or all client_credentials records when `user_id` is
    /// `None`). Returns the affected records so callers can blacklist
    /// their JWT IDs.
    async fn revoke_by_grant(
        &self,
        client_id: &str,
        user_id: Option<Uuid>,
    ) -> AuthResult<Vec<AccessTokenRecord>>;

    /// Removes expired records. Returns the number removed.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
