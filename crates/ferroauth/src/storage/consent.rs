//! User consent storage trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::UserConsent;

/// Storage backend for user consent records.
#[async_trait]
pub trait ConsentStorage: Send + Sync {
    /// Saves a consent record, replacing any prior record for the same
    /// user and client.
    async fn save(&self, consent: &UserConsent) -> AuthResult<()>;

    /// Finds the consent record for a user and client.
    async fn find(&self, user_id: Uuid, client_id: &str) -> AuthResult<Option<UserConsent>>;

    /// Removes the consent record for a user and client.
    async fn revoke(&self, user_id: Uuid, client_id: &str) -> AuthResult<()>;

    /// Lists all consent records for a user.
    async fn list_for_user(&self, user_id: Uuid) -> AuthResult<Vec<UserConsent>>;
}
