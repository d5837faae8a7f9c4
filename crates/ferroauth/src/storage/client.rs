//! Client storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

/// Storage backend for OAuth client registrations.
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Finds a client by its client_id. Returns `None` if not registered.
    async fn find_by_id(&self, client_id: &str) -> AuthResult<Option<Client>>;

    /// Registers or updates a client.
    async fn save(&self, client: &Client) -> AuthResult<()>;

    /// Verifies a client secret against the stored hash.
    ///
    /// Returns `false` both for a wrong secret and for an unknown client
    /// so callers cannot distinguish the two by result.
    async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool>;

    /// Deletes a client registration.
    async fn delete(&self, client_id: &str) -> AuthResult<()>;
}
