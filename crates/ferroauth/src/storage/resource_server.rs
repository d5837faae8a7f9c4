//! Resource server storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::ResourceServer;

/// Storage backend for resource server registrations.
#[async_trait]
pub trait ResourceServerStorage: Send + Sync {
    /// Finds a resource server by its identifier.
    async fn find_by_id(&self, id: &str) -> AuthResult<Option<ResourceServer>>;

    /// Registers or updates a resource server.
    async fn save(&self, server: &ResourceServer) -> AuthResult<()>;

    /// Verifies a resource server secret against the stored hash.
    ///
    /// Returns `false` for both a wrong secret and an unknown id.
    async fn verify_secret(&self, id: &str, secret: &str) -> AuthResult<bool>;
}
