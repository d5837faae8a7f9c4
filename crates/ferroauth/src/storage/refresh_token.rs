//! Refresh token storage trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::RefreshToken;

/// Storage backend for refresh tokens.
#[async_trait]
pub trait RefreshTokenStorage: Send + Sync {
    /// Stores a newly issued refresh token.
    async fn create(&self, token: &RefreshToken) -> AuthResult<()>;

    /// Finds a token by the hash of its raw value.
    ///
    /// Revoked and expired tokens are still returned so callers can
    /// distinguish a replayed token from an unknown one.
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>>;

    /// Finds a token by its record identifier.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<RefreshToken>>;

    /// Marks the token with the given hash as revoked.
    ///
    /// Returns `true` if the token was active and is now revoked,
    /// `false` if it was already revoked. The check and the update must
    /// be atomic: of two concurrent revocations of the same token,
    /// exactly one sees `true`. Rotation relies on this to detect
    /// racing redemptions.
    async fn revoke(&self, token_hash: &str) -> AuthResult<bool>;

    /// Revokes every token in the rotation chain containing `id`,
    /// walking `previous_token_id` links in both directions. Returns
    /// the affected tokens.
    async fn revoke_chain(&self, id: Uuid) -> AuthResult<Vec<RefreshToken>>;

    /// Removes expired tokens. Returns the number removed.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
