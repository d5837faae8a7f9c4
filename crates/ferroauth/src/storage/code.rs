//! Authorization code storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::AuthorizationCode;

/// Storage backend for authorization codes.
#[async_trait]
pub trait AuthorizationCodeStorage: Send + Sync {
    /// Stores a newly issued authorization code record.
    async fn store(&self, code: &AuthorizationCode) -> AuthResult<()>;

    /// Atomically consumes the code with the given hash.
    ///
    /// The lookup and removal must be a single atomic operation: of two
    /// concurrent redemptions, exactly one receives the record. Returns
    /// `invalid_grant` when no unconsumed record matches. The returned
    /// record may already be expired; callers decide what that means.
    async fn consume(&self, code_hash: &str) -> AuthResult<AuthorizationCode>;

    /// Removes expired codes. Returns the number removed.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
