//! Revoked token (JTI blacklist) storage trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;

/// The kind of token a blacklist entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevokedTokenType {
    /// A JWT access token, identified by its `jti` claim.
    Access,
    /// A refresh token, identified by its record id.
    Refresh,
}

/// Denylist of revoked token identifiers.
///
/// A signed JWT stays structurally valid until it expires; the blacklist
/// is what makes revocation effective before then. Entries only need to
/// live until the underlying token would have expired anyway.
#[async_trait]
pub trait RevokedTokenStorage: Send + Sync {
    /// Records a token identifier as revoked.
    ///
    /// `expires_at` is the token's natural expiry; the entry may be
    /// dropped after that point.
    async fn revoke(
        &self,
        token_id: &str,
        token_type: RevokedTokenType,
        expires_at: OffsetDateTime,
    ) -> AuthResult<()>;

    /// Returns `true` if the identifier is on the blacklist.
    async fn is_revoked(&self, token_id: &str) -> AuthResult<bool>;

    /// Removes entries whose tokens have expired. Returns the number
    /// removed.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
