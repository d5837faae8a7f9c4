//! JTI replay-prevention storage trait.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::AuthResult;

/// Tracks used client-assertion JWT IDs to prevent replay (RFC 7523).
#[async_trait]
pub trait JtiStorage: Send + Sync {
    /// Atomically marks a JTI as used.
    ///
    /// Returns `true` if it was fresh, `false` if it had already been
    /// used. Of two concurrent calls with the same JTI, exactly one
    /// sees `true`. `expires_at` bounds how long the entry must be
    /// retained.
    async fn mark_used(&self, jti: &str, expires_at: OffsetDateTime) -> AuthResult<bool>;

    /// Returns `true` if the JTI has been used.
    async fn is_used(&self, jti: &str) -> AuthResult<bool>;

    /// Removes entries past their retention window. Returns the number
    /// removed.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
