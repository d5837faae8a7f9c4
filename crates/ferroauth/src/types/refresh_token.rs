//! Refresh token record with rotation lineage.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A stored refresh token.
///
/// Only the SHA-256 hash of the raw value is persisted. Rotation links
/// each replacement token to its predecessor through
/// `previous_token_id`, forming a chain that can be revoked wholesale
/// when a consumed token is replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshToken {
    /// Unique record identifier.
    pub id: Uuid,

    /// SHA-256 hash of the raw token value.
    pub token_hash: String,

    /// The user the token was issued on behalf of.
    pub user_id: Uuid,

    /// The client the token was issued to.
    pub client_id: String,

    /// Space-delimited granted scopes.
    pub scope: String,

    /// When the token was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the token expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// When the token was revoked, if it has been.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub revoked_at: Option<OffsetDateTime>,

    /// The token this one replaced during rotation, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_token_id: Option<Uuid>,
}

impl RefreshToken {
    /// Returns `true` if the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() >= self.expires_at
    }

    /// Returns `true` if the token has been revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Returns `true` if the token is neither expired nor revoked.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_revoked()
    }
}
