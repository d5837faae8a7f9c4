//! Resource server (protected API) registration.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A registered resource server allowed to call the introspection
/// endpoint.
///
/// Resource servers are a credential namespace distinct from OAuth
/// clients; an OAuth client cannot introspect tokens with its own
/// credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceServer {
    /// Unique resource server identifier.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Argon2 hash of the resource server secret.
    pub secret_hash: String,

    /// Whether the resource server is active.
    pub active: bool,

    /// When the resource server was registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
