//! User consent records.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A user's recorded consent for a client and set of scopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConsent {
    /// The user who granted consent.
    pub user_id: Uuid,

    /// The client consent was granted to.
    pub client_id: String,

    /// Scopes the user approved.
    pub scopes: Vec<String>,

    /// When consent was granted.
    #[serde(with = "time::serde::rfc3339")]
    pub granted_at: OffsetDateTime,
}

impl UserConsent {
    /// Returns `true` if every scope in `requested` was approved.
    #[must_use]
    pub fn covers(&self, requested: &[&str]) -> bool {
        requested
            .iter()
            .all(|scope| self.scopes.iter().any(|s| s == scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers() {
        let consent = UserConsent {
            user_id: Uuid::new_v4(),
            client_id: "test-client".to_string(),
            scopes: vec!["openid".to_string(), "profile".to_string()],
            granted_at: OffsetDateTime::now_utc(),
        };
        assert!(consent.covers(&["openid"]));
        assert!(consent.covers(&["openid", "profile"]));
        assert!(!consent.covers(&["openid", "email"]));
    }
}
