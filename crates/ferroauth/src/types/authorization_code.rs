//! Authorization code grant record.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A stored authorization code grant.
///
/// The raw code is returned to the client once and never persisted; this
/// record holds only its SHA-256 hash. A code is single-use: redemption
/// atomically consumes the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationCode {
    /// Unique record identifier.
    pub id: Uuid,

    /// SHA-256 hash of the raw code value.
    pub code_hash: String,

    /// The user who approved the authorization.
    pub user_id: Uuid,

    /// The client the code was issued to.
    pub client_id: String,

    /// The redirect URI the code is bound to.
    pub redirect_uri: String,

    /// Space-delimited scopes granted at authorization time.
    pub scope: String,

    /// PKCE code challenge recorded at authorization time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,

    /// PKCE challenge method ("S256", or "plain" on legacy records).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<String>,

    /// OIDC nonce to echo into the ID token, if the client sent one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// When the code was issued.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the code expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl AuthorizationCode {
    /// Returns `true` if the code has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn test_code() -> AuthorizationCode {
        AuthorizationCode {
            id: Uuid::new_v4(),
            code_hash: "a".repeat(64),
            user_id: Uuid::new_v4(),
            client_id: "test-client".to_string(),
            redirect_uri: "https://app.example.com/callback".to_string(),
            scope: "openid profile".to_string(),
            code_challenge: Some("E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM".to_string()),
            code_challenge_method: Some("S256".to_string()),
            nonce: None,
            created_at: OffsetDateTime::now_utc(),
            expires_at: OffsetDateTime::now_utc() + Duration::minutes(10),
        }
    }

    #[test]
    fn test_expiration() {
        let mut code = test_code();
        assert!(!code.is_expired());

        code.expires_at = OffsetDateTime::now_utc() - Duration::seconds(1);
        assert!(code.is_expired());
    }

    #[test]
    fn test_serde_camel_case() {
        let code = test_code();
        let json = serde_json::to_value(&code).unwrap();
        assert!(json.get("codeHash").is_some());
        assert!(json.get("redirectUri").is_some());
        assert!(json.get("codeChallengeMethod").is_some());
    }
}
