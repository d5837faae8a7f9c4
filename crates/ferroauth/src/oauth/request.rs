//! Token endpoint request and response types.

use serde::{Deserialize, Serialize};

/// A token endpoint request (RFC 6749 Section 4).
///
/// All fields except `grant_type` are optional at parse time; the grant
/// handlers enforce which combinations are required.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    /// The grant type being exercised.
    pub grant_type: String,

    /// Authorization code (authorization_code grant).
    #[serde(default)]
    pub code: Option<String>,

    /// Redirect URI the code was bound to (authorization_code grant).
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// PKCE code verifier (authorization_code grant).
    #[serde(default)]
    pub code_verifier: Option<String>,

    /// Client identifier (body-based authentication or public clients).
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (client_secret_post authentication).
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Client assertion type (private_key_jwt authentication).
    #[serde(default)]
    pub client_assertion_type: Option<String>,

    /// Client assertion JWT (private_key_jwt authentication).
    #[serde(default)]
    pub client_assertion: Option<String>,

    /// Refresh token value (refresh_token grant).
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Requested scope.
    #[serde(default)]
    pub scope: Option<String>,
}

/// A successful token endpoint response (RFC 6749 Section 5.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The issued access token (signed JWT).
    pub access_token: String,

    /// Token type, always `Bearer`.
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,

    /// The granted scope.
    pub scope: String,

    /// Refresh token, when the grant produces one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// OIDC ID token, when `openid` is in scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl TokenResponse {
    /// Creates a bearer token response.
    #[must_use]
    pub fn new(access_token: impl Into<String>, expires_in: u64, scope: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_string(),
            expires_in,
            scope: scope.into(),
            refresh_token: None,
            id_token: None,
        }
    }

    /// Attaches a refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Attaches an ID token.
    #[must_use]
    pub fn with_id_token(mut self, id_token: impl Into<String>) -> Self {
        self.id_token = Some(id_token.into());
        self
    }
}
