//! Token introspection types (RFC 7662).

use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::storage::ResourceServerStorage;
use crate::token::revocation::TokenTypeHint;
use crate::types::ResourceServer;
use crate::AuthResult;

/// An introspection endpoint request.
#[derive(Debug, Clone, Deserialize)]
pub struct IntrospectionRequest {
    /// The token to introspect.
    pub token: String,

    /// Optional hint about the token's type.
    #[serde(default)]
    pub token_type_hint: Option<TokenTypeHint>,
}

/// An introspection response (RFC 7662 Section 2.2).
///
/// An inactive token serializes as exactly `{"active":false}`; every
/// other field is omitted so callers learn nothing about why.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntrospectionResponse {
    /// Whether the token is currently active.
    pub active: bool,

    /// The granted scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// The client the token was issued to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// The token subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Token type ("Bearer" or "refresh_token").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Expiration time (Unix seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued-at time (Unix seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Audience.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<Vec<String>>,

    /// JWT ID, for access tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl IntrospectionResponse {
    /// The response for any token that is not verifiably active.
    #[must_use]
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Starts an active response.
    #[must_use]
    pub fn active() -> Self {
        Self {
            active: true,
            ..Self::default()
        }
    }

    /// Sets the scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Sets the client_id.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn with_sub(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// Sets the token type.
    #[must_use]
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }

    /// Sets expiry and issued-at.
    #[must_use]
    pub fn with_times(mut self, iat: i64, exp: i64) -> Self {
        self.iat = Some(iat);
        self.exp = Some(exp);
        self
    }
}

/// Authenticates the resource server calling the introspection
/// endpoint.
///
/// Resource servers are a credential namespace separate from OAuth
/// clients. Failures are indistinguishable, matching the client
/// authentication policy.
pub async fn authenticate_resource_server(
    credentials: Option<(&str, &str)>,
    storage: &dyn ResourceServerStorage,
) -> AuthResult<ResourceServer> {
    let generic = || AuthError::invalid_client("resource server authentication failed");

    let Some((id, secret)) = credentials else {
        return Err(generic());
    };
    let server = storage.find_by_id(id).await?.ok_or_else(generic)?;
    if !server.active {
        return Err(generic());
    }
    if !storage.verify_secret(id, secret).await? {
        return Err(generic());
    }
    Ok(server)
}
