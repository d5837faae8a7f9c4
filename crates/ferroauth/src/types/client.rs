//! OAuth client registration types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A registered OAuth 2.1 client application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique client identifier.
    pub client_id: String,

    /// Argon2 hash of the client secret. `None` for public clients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret_hash: Option<String>,

    /// Human-readable client name.
    pub client_name: String,

    /// Client type determining the authentication requirements.
    pub client_type: ClientType,

    /// How this client authenticates at the token endpoint.
    pub token_endpoint_auth_method: TokenEndpointAuthMethod,

    /// Allowed redirect URIs. Matched exactly, byte for byte.
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// Grant types this client is allowed to use.
    pub grant_types: Vec<GrantType>,

    /// Scopes this client may request. Empty means any registered scope.
    #[serde(default)]
    pub allowed_scopes: Vec<String>,

    /// Whether PKCE is required for authorization code flows.
    ///
    /// Public clients always require PKCE regardless of this flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pkce_required: Option<bool>,

    /// Inline JWK set for `private_key_jwt` authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks: Option<jsonwebtoken::jwk::JwkSet>,

    /// URI of a remote JWK set for `private_key_jwt` authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<String>,

    /// Per-client access token lifetime override in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_lifetime: Option<i64>,

    /// Per-client refresh token lifetime override in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_lifetime: Option<i64>,

    /// Whether the client is active. Inactive clients cannot authenticate.
    pub active: bool,

    /// When the client was registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the client was last updated.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Client {
    /// Validates the client registration for internal consistency.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.client_id.is_empty() {
            return Err(ClientValidationError::EmptyClientId);
        }
        if self.client_name.is_empty() {
            return Err(ClientValidationError::EmptyClientName);
        }
        if self.grant_types.is_empty() {
            return Err(ClientValidationError::NoGrantTypes);
        }
        match self.client_type {
            ClientType::Public => {
                if self.client_secret_hash.is_some() {
                    return Err(ClientValidationError::PublicClientWithSecret);
                }
                if self.token_endpoint_auth_method != TokenEndpointAuthMethod::None {
                    return Err(ClientValidationError::PublicClientWithAuthMethod);
                }
                if self.grant_types.contains(&GrantType::ClientCredentials) {
                    return Err(ClientValidationError::PublicClientCredentials);
                }
            }
            ClientType::Confidential => {
                if self.token_endpoint_auth_method == TokenEndpointAuthMethod::None {
                    return Err(ClientValidationError::ConfidentialClientWithoutAuthMethod);
                }
                let needs_secret = matches!(
                    self.token_endpoint_auth_method,
                    TokenEndpointAuthMethod::ClientSecretBasic
                        | TokenEndpointAuthMethod::ClientSecretPost
                );
                if needs_secret && self.client_secret_hash.is_none() {
                    return Err(ClientValidationError::ConfidentialClientWithoutSecret);
                }
                if self.token_endpoint_auth_method == TokenEndpointAuthMethod::PrivateKeyJwt
                    && self.jwks.is_none()
                    && self.jwks_uri.is_none()
                {
                    return Err(ClientValidationError::NoClientKeys);
                }
            }
        }
        if self.grant_types.contains(&GrantType::AuthorizationCode) && self.redirect_uris.is_empty()
        {
            return Err(ClientValidationError::NoRedirectUris);
        }
        Ok(())
    }

    /// Returns `true` if this is a confidential client.
    #[must_use]
    pub fn is_confidential(&self) -> bool {
        self.client_type == ClientType::Confidential
    }

    /// Checks whether the redirect URI is registered for this client.
    ///
    /// Exact string comparison only; no prefix, pattern, or case folding.
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|allowed| allowed == uri)
    }

    /// Checks whether a single scope is allowed for this client.
    ///
    /// An empty `allowed_scopes` list means the client may request any
    /// scope the server registers.
    #[must_use]
    pub fn is_scope_allowed(&self, scope: &str) -> bool {
        self.allowed_scopes.is_empty() || self.allowed_scopes.iter().any(|s| s == scope)
    }

    /// Checks whether the client may use a given grant type.
    #[must_use]
    pub fn is_grant_type_allowed(&self, grant_type: &GrantType) -> bool {
        self.grant_types.contains(grant_type)
    }

    /// Returns `true` if PKCE is required for this client's authorization
    /// code flows. Always `true` for public clients.
    #[must_use]
    pub fn requires_pkce(&self) -> bool {
        match self.client_type {
            ClientType::Public => true,
            ClientType::Confidential => self.pkce_required.unwrap_or(false),
        }
    }
}

/// OAuth client type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    /// Can keep a secret (server-side application).
    Confidential,
    /// Cannot keep a secret (SPA, native app). Must use PKCE.
    Public,
}

/// OAuth 2.1 grant types supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization code grant with PKCE.
    AuthorizationCode,
    /// Client credentials grant (machine-to-machine).
    ClientCredentials,
    /// Refresh token grant.
    RefreshToken,
}

impl GrantType {
    /// Returns the wire value of this grant type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
        }
    }
}

/// Token endpoint authentication methods (RFC 7591 Section 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEndpointAuthMethod {
    /// No authentication (public client).
    None,
    /// HTTP Basic authentication with client_id and client_secret.
    ClientSecretBasic,
    /// Credentials in the request body.
    ClientSecretPost,
    /// Signed JWT assertion (RFC 7523).
    PrivateKeyJwt,
}

impl TokenEndpointAuthMethod {
    /// Returns the wire value of this authentication method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ClientSecretBasic => "client_secret_basic",
            Self::ClientSecretPost => "client_secret_post",
            Self::PrivateKeyJwt => "private_key_jwt",
        }
    }
}

/// Client registration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientValidationError {
    #[error("client_id cannot be empty")]
    EmptyClientId,

    #[error("client_name cannot be empty")]
    EmptyClientName,

    #[error("client must have at least one grant type")]
    NoGrantTypes,

    #[error("public clients cannot have a client secret")]
    PublicClientWithSecret,

    #[error("public clients must use auth method 'none'")]
    PublicClientWithAuthMethod,

    #[error("public clients cannot use the client_credentials grant")]
    PublicClientCredentials,

    #[error("confidential clients must have an auth method other than 'none'")]
    ConfidentialClientWithoutAuthMethod,

    #[error("confidential clients using a secret-based auth method must have a secret")]
    ConfidentialClientWithoutSecret,

    #[error("private_key_jwt clients must register jwks or jwks_uri")]
    NoClientKeys,

    #[error("clients using the authorization_code grant must register redirect URIs")]
    NoRedirectUris,
}
