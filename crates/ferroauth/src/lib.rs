//! OAuth 2.1 / OpenID Connect authorization and token engine.
//!
//! Ferroauth implements the core server-side mechanics of an OAuth 2.1
//! authorization server: client authentication (secret-based and
//! `private_key_jwt`), PKCE-bound authorization codes, token issuance
//! with refresh rotation, RFC 7009 revocation, and RFC 7662
//! introspection. Storage is behind async traits so backends are
//! pluggable; `ferroauth-memory` ships an in-memory implementation.

pub mod audit;
pub mod config;
pub mod crypto;
pub mod error;
pub mod oauth;
pub mod storage;
pub mod token;
pub mod types;

pub use config::AuthConfig;
pub use error::{AuthError, ErrorCategory, ErrorResponse};

/// Result type for authorization operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Commonly used types, re-exported for convenience.
pub mod prelude {
    pub use crate::audit::{AuditAction, AuditEvent, AuditSink};
    pub use crate::error::{AuthError, ErrorResponse};
    pub use crate::oauth::{
        AuthenticatedClient, CodeManager, IssueCodeParams, JwksCache, PkceChallenge, PkceVerifier,
        ScopeRegistry, TokenRequest, TokenResponse, authenticate_client,
    };
    pub use crate::storage::{
        AccessTokenStorage, AuthorizationCodeStorage, ClientStorage, ConsentStorage, JtiStorage,
        RefreshTokenStorage, ResourceServerStorage, RevokedTokenStorage,
    };
    pub use crate::token::{
        IntrospectionRequest, IntrospectionResponse, JwtService, RevocationRequest, SigningKeyPair,
        TokenConfig, TokenService, TokenTypeHint,
    };
    pub use crate::types::{Client, ClientType, GrantType, TokenEndpointAuthMethod};
    pub use crate::AuthResult;
}
