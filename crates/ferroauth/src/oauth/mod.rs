//! OAuth 2.1 protocol components: client authentication, PKCE,
//! authorization codes, and scope negotiation.

pub mod client_assertion;
pub mod client_auth;
pub mod code;
pub mod jwks;
pub mod pkce;
pub mod request;
pub mod scope;

pub use client_assertion::{
    ClientAssertionClaims, ClientAssertionConfig, ClientAssertionValidator,
    JWT_BEARER_ASSERTION_TYPE,
};
pub use client_auth::{AuthMethod, AuthenticatedClient, authenticate_client, parse_basic_auth};
pub use code::{CodeManager, IssueCodeParams};
pub use jwks::{JwksCache, JwksCacheConfig};
pub use pkce::{PkceChallenge, PkceChallengeMethod, PkceError, PkceVerifier};
pub use request::{TokenRequest, TokenResponse};
pub use scope::{ScopeRegistry, narrow_scope, parse_scope};
