//! Token lifecycle: JWT signing, issuance, rotation, revocation, and
//! introspection.

pub mod introspection;
pub mod jwt;
pub mod revocation;
pub mod service;

pub use introspection::{
    IntrospectionRequest, IntrospectionResponse, authenticate_resource_server,
};
pub use jwt::{
    AccessTokenClaims, IdTokenClaims, Jwk, Jwks, JwtError, JwtService, SigningAlgorithm,
    SigningKeyPair,
};
pub use revocation::{RevocationRequest, TokenTypeHint};
pub use service::{TokenConfig, TokenService};
