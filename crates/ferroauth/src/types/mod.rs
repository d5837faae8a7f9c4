//! Core domain types for the authorization engine.

pub mod access_token;
pub mod authorization_code;
pub mod client;
pub mod consent;
pub mod refresh_token;
pub mod resource_server;

pub use access_token::AccessTokenRecord;
pub use authorization_code::AuthorizationCode;
pub use client::{Client, ClientType, ClientValidationError, GrantType, TokenEndpointAuthMethod};
pub use consent::UserConsent;
pub use refresh_token::RefreshToken;
pub use resource_server::ResourceServer;
