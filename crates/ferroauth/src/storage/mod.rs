//! Storage traits for the authorization engine.
//!
//! Every backend implements these async traits; the engine only ever
//! holds `Arc<dyn Trait>` handles, so backends can be swapped without
//! touching the grant logic. Operations that enforce single-use
//! semantics ([`AuthorizationCodeStorage::consume`],
//! [`RefreshTokenStorage::revoke`], [`JtiStorage::mark_used`]) carry
//! atomicity contracts that implementations must honor.

pub mod access_token;
pub mod client;
pub mod code;
pub mod consent;
pub mod jti;
pub mod refresh_token;
pub mod resource_server;
pub mod revoked_token;

pub use access_token::AccessTokenStorage;
pub use client::ClientStorage;
pub use code::AuthorizationCodeStorage;
pub use consent::ConsentStorage;
pub use jti::JtiStorage;
pub use refresh_token::RefreshTokenStorage;
pub use resource_server::ResourceServerStorage;
pub use revoked_token::{RevokedTokenStorage, RevokedTokenType};
