//! In-memory storage backend for the ferroauth engine.
//!
//! Every store is a `tokio::sync::RwLock`-guarded map, with the
//! single-use operations (`consume`, `revoke`, `mark_used`) performed
//! under the write lock so their atomicity contracts hold. Suitable for
//! tests and single-process deployments; state is lost on restart.

mod access_token;
mod client;
mod code;
mod consent;
mod jti;
mod refresh_token;
mod resource_server;
mod revoked;
mod secret;

pub use access_token::InMemoryAccessTokenStorage;
pub use client::InMemoryClientStorage;
pub use code::InMemoryAuthorizationCodeStorage;
pub use consent::InMemoryConsentStorage;
pub use jti::InMemoryJtiStorage;
pub use refresh_token::InMemoryRefreshTokenStorage;
pub use resource_server::InMemoryResourceServerStorage;
pub use revoked::InMemoryRevokedTokenStorage;
pub use secret::hash_secret;
