//! Argon2 secret hashing shared by the credential stores.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use ferroauth::{AuthError, AuthResult};

/// Hashes a client or resource server secret for storage.
pub fn hash_secret(secret: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::internal(format!("secret hashing failed: {e}")))
}

/// Verifies a presented secret against a stored hash.
///
/// A malformed stored hash verifies as `false` rather than erroring;
/// the caller treats it like any wrong secret.
pub(crate) fn verify_secret(secret: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok()
}
