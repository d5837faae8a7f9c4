//! Token generation and hashing primitives.
//!
//! Opaque credentials (authorization codes, refresh tokens) are generated
//! from 32 bytes of OS randomness and stored only as SHA-256 hex digests.
//! Equality checks on secret material go through [`constant_time_eq`].

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Generates a new opaque token value.
///
/// 32 random bytes, base64url-encoded without padding (43 characters).
#[must_use]
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hashes a token value for storage.
///
/// SHA-256, hex-encoded (64 characters). Raw token values are never
/// persisted; lookups hash the presented value and compare digests.
#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compares two byte strings in constant time.
///
/// Used wherever a caller-supplied value is checked against stored secret
/// material, so comparison timing does not leak the match prefix length.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
