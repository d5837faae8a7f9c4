//! PKCE (Proof Key for Code Exchange) implementation per RFC 7636.
//!
//! Only the `S256` method may be used for new authorizations. Records
//! created elsewhere with the `plain` method are still verifiable at
//! redemption, but the engine never issues new grants with it.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::crypto::constant_time_eq;

/// PKCE-related errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PkceError {
    /// Code verifier length is outside the RFC 7636 bounds (43-128).
    #[error("code verifier must be 43-128 characters, got {length}")]
    InvalidVerifierLength {
        /// Actual length of the provided verifier.
        length: usize,
    },

    /// Code verifier contains characters outside the unreserved set.
    #[error("code verifier contains invalid characters")]
    InvalidVerifierCharacters,

    /// Code challenge is malformed.
    #[error("invalid code challenge format")]
    InvalidChallengeFormat,

    /// Challenge method is not accepted for new authorizations.
    #[error("unsupported code challenge method: {method}")]
    UnsupportedMethod {
        /// The rejected method.
        method: String,
    },

    /// Verifier does not match the recorded challenge.
    #[error("code verifier does not match challenge")]
    VerificationFailed,
}

impl PkceError {
    /// Creates an `InvalidVerifierLength` error.
    #[must_use]
    pub fn invalid_verifier_length(length: usize) -> Self {
        Self::InvalidVerifierLength { length }
    }

    /// Creates an `UnsupportedMethod` error.
    #[must_use]
    pub fn unsupported_method(method: impl Into<String>) -> Self {
        Self::UnsupportedMethod {
            method: method.into(),
        }
    }

    /// Returns the OAuth error code for this error.
    ///
    /// Verification failures map to `invalid_grant`; everything else is
    /// a malformed request.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::VerificationFailed => "invalid_grant",
            _ => "invalid_request",
        }
    }
}

/// Code challenge methods accepted for new authorizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PkceChallengeMethod {
    /// SHA-256 transformation (the only method accepted).
    S256,
}

impl PkceChallengeMethod {
    /// Parses a method string from an authorization request.
    ///
    /// `plain` is deliberately rejected here; it survives only on
    /// records written before the policy changed.
    pub fn parse(s: &str) -> Result<Self, PkceError> {
        match s {
            "S256" => Ok(Self::S256),
            other => Err(PkceError::unsupported_method(other)),
        }
    }

    /// Returns the wire value of this method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S256 => "S256",
        }
    }
}

/// A PKCE code verifier (the secret the client holds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceVerifier(String);

impl PkceVerifier {
    /// Validates and wraps a code verifier string.
    ///
    /// Must be 43-128 characters from the unreserved set
    /// `[A-Za-z0-9\-._~]` (RFC 7636 Section 4.1).
    pub fn new(verifier: impl Into<String>) -> Result<Self, PkceError> {
        let verifier = verifier.into();
        let length = verifier.len();
        if !(43..=128).contains(&length) {
            return Err(PkceError::invalid_verifier_length(length));
        }
        let valid = verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'));
        if !valid {
            return Err(PkceError::InvalidVerifierCharacters);
        }
        Ok(Self(verifier))
    }

    /// Generates a fresh random verifier (32 bytes, base64url).
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        // r#gen because `gen` is a keyword in edition 2024
        let bytes: [u8; 32] = rng.r#gen();
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Returns the verifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A PKCE code challenge (recorded at authorization time).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge(String);

impl PkceChallenge {
    /// Wraps a challenge string received from a client.
    pub fn new(challenge: impl Into<String>) -> Result<Self, PkceError> {
        let challenge = challenge.into();
        // S256 output is 32 bytes base64url encoded, always 43 chars
        if challenge.len() != 43 {
            return Err(PkceError::InvalidChallengeFormat);
        }
        Ok(Self(challenge))
    }

    /// Derives the S256 challenge for a verifier.
    #[must_use]
    pub fn from_verifier(verifier: &PkceVerifier) -> Self {
        let digest = Sha256::digest(verifier.as_str().as_bytes());
        Self(URL_SAFE_NO_PAD.encode(digest))
    }

    /// Verifies a code verifier against this challenge.
    ///
    /// Recomputes the S256 transformation and compares in constant time.
    pub fn verify(&self, verifier: &PkceVerifier) -> Result<(), PkceError> {
        let expected = Self::from_verifier(verifier);
        if constant_time_eq(self.0.as_bytes(), expected.0.as_bytes()) {
            Ok(())
        } else {
            Err(PkceError::VerificationFailed)
        }
    }

    /// Returns the challenge string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Verifies a verifier against a challenge recorded with the `plain`
/// method. Constant-time direct comparison; never used for new grants.
pub fn verify_plain(challenge: &str, verifier: &PkceVerifier) -> Result<(), PkceError> {
    if constant_time_eq(challenge.as_bytes(), verifier.as_str().as_bytes()) {
        Ok(())
    } else {
        Err(PkceError::VerificationFailed)
    }
}
