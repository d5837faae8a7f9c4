//! Client assertion (private_key_jwt) validation per RFC 7523.
//!
//! The assertion is a JWT signed with the client's registered key:
//! `iss` and `sub` both carry the client_id, `aud` names the token
//! endpoint, lifetime is bounded, and each `jti` is accepted once.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::AuthError;
use crate::storage::JtiStorage;
use crate::AuthResult;

/// The assertion type URN required by RFC 7523.
pub const JWT_BEARER_ASSERTION_TYPE: &str =
    "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// Claims carried by a client assertion JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientAssertionClaims {
    /// Issuer; must equal the client_id.
    pub iss: String,

    /// Subject; must equal the client_id.
    pub sub: String,

    /// Audience; must contain the token endpoint URL.
    pub aud: StringOrArray,

    /// Expiration time (Unix seconds).
    pub exp: i64,

    /// Unique assertion identifier, accepted at most once.
    pub jti: String,

    /// Issued-at time (Unix seconds).
    #[serde(default)]
    pub iat: Option<i64>,
}

/// A JSON value that is either a single string or an array of strings.
///
/// RFC 7519 allows `aud` in both shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrArray {
    /// A single string value.
    String(String),
    /// An array of string values.
    Array(Vec<String>),
}

impl StringOrArray {
    /// Returns `true` if the value contains the given string.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        match self {
            Self::String(s) => s == value,
            Self::Array(values) => values.iter().any(|v| v == value),
        }
    }
}

/// Configuration for assertion validation.
#[derive(Debug, Clone)]
pub struct ClientAssertionConfig {
    /// Token endpoint URL; the assertion audience must contain it.
    pub token_endpoint: String,

    /// Maximum accepted assertion lifetime in seconds.
    pub max_lifetime_seconds: i64,
}

impl ClientAssertionConfig {
    /// Creates a configuration with the default 300-second lifetime cap.
    #[must_use]
    pub fn new(token_endpoint: impl Into<String>) -> Self {
        Self {
            token_endpoint: token_endpoint.into(),
            max_lifetime_seconds: 300,
        }
    }

    /// Overrides the maximum assertion lifetime.
    #[must_use]
    pub fn with_max_lifetime(mut self, seconds: i64) -> Self {
        self.max_lifetime_seconds = seconds;
        self
    }
}

impl From<&crate::config::AuthConfig> for ClientAssertionConfig {
    fn from(config: &crate::config::AuthConfig) -> Self {
        Self {
            token_endpoint: config.issuer.token_endpoint.clone(),
            max_lifetime_seconds: i64::try_from(config.oauth.max_assertion_lifetime.as_secs())
                .unwrap_or(i64::MAX),
        }
    }
}

/// Validates client assertion JWTs.
pub struct ClientAssertionValidator<S: JtiStorage> {
    config: ClientAssertionConfig,
    jti_storage: Arc<S>,
}

impl<S: JtiStorage> ClientAssertionValidator<S> {
    /// Creates a new validator.
    pub fn new(config: ClientAssertionConfig, jti_storage: Arc<S>) -> Self {
        Self {
            config,
            jti_storage,
        }
    }

    /// Validates an assertion against the client's public key.
    ///
    /// Checks signature, `iss`/`sub` binding, audience, the lifetime
    /// cap, and single-use `jti`. The JTI is consumed atomically; a
    /// second assertion reusing it fails even under concurrency.
    pub async fn validate(
        &self,
        assertion: &str,
        client_id: &str,
        decoding_key: &DecodingKey,
        algorithm: Algorithm,
    ) -> AuthResult<ClientAssertionClaims> {
        let mut validation = Validation::new(algorithm);
        validation.set_audience(&[&self.config.token_endpoint]);
        validation.set_issuer(&[client_id]);

        let token_data =
            decode::<ClientAssertionClaims>(assertion, decoding_key, &validation).map_err(|e| {
                tracing::debug!(error = %e, "client assertion verification failed");
                AuthError::invalid_client("invalid client assertion")
            })?;
        let claims = token_data.claims;

        if claims.iss != client_id || claims.sub != client_id {
            return Err(AuthError::invalid_client(
                "assertion iss and sub must equal the client_id",
            ));
        }
        if !claims.aud.contains(&self.config.token_endpoint) {
            return Err(AuthError::invalid_client(
                "assertion audience does not include the token endpoint",
            ));
        }

        let now = OffsetDateTime::now_utc().unix_timestamp();
        if claims.exp > now + self.config.max_lifetime_seconds {
            return Err(AuthError::invalid_client("assertion lifetime too long"));
        }

        let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp)
            .map_err(|e| AuthError::invalid_client(format!("invalid exp claim: {e}")))?;
        let fresh = self.jti_storage.mark_used(&claims.jti, expires_at).await?;
        if !fresh {
            tracing::warn!(client_id, jti = %claims.jti, "client assertion replay detected");
            return Err(AuthError::invalid_client("assertion has already been used"));
        }

        Ok(claims)
    }
}

/// Extracts the client_id from an assertion without verifying it.
///
/// Needed to look up the client's keys before the signature can be
/// checked. Requires `iss` and `sub` to be present and identical; the
/// value is confirmed again after signature verification.
pub fn extract_client_id_unverified(assertion: &str) -> AuthResult<String> {
    #[derive(Deserialize)]
    struct MinimalClaims {
        iss: Option<String>,
        sub: Option<String>,
    }

    let payload = decode_segment(assertion, 1)?;
    let claims: MinimalClaims = serde_json::from_slice(&payload)
        .map_err(|_| AuthError::invalid_client("malformed assertion payload"))?;

    match (claims.iss, claims.sub) {
        (Some(iss), Some(sub)) if iss == sub => Ok(iss),
        (Some(_), Some(_)) => Err(AuthError::invalid_client(
            "assertion iss and sub do not match",
        )),
        _ => Err(AuthError::invalid_client("assertion missing iss or sub")),
    }
}

/// Extracts the `kid` from an assertion header without verifying it.
pub fn extract_key_id(assertion: &str) -> AuthResult<Option<String>> {
    #[derive(Deserialize)]
    struct MinimalHeader {
        kid: Option<String>,
    }

    let header = decode_segment(assertion, 0)?;
    let header: MinimalHeader = serde_json::from_slice(&header)
        .map_err(|_| AuthError::invalid_client("malformed assertion header"))?;
    Ok(header.kid)
}

/// Extracts the signing algorithm from an assertion header.
pub fn extract_algorithm(assertion: &str) -> AuthResult<Algorithm> {
    #[derive(Deserialize)]
    struct MinimalHeader {
        alg: String,
    }

    let header = decode_segment(assertion, 0)?;
    let header: MinimalHeader = serde_json::from_slice(&header)
        .map_err(|_| AuthError::invalid_client("malformed assertion header"))?;
    match header.alg.as_str() {
        "RS256" => Ok(Algorithm::RS256),
        "RS384" => Ok(Algorithm::RS384),
        "RS512" => Ok(Algorithm::RS512),
        "ES256" => Ok(Algorithm::ES256),
        "ES384" => Ok(Algorithm::ES384),
        other => Err(AuthError::invalid_client(format!(
            "unsupported assertion algorithm: {other}"
        ))),
    }
}

fn decode_segment(assertion: &str, index: usize) -> AuthResult<Vec<u8>> {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let segment = assertion
        .split('.')
        .nth(index)
        .filter(|_| assertion.split('.').count() == 3)
        .ok_or_else(|| AuthError::invalid_client("assertion is not a JWT"))?;
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::invalid_client("assertion is not valid base64url"))
}
