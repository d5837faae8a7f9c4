//! Client JWKS resolution with a TTL cache.
//!
//! Clients authenticating with `private_key_jwt` register either an
//! inline JWK set or a `jwks_uri`. Remote sets are fetched over HTTPS
//! and cached per client; a fetch failure fails the authentication
//! rather than falling back to a stale set.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, PublicKeyUse};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::RwLock;

use crate::error::AuthError;
use crate::AuthResult;

/// Configuration for remote JWKS fetching.
#[derive(Debug, Clone)]
pub struct JwksCacheConfig {
    /// How long a fetched set stays fresh.
    pub ttl: Duration,

    /// HTTP request timeout.
    pub request_timeout: Duration,

    /// Maximum accepted response body size in bytes.
    pub max_response_size: u64,
}

impl Default for JwksCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            request_timeout: Duration::from_secs(10),
            max_response_size: 1024 * 1024,
        }
    }
}

impl JwksCacheConfig {
    /// Overrides the cache TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Overrides the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl From<&crate::config::JwksConfig> for JwksCacheConfig {
    fn from(config: &crate::config::JwksConfig) -> Self {
        Self {
            ttl: config.cache_ttl,
            request_timeout: config.request_timeout,
            ..Self::default()
        }
    }
}

struct CachedJwks {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// Per-client cache of remote JWK sets.
pub struct JwksCache {
    cache: Arc<RwLock<HashMap<String, CachedJwks>>>,
    config: JwksCacheConfig,
}

impl JwksCache {
    /// Creates a cache with the given configuration.
    #[must_use]
    pub fn new(config: JwksCacheConfig) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Resolves a decoding key from a client's remote JWK set.
    ///
    /// Serves from cache while fresh; otherwise fetches, caches, and
    /// searches the new set. Expired-cache fetch failures propagate
    /// instead of reviving the stale copy.
    pub async fn get_decoding_key(
        &self,
        client_id: &str,
        jwks_uri: &str,
        kid: Option<&str>,
        algorithm: Algorithm,
    ) -> AuthResult<DecodingKey> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(client_id)
                && cached.fetched_at.elapsed() < self.config.ttl
            {
                return find_key(&cached.jwks, kid, algorithm);
            }
        }

        let jwks = self.fetch_jwks(jwks_uri).await?;
        let key = find_key(&jwks, kid, algorithm);

        let mut cache = self.cache.write().await;
        cache.insert(
            client_id.to_string(),
            CachedJwks {
                jwks,
                fetched_at: Instant::now(),
            },
        );
        key
    }

    /// Drops a client's cached set (e.g. after a key rotation notice).
    pub async fn invalidate(&self, client_id: &str) {
        self.cache.write().await.remove(client_id);
    }

    /// Drops all cached sets.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    async fn fetch_jwks(&self, jwks_uri: &str) -> AuthResult<JwkSet> {
        if !jwks_uri.starts_with("https://") {
            return Err(AuthError::configuration(format!(
                "jwks_uri must use https: {jwks_uri}"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(self.config.request_timeout)
            .build()
            .map_err(|e| AuthError::internal(format!("failed to build HTTP client: {e}")))?;

        let response = client.get(jwks_uri).send().await.map_err(|e| {
            tracing::warn!(jwks_uri, error = %e, "JWKS fetch failed");
            AuthError::invalid_client("could not fetch client keys")
        })?;

        if !response.status().is_success() {
            tracing::warn!(jwks_uri, status = %response.status(), "JWKS endpoint returned error");
            return Err(AuthError::invalid_client("could not fetch client keys"));
        }

        if let Some(length) = response.content_length()
            && length > self.config.max_response_size
        {
            return Err(AuthError::invalid_client("JWKS response too large"));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|_| AuthError::invalid_client("JWKS response is not a valid key set"))
    }
}

/// Resolves a decoding key from an inline JWK set.
pub fn get_decoding_key_from_inline(
    jwks: &JwkSet,
    kid: Option<&str>,
    algorithm: Algorithm,
) -> AuthResult<DecodingKey> {
    find_key(jwks, kid, algorithm)
}

fn find_key(jwks: &JwkSet, kid: Option<&str>, algorithm: Algorithm) -> AuthResult<DecodingKey> {
    let candidate = jwks.keys.iter().find(|jwk| {
        let kid_matches = match kid {
            Some(kid) => jwk.common.key_id.as_deref() == Some(kid),
            None => true,
        };
        let use_matches = !matches!(
            jwk.common.public_key_use,
            Some(PublicKeyUse::Encryption) | Some(PublicKeyUse::Other(_))
        );
        kid_matches && use_matches && algorithm_matches(jwk, algorithm)
    });

    let Some(jwk) = candidate else {
        return Err(AuthError::invalid_client("no matching client key found"));
    };

    DecodingKey::from_jwk(jwk)
        .map_err(|e| AuthError::invalid_client(format!("unusable client key: {e}")))
}

fn algorithm_matches(jwk: &Jwk, algorithm: Algorithm) -> bool {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(_) => matches!(
            algorithm,
            Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512
        ),
        AlgorithmParameters::EllipticCurve(_) => {
            matches!(algorithm, Algorithm::ES256 | Algorithm::ES384)
        }
        _ => false,
    }
}
