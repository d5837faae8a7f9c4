//! Engine configuration.
//!
//! All sections deserialize with defaults so a partial config file is
//! valid. Durations accept humantime strings ("10m", "30d").

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level authorization engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Issuer and endpoint identity.
    pub issuer: IssuerConfig,

    /// OAuth grant and token lifetimes.
    pub oauth: OAuthConfig,

    /// Client JWKS fetching.
    pub jwks: JwksConfig,
}

/// Issuer identity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuerConfig {
    /// Issuer URL, used as the `iss` claim.
    pub url: String,

    /// Token endpoint URL, the required client assertion audience.
    pub token_endpoint: String,

    /// Audience values for issued access tokens.
    pub audience: Vec<String>,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            token_endpoint: "http://localhost:8080/oauth/token".to_string(),
            audience: Vec::new(),
        }
    }
}

/// OAuth lifetimes and policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Authorization code lifetime.
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// ID token lifetime.
    #[serde(with = "humantime_serde")]
    pub id_token_lifetime: Duration,

    /// Maximum accepted client assertion lifetime.
    #[serde(with = "humantime_serde")]
    pub max_assertion_lifetime: Duration,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            authorization_code_lifetime: Duration::from_secs(600),
            access_token_lifetime: Duration::from_secs(3600),
            refresh_token_lifetime: Duration::from_secs(30 * 24 * 3600),
            id_token_lifetime: Duration::from_secs(300),
            max_assertion_lifetime: Duration::from_secs(300),
        }
    }
}

/// Client JWKS fetch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwksConfig {
    /// How long fetched key sets stay fresh.
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,

    /// HTTP request timeout for JWKS fetches.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for JwksConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(3600),
            request_timeout: Duration::from_secs(10),
        }
    }
}
