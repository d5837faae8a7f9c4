//! JWT signing and verification.
//!
//! Access and ID tokens are asymmetrically signed JWTs. Key material
//! lives in a [`SigningKeyPair`]; the public half is published through
//! the JWKS document so resource servers can verify locally.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use time::OffsetDateTime;
use uuid::Uuid;

/// JWT-related errors.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Token signature verification failed.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token is not yet valid or otherwise malformed.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// A claim failed validation.
    #[error("invalid claim: {0}")]
    InvalidClaim(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    Key(String),

    /// Signing failed.
    #[error("signing error: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidIssuer => Self::InvalidClaim("iss".to_string()),
            ErrorKind::InvalidAudience => Self::InvalidClaim("aud".to_string()),
            ErrorKind::ImmatureSignature => Self::InvalidClaim("nbf".to_string()),
            _ => Self::Malformed(err.to_string()),
        }
    }
}

/// Signing algorithms the engine can issue tokens with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// RSA with SHA-256.
    RS256,
    /// ECDSA P-384 with SHA-384.
    ES384,
}

impl SigningAlgorithm {
    /// Converts to the jsonwebtoken algorithm.
    #[must_use]
    pub fn to_jwt_algorithm(self) -> Algorithm {
        match self {
            Self::RS256 => Algorithm::RS256,
            Self::ES384 => Algorithm::ES384,
        }
    }

    /// Returns the JOSE name of this algorithm.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RS256 => "RS256",
            Self::ES384 => "ES384",
        }
    }
}

/// Claims carried by an issued access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Issuer (this authorization server).
    pub iss: String,
    /// Subject: the user id, or the client_id for client_credentials.
    pub sub: String,
    /// Audience.
    pub aud: Vec<String>,
    /// Expiration time (Unix seconds).
    pub exp: i64,
    /// Issued-at time (Unix seconds).
    pub iat: i64,
    /// Unique token identifier; key for revocation cross-checks.
    pub jti: String,
    /// Granted scope, space-delimited.
    pub scope: String,
    /// The client the token was issued to.
    pub client_id: String,
}

/// Claims carried by an OIDC ID token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Issuer (this authorization server).
    pub iss: String,
    /// Subject: the authenticated user.
    pub sub: String,
    /// Audience: the client_id.
    pub aud: String,
    /// Expiration time (Unix seconds).
    pub exp: i64,
    /// Issued-at time (Unix seconds).
    pub iat: i64,
    /// Nonce echoed from the authorization request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

/// Published JWKS document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwks {
    /// The signing keys.
    pub keys: Vec<Jwk>,
}

/// A single published JSON Web Key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type ("RSA" or "EC").
    pub kty: String,
    /// Key identifier.
    pub kid: String,
    /// Key use, always "sig".
    #[serde(rename = "use")]
    pub use_: String,
    /// Algorithm.
    pub alg: String,
    /// RSA modulus (base64url).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA exponent (base64url).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    /// EC curve name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    /// EC x coordinate (base64url).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// EC y coordinate (base64url).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

enum PublicKeyData {
    Rsa { n: Vec<u8>, e: Vec<u8> },
    Ec { x: Vec<u8>, y: Vec<u8> },
}

/// An asymmetric signing key pair with its published metadata.
pub struct SigningKeyPair {
    kid: String,
    algorithm: SigningAlgorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    public_key_data: PublicKeyData,
}

impl SigningKeyPair {
    /// Generates a new 2048-bit RSA key pair for RS256.
    pub fn generate_rsa() -> Result<Self, JwtError> {
        use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
        use rsa::traits::PublicKeyParts;
        use rsa::{RsaPrivateKey, RsaPublicKey};

        let mut rng = rand::rngs::OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, 2048)
            .map_err(|e| JwtError::Key(format!("RSA generation failed: {e}")))?;
        let public_key = RsaPublicKey::from(&private_key);

        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| JwtError::Key(format!("private key encoding failed: {e}")))?;
        let public_pem = public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| JwtError::Key(format!("public key encoding failed: {e}")))?;

        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| JwtError::Key(e.to_string()))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes())
            .map_err(|e| JwtError::Key(e.to_string()))?;

        Ok(Self {
            kid: Uuid::new_v4().to_string(),
            algorithm: SigningAlgorithm::RS256,
            encoding_key,
            decoding_key,
            public_key_data: PublicKeyData::Rsa {
                n: public_key.n().to_bytes_be(),
                e: public_key.e().to_bytes_be(),
            },
        })
    }

    /// Generates a new P-384 key pair for ES384.
    pub fn generate_ec() -> Result<Self, JwtError> {
        use p384::SecretKey;
        use p384::elliptic_curve::sec1::ToEncodedPoint;
        use p384::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};

        let secret_key = SecretKey::random(&mut rand::rngs::OsRng);
        let public_key = secret_key.public_key();

        let private_pem = secret_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| JwtError::Key(format!("private key encoding failed: {e}")))?;
        let public_pem = public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| JwtError::Key(format!("public key encoding failed: {e}")))?;

        let encoding_key = EncodingKey::from_ec_pem(private_pem.as_bytes())
            .map_err(|e| JwtError::Key(e.to_string()))?;
        let decoding_key = DecodingKey::from_ec_pem(public_pem.as_bytes())
            .map_err(|e| JwtError::Key(e.to_string()))?;

        let point = public_key.to_encoded_point(false);
        let x = point
            .x()
            .ok_or_else(|| JwtError::Key("missing x coordinate".to_string()))?
            .to_vec();
        let y = point
            .y()
            .ok_or_else(|| JwtError::Key("missing y coordinate".to_string()))?
            .to_vec();

        Ok(Self {
            kid: Uuid::new_v4().to_string(),
            algorithm: SigningAlgorithm::ES384,
            encoding_key,
            decoding_key,
            public_key_data: PublicKeyData::Ec { x, y },
        })
    }

    /// Returns the key identifier.
    #[must_use]
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Returns the signing algorithm.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Exports the public half as a published JWK.
    #[must_use]
    pub fn to_jwk(&self) -> Jwk {
        match &self.public_key_data {
            PublicKeyData::Rsa { n, e } => Jwk {
                kty: "RSA".to_string(),
                kid: self.kid.clone(),
                use_: "sig".to_string(),
                alg: self.algorithm.as_str().to_string(),
                n: Some(URL_SAFE_NO_PAD.encode(n)),
                e: Some(URL_SAFE_NO_PAD.encode(e)),
                crv: None,
                x: None,
                y: None,
            },
            PublicKeyData::Ec { x, y } => Jwk {
                kty: "EC".to_string(),
                kid: self.kid.clone(),
                use_: "sig".to_string(),
                alg: self.algorithm.as_str().to_string(),
                n: None,
                e: None,
                crv: Some("P-384".to_string()),
                x: Some(URL_SAFE_NO_PAD.encode(x)),
                y: Some(URL_SAFE_NO_PAD.encode(y)),
            },
        }
    }
}

/// Signs and verifies engine-issued JWTs.
pub struct JwtService {
    signing_key: SigningKeyPair,
    issuer: String,
}

impl JwtService {
    /// Creates a service with the given key and issuer.
    #[must_use]
    pub fn new(signing_key: SigningKeyPair, issuer: impl Into<String>) -> Self {
        Self {
            signing_key,
            issuer: issuer.into(),
        }
    }

    /// Signs a claims set into a compact JWT with the current `kid`.
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let mut header = Header::new(self.signing_key.algorithm.to_jwt_algorithm());
        header.kid = Some(self.signing_key.kid.clone());
        jsonwebtoken::encode(&header, claims, &self.signing_key.encoding_key)
            .map_err(|e| JwtError::Signing(e.to_string()))
    }

    /// Verifies and decodes a JWT issued by this service.
    ///
    /// Validates signature, expiry, and issuer. Audience is checked by
    /// the caller, who knows which audience applies.
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        let mut validation = Validation::new(self.signing_key.algorithm.to_jwt_algorithm());
        validation.set_issuer(&[&self.issuer]);
        validation.validate_aud = false;
        let data = jsonwebtoken::decode::<T>(token, &self.signing_key.decoding_key, &validation)?;
        Ok(data.claims)
    }

    /// Like [`Self::decode`] but accepts expired tokens.
    ///
    /// Revocation needs this: an expired-but-well-formed token still
    /// identifies the record to revoke.
    pub fn decode_allow_expired<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        let mut validation = Validation::new(self.signing_key.algorithm.to_jwt_algorithm());
        validation.set_issuer(&[&self.issuer]);
        validation.validate_aud = false;
        validation.validate_exp = false;
        let data = jsonwebtoken::decode::<T>(token, &self.signing_key.decoding_key, &validation)?;
        Ok(data.claims)
    }

    /// Returns the issuer string.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the current key identifier.
    #[must_use]
    pub fn current_kid(&self) -> &str {
        self.signing_key.kid()
    }

    /// Returns the published JWKS document.
    #[must_use]
    pub fn jwks(&self) -> Jwks {
        Jwks {
            keys: vec![self.signing_key.to_jwk()],
        }
    }
}

/// Builds access token claims for a new issuance.
#[must_use]
pub fn access_token_claims(
    issuer: &str,
    subject: &str,
    audience: Vec<String>,
    client_id: &str,
    scope: &str,
    lifetime_seconds: i64,
) -> AccessTokenClaims {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    AccessTokenClaims {
        iss: issuer.to_string(),
        sub: subject.to_string(),
        aud: audience,
        exp: now + lifetime_seconds,
        iat: now,
        jti: Uuid::new_v4().to_string(),
        scope: scope.to_string(),
        client_id: client_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        let key = SigningKeyPair::generate_rsa().unwrap();
        JwtService::new(key, "https://auth.example.com")
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let service = service();
        let claims = access_token_claims(
            "https://auth.example.com",
            "user-123",
            vec!["https://api.example.com".to_string()],
            "client-a",
            "openid profile",
            3600,
        );

        let token = service.encode(&claims).unwrap();
        let decoded: AccessTokenClaims = service.decode(&token).unwrap();
        assert_eq!(decoded.sub, "user-123");
        assert_eq!(decoded.client_id, "client-a");
        assert_eq!(decoded.jti, claims.jti);
    }

    #[test]
    fn test_expired_token_rejected_but_decodable() {
        let service = service();
        let mut claims = access_token_claims(
            "https://auth.example.com",
            "user-123",
            vec![],
            "client-a",
            "openid",
            3600,
        );
        claims.exp = claims.iat - 100;

        let token = service.encode(&claims).unwrap();
        assert!(matches!(
            service.decode::<AccessTokenClaims>(&token),
            Err(JwtError::Expired)
        ));
        let decoded: AccessTokenClaims = service.decode_allow_expired(&token).unwrap();
        assert_eq!(decoded.jti, claims.jti);
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let service = service();
        let claims = AccessTokenClaims {
            iss: "https://other-issuer.example.com".to_string(),
            sub: "user".to_string(),
            aud: vec![],
            exp: OffsetDateTime::now_utc().unix_timestamp() + 3600,
            iat: OffsetDateTime::now_utc().unix_timestamp(),
            jti: Uuid::new_v4().to_string(),
            scope: "openid".to_string(),
            client_id: "client-a".to_string(),
        };

        let token = service.encode(&claims).unwrap();
        assert!(matches!(
            service.decode::<AccessTokenClaims>(&token),
            Err(JwtError::InvalidClaim(_))
        ));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let service_a = service();
        let service_b = service();
        let claims = access_token_claims(
            "https://auth.example.com",
            "user",
            vec![],
            "client-a",
            "openid",
            3600,
        );

        let token = service_a.encode(&claims).unwrap();
        assert!(service_b.decode::<AccessTokenClaims>(&token).is_err());
    }

    #[test]
    fn test_rsa_jwk_export() {
        let key = SigningKeyPair::generate_rsa().unwrap();
        let jwk = key.to_jwk();
        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.use_, "sig");
        assert_eq!(jwk.alg, "RS256");
        assert!(jwk.n.is_some());
        assert!(jwk.e.is_some());
        assert!(jwk.crv.is_none());
    }

    #[test]
    fn test_ec_jwk_export() {
        let key = SigningKeyPair::generate_ec().unwrap();
        let jwk = key.to_jwk();
        assert_eq!(jwk.kty, "EC");
        assert_eq!(jwk.alg, "ES384");
        assert_eq!(jwk.crv.as_deref(), Some("P-384"));
        assert!(jwk.x.is_some());
        assert!(jwk.y.is_some());
    }

    #[test]
    fn test_jwks_document() {
        let service = service();
        let jwks = service.jwks();
        assert_eq!(jwks.keys.len(), 1);
        assert_eq!(jwks.keys[0].kid, service.current_kid());
    }
}
