//! Client authentication at the token endpoint.
//!
//! Credentials are resolved in a fixed order: HTTP Basic, then
//! body-based secret, then a signed JWT assertion, then a bare
//! client_id for public clients. Every failure surfaces as the same
//! generic `invalid_client` so callers cannot probe which client ids
//! exist or which check failed; the specific reason goes to the debug
//! log only.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::oauth::client_assertion::{
    ClientAssertionValidator, JWT_BEARER_ASSERTION_TYPE, extract_algorithm,
    extract_client_id_unverified, extract_key_id,
};
use crate::oauth::jwks::{JwksCache, get_decoding_key_from_inline};
use crate::oauth::request::TokenRequest;
use crate::storage::{ClientStorage, JtiStorage};
use crate::types::{Client, ClientType, TokenEndpointAuthMethod};
use crate::AuthResult;

/// A successfully authenticated client and how it authenticated.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    /// The authenticated client.
    pub client: Client,
    /// The method the client used.
    pub auth_method: AuthMethod,
}

/// The authentication method a request actually used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// HTTP Basic authentication.
    ClientSecretBasic,
    /// Credentials in the request body.
    ClientSecretPost,
    /// Signed JWT assertion.
    PrivateKeyJwt,
    /// Public client, no credentials.
    None,
}

/// Authenticates the client behind a token endpoint request.
///
/// `basic_auth` carries already-split Basic credentials when the
/// request had an Authorization header (see [`parse_basic_auth`]).
pub async fn authenticate_client<S: JtiStorage>(
    request: &TokenRequest,
    basic_auth: Option<(&str, &str)>,
    client_storage: &dyn ClientStorage,
    assertion_validator: &ClientAssertionValidator<S>,
    jwks_cache: &JwksCache,
) -> AuthResult<AuthenticatedClient> {
    let result = resolve_and_authenticate(
        request,
        basic_auth,
        client_storage,
        assertion_validator,
        jwks_cache,
    )
    .await;

    // Flatten every authentication failure into one indistinguishable
    // error; server-side errors pass through untouched.
    match result {
        Ok(client) => Ok(client),
        Err(err) if err.is_client_error() => {
            tracing::debug!(reason = %err, "client authentication failed");
            Err(AuthError::invalid_client("client authentication failed"))
        }
        Err(err) => Err(err),
    }
}

async fn resolve_and_authenticate<S: JtiStorage>(
    request: &TokenRequest,
    basic_auth: Option<(&str, &str)>,
    client_storage: &dyn ClientStorage,
    assertion_validator: &ClientAssertionValidator<S>,
    jwks_cache: &JwksCache,
) -> AuthResult<AuthenticatedClient> {
    if let Some((client_id, client_secret)) = basic_auth {
        return authenticate_with_secret(
            client_id,
            client_secret,
            client_storage,
            AuthMethod::ClientSecretBasic,
        )
        .await;
    }

    if let (Some(client_id), Some(client_secret)) = (&request.client_id, &request.client_secret) {
        return authenticate_with_secret(
            client_id,
            client_secret,
            client_storage,
            AuthMethod::ClientSecretPost,
        )
        .await;
    }

    if let Some(assertion) = &request.client_assertion {
        if request.client_assertion_type.as_deref() != Some(JWT_BEARER_ASSERTION_TYPE) {
            return Err(AuthError::invalid_client(
                "unsupported client_assertion_type",
            ));
        }
        return authenticate_private_key_jwt(
            assertion,
            client_storage,
            assertion_validator,
            jwks_cache,
        )
        .await;
    }

    if let Some(client_id) = &request.client_id {
        return authenticate_public(client_id, client_storage).await;
    }

    Err(AuthError::invalid_client("no client credentials presented"))
}

async fn authenticate_with_secret(
    client_id: &str,
    client_secret: &str,
    client_storage: &dyn ClientStorage,
    auth_method: AuthMethod,
) -> AuthResult<AuthenticatedClient> {
    let client = find_active_client(client_id, client_storage).await?;

    if !client.is_confidential() {
        return Err(AuthError::invalid_client(
            "public client presented a secret",
        ));
    }
    let expected = match auth_method {
        AuthMethod::ClientSecretBasic => TokenEndpointAuthMethod::ClientSecretBasic,
        _ => TokenEndpointAuthMethod::ClientSecretPost,
    };
    if client.token_endpoint_auth_method != expected {
        return Err(AuthError::invalid_client(
            "client is not registered for this auth method",
        ));
    }
    if client.client_secret_hash.is_none() {
        // Registration invariant broken: surface as a server fault.
        return Err(AuthError::configuration(format!(
            "confidential client {client_id} has no stored secret"
        )));
    }

    let verified = client_storage.verify_secret(client_id, client_secret).await?;
    if !verified {
        return Err(AuthError::invalid_client("secret verification failed"));
    }

    Ok(AuthenticatedClient {
        client,
        auth_method,
    })
}

async fn authenticate_private_key_jwt<S: JtiStorage>(
    assertion: &str,
    client_storage: &dyn ClientStorage,
    assertion_validator: &ClientAssertionValidator<S>,
    jwks_cache: &JwksCache,
) -> AuthResult<AuthenticatedClient> {
    let client_id = extract_client_id_unverified(assertion)?;
    let client = find_active_client(&client_id, client_storage).await?;

    if client.token_endpoint_auth_method != TokenEndpointAuthMethod::PrivateKeyJwt {
        return Err(AuthError::invalid_client(
            "client is not registered for private_key_jwt",
        ));
    }

    let kid = extract_key_id(assertion)?;
    let algorithm = extract_algorithm(assertion)?;

    let decoding_key = if let Some(jwks) = &client.jwks {
        get_decoding_key_from_inline(jwks, kid.as_deref(), algorithm)?
    } else if let Some(jwks_uri) = &client.jwks_uri {
        jwks_cache
            .get_decoding_key(&client_id, jwks_uri, kid.as_deref(), algorithm)
            .await?
    } else {
        return Err(AuthError::configuration(format!(
            "private_key_jwt client {client_id} has no registered keys"
        )));
    };

    assertion_validator
        .validate(assertion, &client_id, &decoding_key, algorithm)
        .await?;

    Ok(AuthenticatedClient {
        client,
        auth_method: AuthMethod::PrivateKeyJwt,
    })
}

async fn authenticate_public(
    client_id: &str,
    client_storage: &dyn ClientStorage,
) -> AuthResult<AuthenticatedClient> {
    let client = find_active_client(client_id, client_storage).await?;

    if client.client_type != ClientType::Public {
        return Err(AuthError::invalid_client(
            "confidential client presented no credentials",
        ));
    }

    Ok(AuthenticatedClient {
        client,
        auth_method: AuthMethod::None,
    })
}

async fn find_active_client(
    client_id: &str,
    client_storage: &dyn ClientStorage,
) -> AuthResult<Client> {
    let client = client_storage
        .find_by_id(client_id)
        .await?
        .ok_or_else(|| AuthError::invalid_client("unknown client"))?;
    if !client.active {
        return Err(AuthError::invalid_client("client is inactive"));
    }
    Ok(client)
}

/// Splits an HTTP Basic Authorization header into client credentials.
///
/// A non-Basic scheme yields `Ok(None)` and the caller may fall through
/// to the other authentication strategies. A Basic header that fails
/// base64 or `id:secret` decoding is malformed and rejected outright;
/// it must not silently fall through to body credentials.
pub fn parse_basic_auth(header: &str) -> AuthResult<Option<(String, String)>> {
    let Some(encoded) = header.trim().strip_prefix("Basic ") else {
        return Ok(None);
    };
    let malformed = || AuthError::invalid_client("malformed Basic authorization header");
    let decoded = STANDARD.decode(encoded.trim()).map_err(|_| malformed())?;
    let decoded = String::from_utf8(decoded).map_err(|_| malformed())?;
    let (client_id, client_secret) = decoded.split_once(':').ok_or_else(malformed)?;
    Ok(Some((client_id.to_string(), client_secret.to_string())))
}
