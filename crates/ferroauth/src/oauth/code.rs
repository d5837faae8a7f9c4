//! Authorization code issuance and redemption.

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::crypto::{generate_token, hash_token};
use crate::error::AuthError;
use crate::oauth::pkce::{self, PkceChallenge, PkceChallengeMethod, PkceVerifier};
use crate::storage::AuthorizationCodeStorage;
use crate::types::{AuthorizationCode, Client};
use crate::AuthResult;

/// Parameters for issuing an authorization code.
#[derive(Debug, Clone)]
pub struct IssueCodeParams {
    /// The user who approved the authorization.
    pub user_id: Uuid,
    /// The redirect URI the code will be bound to.
    pub redirect_uri: String,
    /// Scopes granted at authorization time.
    pub scope: String,
    /// PKCE code challenge from the authorization request.
    pub code_challenge: Option<String>,
    /// PKCE challenge method from the authorization request.
    pub code_challenge_method: Option<String>,
    /// OIDC nonce to echo into the ID token.
    pub nonce: Option<String>,
}

/// Issues and redeems authorization codes.
pub struct CodeManager {
    code_storage: Arc<dyn AuthorizationCodeStorage>,
    code_lifetime: Duration,
}

impl CodeManager {
    /// Creates a manager with the given code lifetime.
    pub fn new(code_storage: Arc<dyn AuthorizationCodeStorage>, code_lifetime: Duration) -> Self {
        Self {
            code_storage,
            code_lifetime,
        }
    }

    /// Issues an authorization code for an approved request.
    ///
    /// Returns the raw code. Only its hash is stored; the raw value
    /// cannot be recovered afterwards.
    pub async fn issue(&self, client: &Client, params: IssueCodeParams) -> AuthResult<String> {
        if !client.is_redirect_uri_allowed(&params.redirect_uri) {
            return Err(AuthError::invalid_request(
                "redirect_uri is not registered for this client",
            ));
        }

        let method = match (&params.code_challenge, &params.code_challenge_method) {
            (Some(challenge), Some(method)) => {
                let method = PkceChallengeMethod::parse(method)
                    .map_err(|e| AuthError::invalid_request(e.to_string()))?;
                PkceChallenge::new(challenge.clone())
                    .map_err(|e| AuthError::invalid_request(e.to_string()))?;
                Some(method)
            }
            (Some(_), None) => {
                return Err(AuthError::invalid_request(
                    "code_challenge_method is required with code_challenge",
                ));
            }
            (None, _) => {
                if client.requires_pkce() {
                    return Err(AuthError::invalid_request(
                        "this client requires PKCE",
                    ));
                }
                None
            }
        };

        let raw_code = generate_token();
        let now = OffsetDateTime::now_utc();
        let record = AuthorizationCode {
            id: Uuid::new_v4(),
            code_hash: hash_token(&raw_code),
            user_id: params.user_id,
            client_id: client.client_id.clone(),
            redirect_uri: params.redirect_uri,
            scope: params.scope,
            code_challenge: params.code_challenge,
            code_challenge_method: method.map(|m| m.as_str().to_string()),
            nonce: params.nonce,
            created_at: now,
            expires_at: now + self.code_lifetime,
        };
        self.code_storage.store(&record).await?;

        tracing::debug!(
            client_id = %record.client_id,
            code_id = %record.id,
            "authorization code issued"
        );
        Ok(raw_code)
    }

    /// Redeems an authorization code for the token exchange.
    ///
    /// Consumes the code atomically before any other check, so a second
    /// redemption of the same code fails even when racing the first.
    /// An expired code is consumed and then rejected; it never becomes
    /// redeemable again.
    pub async fn redeem(
        &self,
        raw_code: &str,
        redirect_uri: &str,
        client: &Client,
        code_verifier: Option<&str>,
    ) -> AuthResult<AuthorizationCode> {
        let record = self
            .code_storage
            .consume(&hash_token(raw_code))
            .await
            .map_err(|e| match e {
                AuthError::InvalidGrant { .. } => e,
                other => {
                    tracing::error!(error = %other, "authorization code lookup failed");
                    AuthError::invalid_grant("Invalid authorization code")
                }
            })?;

        if record.is_expired() {
            return Err(AuthError::invalid_grant("Authorization code expired"));
        }
        if record.client_id != client.client_id {
            return Err(AuthError::invalid_grant(
                "Authorization code was issued to a different client",
            ));
        }
        if record.redirect_uri != redirect_uri {
            return Err(AuthError::invalid_grant("Redirect URI mismatch"));
        }

        self.verify_pkce(&record, client, code_verifier)?;
        Ok(record)
    }

    fn verify_pkce(
        &self,
        record: &AuthorizationCode,
        client: &Client,
        code_verifier: Option<&str>,
    ) -> AuthResult<()> {
        let Some(challenge) = &record.code_challenge else {
            if client.requires_pkce() {
                // Should have been rejected at issuance; never redeemable.
                return Err(AuthError::invalid_grant(
                    "Authorization code has no PKCE challenge",
                ));
            }
            return Ok(());
        };

        let Some(verifier) = code_verifier else {
            return Err(AuthError::invalid_grant("code_verifier is required"));
        };
        let verifier = PkceVerifier::new(verifier)
            .map_err(|e| AuthError::invalid_grant(e.to_string()))?;

        match record.code_challenge_method.as_deref() {
            Some("S256") | None => {
                let challenge = PkceChallenge::new(challenge.clone())
                    .map_err(|_| AuthError::PkceVerificationFailed)?;
                challenge
                    .verify(&verifier)
                    .map_err(|_| AuthError::PkceVerificationFailed)
            }
            Some("plain") => {
                pkce::verify_plain(challenge, &verifier)
                    .map_err(|_| AuthError::PkceVerificationFailed)
            }
            Some(other) => {
                tracing::error!(method = other, "unrecognized challenge method on stored code");
                Err(AuthError::PkceVerificationFailed)
            }
        }
    }
}
