//! Token issuance, refresh, revocation, and introspection.

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::audit::{AuditAction, AuditEvent, AuditSink};
use crate::config::AuthConfig;
use crate::crypto::{generate_token, hash_token};
use crate::error::AuthError;
use crate::oauth::code::CodeManager;
use crate::oauth::request::{TokenRequest, TokenResponse};
use crate::oauth::scope::{ScopeRegistry, narrow_scope};
use crate::storage::{
    AccessTokenStorage, RefreshTokenStorage, RevokedTokenStorage, RevokedTokenType,
};
use crate::token::introspection::{IntrospectionRequest, IntrospectionResponse};
use crate::token::jwt::{AccessTokenClaims, IdTokenClaims, JwtService, access_token_claims};
use crate::token::revocation::{RevocationRequest, TokenTypeHint};
use crate::types::{AccessTokenRecord, Client, GrantType, RefreshToken};
use crate::AuthResult;

/// Token issuance configuration.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Audience claim for issued access tokens.
    pub audience: Vec<String>,

    /// Default access token lifetime in seconds.
    pub access_token_lifetime: i64,

    /// Default refresh token lifetime in seconds.
    pub refresh_token_lifetime: i64,

    /// ID token lifetime in seconds.
    pub id_token_lifetime: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            audience: Vec::new(),
            access_token_lifetime: 3600,
            refresh_token_lifetime: 30 * 24 * 3600,
            id_token_lifetime: 300,
        }
    }
}

impl TokenConfig {
    /// Sets the audience.
    #[must_use]
    pub fn with_audience(mut self, audience: Vec<String>) -> Self {
        self.audience = audience;
        self
    }

    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_access_token_lifetime(mut self, seconds: i64) -> Self {
        self.access_token_lifetime = seconds;
        self
    }

    /// Sets the refresh token lifetime.
    #[must_use]
    pub fn with_refresh_token_lifetime(mut self, seconds: i64) -> Self {
        self.refresh_token_lifetime = seconds;
        self
    }
}

impl From<&AuthConfig> for TokenConfig {
    fn from(config: &AuthConfig) -> Self {
        let secs = |d: std::time::Duration| i64::try_from(d.as_secs()).unwrap_or(i64::MAX);
        Self {
            audience: config.issuer.audience.clone(),
            access_token_lifetime: secs(config.oauth.access_token_lifetime),
            refresh_token_lifetime: secs(config.oauth.refresh_token_lifetime),
            id_token_lifetime: secs(config.oauth.id_token_lifetime),
        }
    }
}

/// The token engine: executes grants and manages token lifecycle.
pub struct TokenService {
    jwt_service: Arc<JwtService>,
    code_manager: CodeManager,
    access_tokens: Arc<dyn AccessTokenStorage>,
    refresh_tokens: Arc<dyn RefreshTokenStorage>,
    revoked_tokens: Arc<dyn RevokedTokenStorage>,
    scopes: ScopeRegistry,
    audit: Arc<dyn AuditSink>,
    config: TokenConfig,
}

impl TokenService {
    /// Creates a token service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        jwt_service: Arc<JwtService>,
        code_manager: CodeManager,
        access_tokens: Arc<dyn AccessTokenStorage>,
        refresh_tokens: Arc<dyn RefreshTokenStorage>,
        revoked_tokens: Arc<dyn RevokedTokenStorage>,
        scopes: ScopeRegistry,
        audit: Arc<dyn AuditSink>,
        config: TokenConfig,
    ) -> Self {
        Self {
            jwt_service,
            code_manager,
            access_tokens,
            refresh_tokens,
            revoked_tokens,
            scopes,
            audit,
            config,
        }
    }

    /// Executes a token request for an already-authenticated client.
    ///
    /// Dispatches on `grant_type` and checks the client is registered
    /// for it before touching any grant state.
    pub async fn handle(&self, request: &TokenRequest, client: &Client) -> AuthResult<TokenResponse> {
        let grant_type = match request.grant_type.as_str() {
            "authorization_code" => GrantType::AuthorizationCode,
            "client_credentials" => GrantType::ClientCredentials,
            "refresh_token" => GrantType::RefreshToken,
            other => return Err(AuthError::unsupported_grant_type(other)),
        };
        if !client.is_grant_type_allowed(&grant_type) {
            return Err(AuthError::unauthorized_client(format!(
                "client is not registered for the {} grant",
                grant_type.as_str()
            )));
        }

        match grant_type {
            GrantType::AuthorizationCode => self.exchange_code(request, client).await,
            GrantType::ClientCredentials => self.client_credentials(request, client).await,
            GrantType::RefreshToken => self.refresh(request, client).await,
        }
    }

    /// Exchanges an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        let code = request
            .code
            .as_deref()
            .ok_or_else(|| AuthError::invalid_request("code parameter is required"))?;
        let redirect_uri = request
            .redirect_uri
            .as_deref()
            .ok_or_else(|| AuthError::invalid_request("redirect_uri parameter is required"))?;

        let record = self
            .code_manager
            .redeem(code, redirect_uri, client, request.code_verifier.as_deref())
            .await?;

        let (access_token, claims) =
            self.issue_access_token(client, &record.scope, Some(record.user_id))?;
        self.store_access_record(&claims, Some(record.user_id)).await?;

        let mut response = TokenResponse::new(
            access_token,
            (claims.exp - claims.iat) as u64,
            record.scope.clone(),
        );

        if client.is_grant_type_allowed(&GrantType::RefreshToken) {
            let raw = self
                .issue_refresh_token(client, record.user_id, &record.scope, None, None)
                .await?;
            response = response.with_refresh_token(raw);
        }

        if record.scope.split_whitespace().any(|s| s == "openid") {
            let id_token = self.issue_id_token(client, record.user_id, record.nonce.clone())?;
            response = response.with_id_token(id_token);
        }

        self.audit
            .record(
                AuditEvent::new(AuditAction::TokenIssued)
                    .with_client(&client.client_id)
                    .with_user(record.user_id)
                    .with_detail("authorization_code"),
            )
            .await;
        Ok(response)
    }

    /// Executes the client_credentials grant.
    ///
    /// Issues a single access token with the client itself as subject.
    /// No refresh token and no ID token, ever.
    pub async fn client_credentials(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        let scope = self.scopes.negotiate(request.scope.as_deref(), client)?;

        let (access_token, claims) = self.issue_access_token(client, &scope, None)?;
        self.store_access_record(&claims, None).await?;

        self.audit
            .record(
                AuditEvent::new(AuditAction::TokenIssued)
                    .with_client(&client.client_id)
                    .with_detail("client_credentials"),
            )
            .await;
        Ok(TokenResponse::new(
            access_token,
            (claims.exp - claims.iat) as u64,
            scope,
        ))
    }

    /// Executes the refresh_token grant with rotation.
    ///
    /// The presented token is retired atomically and replaced by a new
    /// one linked through `previous_token_id`. Presenting an
    /// already-retired token is treated as theft evidence: the whole
    /// rotation chain and its access tokens are revoked before the
    /// request is rejected.
    pub async fn refresh(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        let raw = request
            .refresh_token
            .as_deref()
            .ok_or_else(|| AuthError::invalid_request("refresh_token parameter is required"))?;

        let token_hash = hash_token(raw);
        let token = self
            .refresh_tokens
            .find_by_hash(&token_hash)
            .await?
            .filter(|t| t.client_id == client.client_id)
            .ok_or_else(|| AuthError::invalid_grant("Invalid refresh token"))?;

        if token.is_revoked() {
            self.revoke_compromised_chain(&token).await?;
            return Err(AuthError::invalid_grant("Invalid refresh token"));
        }
        if token.is_expired() {
            return Err(AuthError::invalid_grant("Refresh token expired"));
        }

        let scope = narrow_scope(&token.scope, request.scope.as_deref())?;

        // Atomic check-and-set; losing a rotation race means someone
        // else just used this token, which is the replay case.
        let was_active = self.refresh_tokens.revoke(&token_hash).await?;
        if !was_active {
            self.revoke_compromised_chain(&token).await?;
            return Err(AuthError::invalid_grant("Invalid refresh token"));
        }

        let new_raw = self
            .issue_refresh_token(
                client,
                token.user_id,
                &token.scope,
                Some(token.id),
                Some(token.expires_at),
            )
            .await?;

        let (access_token, claims) =
            self.issue_access_token(client, &scope, Some(token.user_id))?;
        self.store_access_record(&claims, Some(token.user_id)).await?;

        self.audit
            .record(
                AuditEvent::new(AuditAction::TokenRefreshed)
                    .with_client(&client.client_id)
                    .with_user(token.user_id),
            )
            .await;
        Ok(
            TokenResponse::new(access_token, (claims.exp - claims.iat) as u64, scope)
                .with_refresh_token(new_raw),
        )
    }

    /// Revokes a token per RFC 7009.
    ///
    /// Succeeds for every well-formed request from an authenticated
    /// client: unknown tokens, foreign clients' tokens, and
    /// already-revoked tokens are silent no-ops. When a hint is given
    /// it is authoritative; no fallback to the other token kind.
    pub async fn revoke(&self, request: &RevocationRequest, client: &Client) -> AuthResult<()> {
        if request.token.is_empty() {
            return Err(AuthError::invalid_request("token parameter is required"));
        }

        let revoked = match request.token_type_hint {
            Some(TokenTypeHint::AccessToken) => {
                self.revoke_access_token(&request.token, client).await?
            }
            Some(TokenTypeHint::RefreshToken) => {
                self.revoke_refresh_token(&request.token, client).await?
            }
            None => {
                self.revoke_access_token(&request.token, client).await?
                    || self.revoke_refresh_token(&request.token, client).await?
            }
        };

        if revoked {
            self.audit
                .record(AuditEvent::new(AuditAction::TokenRevoked).with_client(&client.client_id))
                .await;
        }
        Ok(())
    }

    /// Introspects a token per RFC 7662.
    ///
    /// Any token that cannot be positively verified as active comes
    /// back as `{"active": false}` with nothing else.
    pub async fn introspect(
        &self,
        request: &IntrospectionRequest,
    ) -> AuthResult<IntrospectionResponse> {
        if request.token.is_empty() {
            return Err(AuthError::invalid_request("token parameter is required"));
        }

        let response = match request.token_type_hint {
            Some(TokenTypeHint::RefreshToken) => self.introspect_refresh(&request.token).await?,
            _ => self.introspect_access(&request.token).await?,
        };

        self.audit
            .record(
                AuditEvent::new(AuditAction::TokenIntrospected)
                    .with_detail(if response.active { "active" } else { "inactive" }),
            )
            .await;
        Ok(response)
    }

    /// Returns the published JWKS document for this service's keys.
    #[must_use]
    pub fn jwks(&self) -> crate::token::jwt::Jwks {
        self.jwt_service.jwks()
    }

    // ====== Issuance helpers ======

    fn issue_access_token(
        &self,
        client: &Client,
        scope: &str,
        user_id: Option<Uuid>,
    ) -> AuthResult<(String, AccessTokenClaims)> {
        let lifetime = client
            .access_token_lifetime
            .unwrap_or(self.config.access_token_lifetime);
        let subject = match user_id {
            Some(user_id) => user_id.to_string(),
            None => client.client_id.clone(),
        };
        let claims = access_token_claims(
            self.jwt_service.issuer(),
            &subject,
            self.config.audience.clone(),
            &client.client_id,
            scope,
            lifetime,
        );
        let token = self
            .jwt_service
            .encode(&claims)
            .map_err(|e| AuthError::internal(format!("token signing failed: {e}")))?;
        Ok((token, claims))
    }

    async fn store_access_record(
        &self,
        claims: &AccessTokenClaims,
        user_id: Option<Uuid>,
    ) -> AuthResult<()> {
        let issued_at = OffsetDateTime::from_unix_timestamp(claims.iat)
            .map_err(|e| AuthError::internal(format!("invalid iat: {e}")))?;
        let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp)
            .map_err(|e| AuthError::internal(format!("invalid exp: {e}")))?;
        self.access_tokens
            .store(&AccessTokenRecord {
                jti: claims.jti.clone(),
                user_id,
                client_id: claims.client_id.clone(),
                scope: claims.scope.clone(),
                issued_at,
                expires_at,
                revoked_at: None,
            })
            .await
    }

    async fn issue_refresh_token(
        &self,
        client: &Client,
        user_id: Uuid,
        scope: &str,
        previous_token_id: Option<Uuid>,
        inherit_expiry: Option<OffsetDateTime>,
    ) -> AuthResult<String> {
        let raw = generate_token();
        let now = OffsetDateTime::now_utc();
        let lifetime = client
            .refresh_token_lifetime
            .unwrap_or(self.config.refresh_token_lifetime);
        // Rotation keeps the original grant's expiry window.
        let expires_at = inherit_expiry.unwrap_or(now + Duration::seconds(lifetime));

        self.refresh_tokens
            .create(&RefreshToken {
                id: Uuid::new_v4(),
                token_hash: hash_token(&raw),
                user_id,
                client_id: client.client_id.clone(),
                scope: scope.to_string(),
                created_at: now,
                expires_at,
                revoked_at: None,
                previous_token_id,
            })
            .await?;
        Ok(raw)
    }

    fn issue_id_token(
        &self,
        client: &Client,
        user_id: Uuid,
        nonce: Option<String>,
    ) -> AuthResult<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = IdTokenClaims {
            iss: self.jwt_service.issuer().to_string(),
            sub: user_id.to_string(),
            aud: client.client_id.clone(),
            exp: now + self.config.id_token_lifetime,
            iat: now,
            nonce,
        };
        self.jwt_service
            .encode(&claims)
            .map_err(|e| AuthError::internal(format!("ID token signing failed: {e}")))
    }

    // ====== Revocation helpers ======

    async fn revoke_compromised_chain(&self, token: &RefreshToken) -> AuthResult<()> {
        tracing::warn!(
            client_id = %token.client_id,
            token_id = %token.id,
            "retired refresh token replayed, revoking rotation chain"
        );
        let chain = self.refresh_tokens.revoke_chain(token.id).await?;
        for member in &chain {
            self.revoked_tokens
                .revoke(
                    &member.id.to_string(),
                    RevokedTokenType::Refresh,
                    member.expires_at,
                )
                .await?;
        }
        let access = self
            .access_tokens
            .revoke_by_grant(&token.client_id, Some(token.user_id))
            .await?;
        for record in &access {
            self.revoked_tokens
                .revoke(&record.jti, RevokedTokenType::Access, record.expires_at)
                .await?;
        }
        self.audit
            .record(
                AuditEvent::new(AuditAction::ReplayDetected)
                    .with_client(&token.client_id)
                    .with_user(token.user_id)
                    .with_detail(format!(
                        "revoked {} refresh and {} access tokens",
                        chain.len(),
                        access.len()
                    ))
                    .failed(),
            )
            .await;
        Ok(())
    }

    async fn revoke_access_token(&self, token: &str, client: &Client) -> AuthResult<bool> {
        // Signature is still checked; only expiry is waived so an
        // expired token can be revoked idempotently.
        let Ok(claims) = self.jwt_service.decode_allow_expired::<AccessTokenClaims>(token) else {
            return Ok(false);
        };
        let Some(record) = self.access_tokens.find_by_jti(&claims.jti).await? else {
            return Ok(false);
        };
        if record.client_id != client.client_id {
            // Cross-client revocation is a silent no-op.
            return Ok(false);
        }
        if record.is_revoked() {
            return Ok(false);
        }

        self.access_tokens.revoke(&record.jti).await?;
        self.revoked_tokens
            .revoke(&record.jti, RevokedTokenType::Access, record.expires_at)
            .await?;
        Ok(true)
    }

    async fn revoke_refresh_token(&self, token: &str, client: &Client) -> AuthResult<bool> {
        let token_hash = hash_token(token);
        let Some(record) = self.refresh_tokens.find_by_hash(&token_hash).await? else {
            return Ok(false);
        };
        if record.client_id != client.client_id {
            return Ok(false);
        }

        let was_active = self.refresh_tokens.revoke(&token_hash).await?;
        if !was_active {
            return Ok(false);
        }
        self.revoked_tokens
            .revoke(
                &record.id.to_string(),
                RevokedTokenType::Refresh,
                record.expires_at,
            )
            .await?;

        // Revoking a refresh token cascades to the access tokens of
        // the same grant.
        let access = self
            .access_tokens
            .revoke_by_grant(&record.client_id, Some(record.user_id))
            .await?;
        for access_record in &access {
            self.revoked_tokens
                .revoke(
                    &access_record.jti,
                    RevokedTokenType::Access,
                    access_record.expires_at,
                )
                .await?;
        }
        Ok(true)
    }

    // ====== Introspection helpers ======

    async fn introspect_access(&self, token: &str) -> AuthResult<IntrospectionResponse> {
        // Verify first: signature, expiry, issuer.
        let Ok(claims) = self.jwt_service.decode::<AccessTokenClaims>(token) else {
            return Ok(IntrospectionResponse::inactive());
        };
        // Blacklist overrides a valid signature.
        if self.revoked_tokens.is_revoked(&claims.jti).await? {
            return Ok(IntrospectionResponse::inactive());
        }
        // Cross-check server-side state; a token with no record is not
        // one of ours anymore.
        let Some(record) = self.access_tokens.find_by_jti(&claims.jti).await? else {
            return Ok(IntrospectionResponse::inactive());
        };
        if !record.is_active() {
            return Ok(IntrospectionResponse::inactive());
        }

        let mut response = IntrospectionResponse::active()
            .with_scope(claims.scope)
            .with_client_id(claims.client_id)
            .with_sub(claims.sub)
            .with_token_type("Bearer")
            .with_times(claims.iat, claims.exp);
        response.iss = Some(claims.iss);
        response.aud = Some(claims.aud);
        response.jti = Some(claims.jti);
        Ok(response)
    }

    async fn introspect_refresh(&self, token: &str) -> AuthResult<IntrospectionResponse> {
        let Some(record) = self.refresh_tokens.find_by_hash(&hash_token(token)).await? else {
            return Ok(IntrospectionResponse::inactive());
        };
        if !record.is_valid() || self.revoked_tokens.is_revoked(&record.id.to_string()).await? {
            return Ok(IntrospectionResponse::inactive());
        }

        Ok(IntrospectionResponse::active()
            .with_scope(record.scope)
            .with_client_id(record.client_id)
            .with_sub(record.user_id.to_string())
            .with_token_type("refresh_token")
            .with_times(
                record.created_at.unix_timestamp(),
                record.expires_at.unix_timestamp(),
            ))
    }
}
