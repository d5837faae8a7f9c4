//! Shared test harness: a fully wired engine over the in-memory
//! backend, with seeded clients and a resource server.

// not every test binary uses every helper
#![allow(dead_code)]

use std::sync::Arc;

use ferroauth::audit::NullAuditSink;
use ferroauth::config::{AuthConfig, IssuerConfig};
use ferroauth::oauth::{
    ClientAssertionConfig, ClientAssertionValidator, CodeManager, IssueCodeParams, JwksCache,
    JwksCacheConfig, PkceChallenge, PkceVerifier, ScopeRegistry, TokenRequest,
};
use ferroauth::storage::{ClientStorage, ResourceServerStorage};
use ferroauth::token::{JwtService, SigningKeyPair, TokenConfig, TokenService};
use ferroauth::types::{Client, ClientType, GrantType, ResourceServer, TokenEndpointAuthMethod};
use ferroauth_memory::{
    hash_secret, InMemoryAccessTokenStorage, InMemoryAuthorizationCodeStorage,
    InMemoryClientStorage, InMemoryJtiStorage, InMemoryRefreshTokenStorage,
    InMemoryResourceServerStorage, InMemoryRevokedTokenStorage,
};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

pub const ISSUER: &str = "https://auth.example.com";
pub const TOKEN_ENDPOINT: &str = "https://auth.example.com/oauth/token";
pub const REDIRECT_URI: &str = "https://app.example.com/callback";
pub const CLIENT_SECRET: &str = "confidential-client-secret";
pub const RS_SECRET: &str = "resource-server-secret";

pub struct TestEngine {
    pub clients: Arc<InMemoryClientStorage>,
    pub resource_servers: Arc<InMemoryResourceServerStorage>,
    pub jti_storage: Arc<InMemoryJtiStorage>,
    pub code_manager: CodeManager,
    pub service: TokenService,
    pub jwks_cache: JwksCache,
    pub assertion_validator: ClientAssertionValidator<InMemoryJtiStorage>,
}

pub async fn engine() -> TestEngine {
    let config = AuthConfig {
        issuer: IssuerConfig {
            url: ISSUER.to_string(),
            token_endpoint: TOKEN_ENDPOINT.to_string(),
            audience: vec!["https://api.example.com".to_string()],
        },
        ..AuthConfig::default()
    };
    let code_lifetime = Duration::try_from(config.oauth.authorization_code_lifetime).unwrap();

    let clients = Arc::new(InMemoryClientStorage::new());
    let resource_servers = Arc::new(InMemoryResourceServerStorage::new());
    let jti_storage = Arc::new(InMemoryJtiStorage::new());
    let code_storage = Arc::new(InMemoryAuthorizationCodeStorage::new());

    let jwt_service = Arc::new(JwtService::new(
        SigningKeyPair::generate_rsa().unwrap(),
        &config.issuer.url,
    ));

    let service = TokenService::new(
        jwt_service,
        CodeManager::new(code_storage.clone(), code_lifetime),
        Arc::new(InMemoryAccessTokenStorage::new()),
        Arc::new(InMemoryRefreshTokenStorage::new()),
        Arc::new(InMemoryRevokedTokenStorage::new()),
        ScopeRegistry::new(["openid", "profile", "email", "api:read", "api:write"]),
        Arc::new(NullAuditSink),
        TokenConfig::from(&config),
    );

    clients.save(&confidential_client("web-app")).await.unwrap();
    clients.save(&public_client("spa-app")).await.unwrap();
    resource_servers
        .save(&ResourceServer {
            id: "api-gateway".to_string(),
            name: "API Gateway".to_string(),
            secret_hash: hash_secret(RS_SECRET).unwrap(),
            active: true,
            created_at: OffsetDateTime::now_utc(),
        })
        .await
        .unwrap();

    TestEngine {
        clients,
        resource_servers,
        jti_storage: jti_storage.clone(),
        code_manager: CodeManager::new(code_storage, code_lifetime),
        service,
        jwks_cache: JwksCache::new(JwksCacheConfig::from(&config.jwks)),
        assertion_validator: ClientAssertionValidator::new(
            ClientAssertionConfig::from(&config),
            jti_storage,
        ),
    }
}

pub fn confidential_client(client_id: &str) -> Client {
    Client {
        client_id: client_id.to_string(),
        client_secret_hash: Some(hash_secret(CLIENT_SECRET).unwrap()),
        client_name: format!("{client_id} (test)"),
        client_type: ClientType::Confidential,
        token_endpoint_auth_method: TokenEndpointAuthMethod::ClientSecretBasic,
        redirect_uris: vec![REDIRECT_URI.to_string()],
        grant_types: vec![
            GrantType::AuthorizationCode,
            GrantType::RefreshToken,
            GrantType::ClientCredentials,
        ],
        allowed_scopes: vec![],
        pkce_required: Some(true),
        jwks: None,
        jwks_uri: None,
        access_token_lifetime: None,
        refresh_token_lifetime: None,
        active: true,
        created_at: OffsetDateTime::now_utc(),
        updated_at: OffsetDateTime::now_utc(),
    }
}

pub fn public_client(client_id: &str) -> Client {
    let mut client = confidential_client(client_id);
    client.client_type = ClientType::Public;
    client.client_secret_hash = None;
    client.token_endpoint_auth_method = TokenEndpointAuthMethod::None;
    client.grant_types = vec![GrantType::AuthorizationCode, GrantType::RefreshToken];
    client
}

pub fn empty_token_request(grant_type: &str) -> TokenRequest {
    TokenRequest {
        grant_type: grant_type.to_string(),
        code: None,
        redirect_uri: None,
        code_verifier: None,
        client_id: None,
        client_secret: None,
        client_assertion_type: None,
        client_assertion: None,
        refresh_token: None,
        scope: None,
    }
}

/// Issues a code for the client and returns (raw code, verifier, user).
pub async fn authorize(
    engine: &TestEngine,
    client: &Client,
    scope: &str,
    nonce: Option<&str>,
) -> (String, PkceVerifier, Uuid) {
    let user_id = Uuid::new_v4();
    let verifier = PkceVerifier::generate();
    let challenge = PkceChallenge::from_verifier(&verifier);
    let code = engine
        .code_manager
        .issue(
            client,
            IssueCodeParams {
                user_id,
                redirect_uri: REDIRECT_URI.to_string(),
                scope: scope.to_string(),
                code_challenge: Some(challenge.as_str().to_string()),
                code_challenge_method: Some("S256".to_string()),
                nonce: nonce.map(ToString::to_string),
            },
        )
        .await
        .unwrap();
    (code, verifier, user_id)
}

/// Runs the full authorization code exchange, returning the response.
pub async fn authorize_and_exchange(
    engine: &TestEngine,
    client: &Client,
    scope: &str,
) -> ferroauth::oauth::TokenResponse {
    let (code, verifier, _) = authorize(engine, client, scope, None).await;
    let mut request = empty_token_request("authorization_code");
    request.code = Some(code);
    request.redirect_uri = Some(REDIRECT_URI.to_string());
    request.code_verifier = Some(verifier.as_str().to_string());
    engine.service.handle(&request, client).await.unwrap()
}
