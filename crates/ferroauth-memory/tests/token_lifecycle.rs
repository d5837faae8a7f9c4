//! End-to-end grant lifecycle over the in-memory backend: code
//! exchange, refresh rotation, and replay hardening.

mod common;

use common::*;
use ferroauth::token::IntrospectionRequest;

#[tokio::test]
async fn authorization_code_exchange_yields_full_response() {
    let engine = engine().await;
    let client = confidential_client("web-app");
    let (code, verifier, _) = authorize(&engine, &client, "openid profile", Some("n-0S6_WzA2Mj")).await;

    let mut request = empty_token_request("authorization_code");
    request.code = Some(code);
    request.redirect_uri = Some(REDIRECT_URI.to_string());
    request.code_verifier = Some(verifier.as_str().to_string());

    let response = engine.service.handle(&request, &client).await.unwrap();
    assert_eq!(response.token_type, "Bearer");
    assert_eq!(response.scope, "openid profile");
    assert!(response.refresh_token.is_some());
    assert!(response.id_token.is_some());
    // access token is a compact JWT
    assert_eq!(response.access_token.split('.').count(), 3);
}

#[tokio::test]
async fn code_cannot_be_redeemed_twice() {
    let engine = engine().await;
    let client = confidential_client("web-app");
    let (code, verifier, _) = authorize(&engine, &client, "openid", None).await;

    let mut request = empty_token_request("authorization_code");
    request.code = Some(code);
    request.redirect_uri = Some(REDIRECT_URI.to_string());
    request.code_verifier = Some(verifier.as_str().to_string());

    engine.service.handle(&request, &client).await.unwrap();
    let err = engine.service.handle(&request, &client).await.unwrap_err();
    assert_eq!(err.oauth_error_code(), "invalid_grant");
}

#[tokio::test]
async fn pkce_mismatch_rejects_exchange() {
    let engine = engine().await;
    let client = confidential_client("web-app");
    let (code, _, _) = authorize(&engine, &client, "openid", None).await;

    let mut request = empty_token_request("authorization_code");
    request.code = Some(code);
    request.redirect_uri = Some(REDIRECT_URI.to_string());
    request.code_verifier = Some(
        ferroauth::oauth::PkceVerifier::generate()
            .as_str()
            .to_string(),
    );

    let err = engine.service.handle(&request, &client).await.unwrap_err();
    assert_eq!(err.oauth_error_code(), "invalid_grant");
}

#[tokio::test]
async fn refresh_rotation_links_and_retires() {
    let engine = engine().await;
    let client = confidential_client("web-app");
    let first = authorize_and_exchange(&engine, &client, "openid profile").await;
    let old_refresh = first.refresh_token.unwrap();

    let mut request = empty_token_request("refresh_token");
    request.refresh_token = Some(old_refresh.clone());
    let second = engine.service.handle(&request, &client).await.unwrap();
    let new_refresh = second.refresh_token.unwrap();
    assert_ne!(old_refresh, new_refresh);

    // old token is spent
    let err = engine.service.handle(&request, &client).await.unwrap_err();
    assert_eq!(err.oauth_error_code(), "invalid_grant");
}

#[tokio::test]
async fn replayed_refresh_token_kills_the_whole_chain() {
    let engine = engine().await;
    let client = confidential_client("web-app");
    let first = authorize_and_exchange(&engine, &client, "openid profile").await;
    let gen1 = first.refresh_token.unwrap();

    // rotate twice: gen1 -> gen2 -> gen3
    let mut request = empty_token_request("refresh_token");
    request.refresh_token = Some(gen1.clone());
    let second = engine.service.handle(&request, &client).await.unwrap();
    let gen2 = second.refresh_token.unwrap();

    request.refresh_token = Some(gen2);
    let third = engine.service.handle(&request, &client).await.unwrap();
    let gen3 = third.refresh_token.unwrap();

    // replay the oldest token
    request.refresh_token = Some(gen1);
    let err = engine.service.handle(&request, &client).await.unwrap_err();
    assert_eq!(err.oauth_error_code(), "invalid_grant");

    // the newest token in the chain is dead too
    request.refresh_token = Some(gen3);
    let err = engine.service.handle(&request, &client).await.unwrap_err();
    assert_eq!(err.oauth_error_code(), "invalid_grant");

    // and the latest access token no longer introspects active
    let introspected = engine
        .service
        .introspect(&IntrospectionRequest {
            token: third.access_token,
            token_type_hint: None,
        })
        .await
        .unwrap();
    assert!(!introspected.active);
}

#[tokio::test]
async fn refresh_scope_can_narrow_but_not_widen() {
    let engine = engine().await;
    let client = confidential_client("web-app");
    let first = authorize_and_exchange(&engine, &client, "openid profile email").await;

    let mut request = empty_token_request("refresh_token");
    request.refresh_token = first.refresh_token;
    request.scope = Some("openid profile".to_string());
    let narrowed = engine.service.handle(&request, &client).await.unwrap();
    assert_eq!(narrowed.scope, "openid profile");

    // narrowing does not shrink the grant itself: the next rotation
    // can still ask for anything from the original set
    let mut request = empty_token_request("refresh_token");
    request.refresh_token = narrowed.refresh_token;
    request.scope = Some("email".to_string());
    let response = engine.service.handle(&request, &client).await.unwrap();
    assert_eq!(response.scope, "email");

    let mut request = empty_token_request("refresh_token");
    request.refresh_token = response.refresh_token;
    request.scope = Some("email api:write".to_string());
    let err = engine.service.handle(&request, &client).await.unwrap_err();
    assert_eq!(err.oauth_error_code(), "invalid_scope");
}

#[tokio::test]
async fn wrong_client_cannot_use_anothers_refresh_token() {
    let engine = engine().await;
    let client = confidential_client("web-app");
    let response = authorize_and_exchange(&engine, &client, "openid").await;

    let other = confidential_client("other-app");
    let mut request = empty_token_request("refresh_token");
    request.refresh_token = response.refresh_token;
    let err = engine.service.handle(&request, &other).await.unwrap_err();
    assert_eq!(err.oauth_error_code(), "invalid_grant");
}

#[tokio::test]
async fn client_credentials_issues_bare_access_token() {
    let engine = engine().await;
    let client = confidential_client("web-app");

    let mut request = empty_token_request("client_credentials");
    request.scope = Some("api:read".to_string());
    let response = engine.service.handle(&request, &client).await.unwrap();
    assert_eq!(response.scope, "api:read");
    assert!(response.refresh_token.is_none());
    assert!(response.id_token.is_none());

    // subject is the client itself
    let introspected = engine
        .service
        .introspect(&IntrospectionRequest {
            token: response.access_token,
            token_type_hint: None,
        })
        .await
        .unwrap();
    assert!(introspected.active);
    assert_eq!(introspected.sub.as_deref(), Some("web-app"));
}

#[tokio::test]
async fn empty_scope_defaults_to_full_allowed_set() {
    let engine = engine().await;
    let client = confidential_client("web-app");

    let request = empty_token_request("client_credentials");
    let response = engine.service.handle(&request, &client).await.unwrap();
    // unrestricted client gets every registered scope
    assert_eq!(response.scope, "openid profile email api:read api:write");
}

#[tokio::test]
async fn public_client_cannot_use_client_credentials() {
    let engine = engine().await;
    let client = public_client("spa-app");

    let request = empty_token_request("client_credentials");
    let err = engine.service.handle(&request, &client).await.unwrap_err();
    assert_eq!(err.oauth_error_code(), "unauthorized_client");
}
