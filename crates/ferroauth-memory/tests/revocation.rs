//! RFC 7009 revocation semantics.

mod common;

use common::*;
use ferroauth::token::{IntrospectionRequest, RevocationRequest, TokenTypeHint};

#[tokio::test]
async fn revocation_succeeds_for_every_well_formed_request() {
    let engine = engine().await;
    let client = confidential_client("web-app");
    let response = authorize_and_exchange(&engine, &client, "openid").await;

    // valid own access token
    engine
        .service
        .revoke(
            &RevocationRequest {
                token: response.access_token.clone(),
                token_type_hint: Some(TokenTypeHint::AccessToken),
            },
            &client,
        )
        .await
        .unwrap();

    // the same token again (already revoked)
    engine
        .service
        .revoke(
            &RevocationRequest {
                token: response.access_token,
                token_type_hint: Some(TokenTypeHint::AccessToken),
            },
            &client,
        )
        .await
        .unwrap();

    // a token the server has never seen
    engine
        .service
        .revoke(
            &RevocationRequest {
                token: "never-issued".to_string(),
                token_type_hint: None,
            },
            &client,
        )
        .await
        .unwrap();

    // another client's token
    let other = confidential_client("other-app");
    engine
        .service
        .revoke(
            &RevocationRequest {
                token: response.refresh_token.unwrap(),
                token_type_hint: Some(TokenTypeHint::RefreshToken),
            },
            &other,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn empty_token_is_invalid_request() {
    let engine = engine().await;
    let client = confidential_client("web-app");
    let err = engine
        .service
        .revoke(
            &RevocationRequest {
                token: String::new(),
                token_type_hint: None,
            },
            &client,
        )
        .await
        .unwrap_err();
    assert_eq!(err.oauth_error_code(), "invalid_request");
}

#[tokio::test]
async fn cross_client_revocation_is_a_noop() {
    let engine = engine().await;
    let client = confidential_client("web-app");
    let response = authorize_and_exchange(&engine, &client, "openid").await;

    let other = confidential_client("other-app");
    engine
        .service
        .revoke(
            &RevocationRequest {
                token: response.access_token.clone(),
                token_type_hint: None,
            },
            &other,
        )
        .await
        .unwrap();

    // the token still works
    let introspected = engine
        .service
        .introspect(&IntrospectionRequest {
            token: response.access_token,
            token_type_hint: None,
        })
        .await
        .unwrap();
    assert!(introspected.active);
}

#[tokio::test]
async fn revoking_refresh_token_cascades_to_access_tokens() {
    let engine = engine().await;
    let client = confidential_client("web-app");
    let response = authorize_and_exchange(&engine, &client, "openid profile").await;

    engine
        .service
        .revoke(
            &RevocationRequest {
                token: response.refresh_token.clone().unwrap(),
                token_type_hint: Some(TokenTypeHint::RefreshToken),
            },
            &client,
        )
        .await
        .unwrap();

    // the refresh token is dead
    let mut request = empty_token_request("refresh_token");
    request.refresh_token = response.refresh_token;
    let err = engine.service.handle(&request, &client).await.unwrap_err();
    assert_eq!(err.oauth_error_code(), "invalid_grant");

    // and so is the access token issued alongside it
    let introspected = engine
        .service
        .introspect(&IntrospectionRequest {
            token: response.access_token,
            token_type_hint: None,
        })
        .await
        .unwrap();
    assert!(!introspected.active);
}

#[tokio::test]
async fn revoking_access_token_leaves_refresh_token_alive() {
    let engine = engine().await;
    let client = confidential_client("web-app");
    let response = authorize_and_exchange(&engine, &client, "openid").await;

    engine
        .service
        .revoke(
            &RevocationRequest {
                token: response.access_token,
                token_type_hint: Some(TokenTypeHint::AccessToken),
            },
            &client,
        )
        .await
        .unwrap();

    let mut request = empty_token_request("refresh_token");
    request.refresh_token = response.refresh_token;
    let refreshed = engine.service.handle(&request, &client).await.unwrap();
    assert!(refreshed.refresh_token.is_some());
}

#[tokio::test]
async fn hint_is_authoritative() {
    let engine = engine().await;
    let client = confidential_client("web-app");
    let response = authorize_and_exchange(&engine, &client, "openid").await;
    let refresh_token = response.refresh_token.unwrap();

    // refresh token presented with an access_token hint: no-op
    engine
        .service
        .revoke(
            &RevocationRequest {
                token: refresh_token.clone(),
                token_type_hint: Some(TokenTypeHint::AccessToken),
            },
            &client,
        )
        .await
        .unwrap();

    let mut request = empty_token_request("refresh_token");
    request.refresh_token = Some(refresh_token);
    let refreshed = engine.service.handle(&request, &client).await.unwrap();
    assert!(refreshed.refresh_token.is_some());
}

#[tokio::test]
async fn hintless_revocation_finds_refresh_tokens() {
    let engine = engine().await;
    let client = confidential_client("web-app");
    let response = authorize_and_exchange(&engine, &client, "openid").await;
    let refresh_token = response.refresh_token.unwrap();

    engine
        .service
        .revoke(
            &RevocationRequest {
                token: refresh_token.clone(),
                token_type_hint: None,
            },
            &client,
        )
        .await
        .unwrap();

    let mut request = empty_token_request("refresh_token");
    request.refresh_token = Some(refresh_token);
    let err = engine.service.handle(&request, &client).await.unwrap_err();
    assert_eq!(err.oauth_error_code(), "invalid_grant");
}
