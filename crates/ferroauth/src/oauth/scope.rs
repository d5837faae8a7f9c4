//! Scope parsing and negotiation.

use std::collections::HashSet;

use crate::error::AuthError;
use crate::types::Client;
use crate::AuthResult;

/// Splits a space-delimited scope string into its members.
///
/// Collapses repeated whitespace; preserves request order.
#[must_use]
pub fn parse_scope(scope: &str) -> Vec<&str> {
    scope.split_whitespace().collect()
}

/// Registry of scopes the server recognizes.
///
/// Scope strings are compared exactly; there is no hierarchy or
/// wildcard expansion.
#[derive(Debug, Clone, Default)]
pub struct ScopeRegistry {
    registered: Vec<String>,
}

impl ScopeRegistry {
    /// Creates a registry with the given scopes.
    #[must_use]
    pub fn new(scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            registered: scopes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if the scope is registered.
    #[must_use]
    pub fn is_registered(&self, scope: &str) -> bool {
        self.registered.iter().any(|s| s == scope)
    }

    /// Negotiates the effective scope for a new grant.
    ///
    /// An absent or empty request defaults to the client's full allowed
    /// set (or every registered scope when the client has no
    /// restriction). Otherwise the grant is the intersection of the
    /// request and the client's allowed set, deduplicated and emitted
    /// in registry order; a registered-but-disallowed member is
    /// intersected away. A member recognized by neither the registry
    /// nor the client's allowed set fails the whole request.
    pub fn negotiate(&self, requested: Option<&str>, client: &Client) -> AuthResult<String> {
        let requested = requested.map(str::trim).filter(|s| !s.is_empty());

        let Some(requested) = requested else {
            let granted = if client.allowed_scopes.is_empty() {
                self.registered.clone()
            } else {
                client.allowed_scopes.clone()
            };
            return Ok(granted.join(" "));
        };

        let requested = parse_scope(requested);
        for &scope in &requested {
            if !self.is_registered(scope)
                && !client.allowed_scopes.iter().any(|s| s.as_str() == scope)
            {
                return Err(AuthError::invalid_scope(format!("Unknown scope: {scope}")));
            }
        }

        let requested: HashSet<&str> = requested.into_iter().collect();
        let granted: Vec<&str> = self
            .registered
            .iter()
            .map(String::as_str)
            .filter(|s| requested.contains(s) && client.is_scope_allowed(s))
            .collect();
        Ok(granted.join(" "))
    }
}

/// Narrows an original grant's scope for a refresh request.
///
/// An absent request keeps the original scope. A present request must
/// be a subset of the original; anything broader is `invalid_scope`.
pub fn narrow_scope(original: &str, requested: Option<&str>) -> AuthResult<String> {
    let requested = requested.map(str::trim).filter(|s| !s.is_empty());
    let Some(requested) = requested else {
        return Ok(original.to_string());
    };

    let original_set: HashSet<&str> = parse_scope(original).into_iter().collect();
    for scope in parse_scope(requested) {
        if !original_set.contains(scope) {
            return Err(AuthError::invalid_scope(
                "Requested scope exceeds original grant",
            ));
        }
    }
    Ok(requested.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClientType, GrantType, TokenEndpointAuthMethod};
    use time::OffsetDateTime;

    fn client_with_scopes(scopes: &[&str]) -> Client {
        Client {
            client_id: "test-client".to_string(),
            client_secret_hash: Some("$argon2id$stub".to_string()),
            client_name: "Test Client".to_string(),
            client_type: ClientType::Confidential,
            token_endpoint_auth_method: TokenEndpointAuthMethod::ClientSecretBasic,
            redirect_uris: vec!["https://app.example.com/callback".to_string()],
            grant_types: vec![GrantType::AuthorizationCode],
            allowed_scopes: scopes.iter().map(ToString::to_string).collect(),
            pkce_required: None,
            jwks: None,
            jwks_uri: None,
            access_token_lifetime: None,
            refresh_token_lifetime: None,
            active: true,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    fn registry() -> ScopeRegistry {
        ScopeRegistry::new(["openid", "profile", "email", "api:read", "api:write"])
    }

    #[test]
    fn test_negotiate_explicit_request() {
        let client = client_with_scopes(&["openid", "profile", "email"]);
        let scope = registry()
            .negotiate(Some("openid profile"), &client)
            .unwrap();
        assert_eq!(scope, "openid profile");
    }

    #[test]
    fn test_empty_request_defaults_to_client_allowed_set() {
        let client = client_with_scopes(&["openid", "api:read"]);
        assert_eq!(
            registry().negotiate(None, &client).unwrap(),
            "openid api:read"
        );
        assert_eq!(
            registry().negotiate(Some("   "), &client).unwrap(),
            "openid api:read"
        );
    }

    #[test]
    fn test_empty_request_unrestricted_client_gets_all_registered() {
        let client = client_with_scopes(&[]);
        assert_eq!(
            registry().negotiate(None, &client).unwrap(),
            "openid profile email api:read api:write"
        );
    }

    #[test]
    fn test_unknown_scope_fails_whole_request() {
        let client = client_with_scopes(&[]);
        let err = registry()
            .negotiate(Some("openid bogus"), &client)
            .unwrap_err();
        assert_eq!(err.oauth_error_code(), "invalid_scope");
    }

    #[test]
    fn test_disallowed_registered_scope_is_intersected_away() {
        let client = client_with_scopes(&["openid"]);
        let scope = registry()
            .negotiate(Some("openid api:write"), &client)
            .unwrap();
        assert_eq!(scope, "openid");
    }

    #[test]
    fn test_duplicates_collapse_into_registry_order() {
        let client = client_with_scopes(&[]);
        let scope = registry()
            .negotiate(Some("profile openid profile"), &client)
            .unwrap();
        assert_eq!(scope, "openid profile");
    }

    #[test]
    fn test_request_order_does_not_leak_into_grant() {
        let client = client_with_scopes(&["openid", "profile", "api:read"]);
        let scope = registry()
            .negotiate(Some("api:read openid"), &client)
            .unwrap();
        assert_eq!(scope, "openid api:read");
    }

    #[test]
    fn test_client_allowed_but_unregistered_scope_does_not_fail() {
        // In the client's allowed set, so not unknown; absent from the
        // registry, so it has no canonical position and drops out.
        let client = client_with_scopes(&["openid", "custom:thing"]);
        let scope = registry()
            .negotiate(Some("custom:thing openid"), &client)
            .unwrap();
        assert_eq!(scope, "openid");
    }

    #[test]
    fn test_narrow_scope_subset() {
        assert_eq!(
            narrow_scope("openid profile email", Some("profile")).unwrap(),
            "profile"
        );
        assert_eq!(
            narrow_scope("openid profile", None).unwrap(),
            "openid profile"
        );
    }

    #[test]
    fn test_narrow_scope_rejects_widening() {
        let err = narrow_scope("openid", Some("openid email")).unwrap_err();
        assert_eq!(err.oauth_error_code(), "invalid_scope");
    }
}
