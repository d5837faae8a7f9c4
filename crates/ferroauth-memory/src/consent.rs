//! In-memory user consent storage.

use std::collections::HashMap;

use async_trait::async_trait;
use ferroauth::storage::ConsentStorage;
use ferroauth::types::UserConsent;
use ferroauth::AuthResult;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Consent records keyed by (user, client).
#[derive(Default)]
pub struct InMemoryConsentStorage {
    consents: RwLock<HashMap<(Uuid, String), UserConsent>>,
}

impl InMemoryConsentStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConsentStorage for InMemoryConsentStorage {
    async fn save(&self, consent: &UserConsent) -> AuthResult<()> {
        self.consents
            .write()
            .await
            .insert((consent.user_id, consent.client_id.clone()), consent.clone());
        Ok(())
    }

    async fn find(&self, user_id: Uuid, client_id: &str) -> AuthResult<Option<UserConsent>> {
        Ok(self
            .consents
            .read()
            .await
            .get(&(user_id, client_id.to_string()))
            .cloned())
    }

    async fn revoke(&self, user_id: Uuid, client_id: &str) -> AuthResult<()> {
        self.consents
            .write()
            .await
            .remove(&(user_id, client_id.to_string()));
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> AuthResult<Vec<UserConsent>> {
        Ok(self
            .consents
            .read()
            .await
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }
}
