//! In-memory client storage.

use std::collections::HashMap;

use async_trait::async_trait;
use ferroauth::storage::ClientStorage;
use ferroauth::types::Client;
use ferroauth::AuthResult;
use tokio::sync::RwLock;

use crate::secret::verify_secret;

/// Client registrations held in a map keyed by client_id.
#[derive(Default)]
pub struct InMemoryClientStorage {
    clients: RwLock<HashMap<String, Client>>,
}

impl InMemoryClientStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStorage for InMemoryClientStorage {
    async fn find_by_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self.clients.read().await.get(client_id).cloned())
    }

    async fn save(&self, client: &Client) -> AuthResult<()> {
        self.clients
            .write()
            .await
            .insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool> {
        let clients = self.clients.read().await;
        let Some(hash) = clients
            .get(client_id)
            .and_then(|c| c.client_secret_hash.as_deref())
        else {
            return Ok(false);
        };
        Ok(verify_secret(secret, hash))
    }

    async fn delete(&self, client_id: &str) -> AuthResult<()> {
        self.clients.write().await.remove(client_id);
        Ok(())
    }
}
