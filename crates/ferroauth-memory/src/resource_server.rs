//! In-memory resource server storage.

use std::collections::HashMap;

use async_trait::async_trait;
use ferroauth::storage::ResourceServerStorage;
use ferroauth::types::ResourceServer;
use ferroauth::AuthResult;
use tokio::sync::RwLock;

use crate::secret::verify_secret;

/// Resource server registrations keyed by id.
#[derive(Default)]
pub struct InMemoryResourceServerStorage {
    servers: RwLock<HashMap<String, ResourceServer>>,
}

impl InMemoryResourceServerStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResourceServerStorage for InMemoryResourceServerStorage {
    async fn find_by_id(&self, id: &str) -> AuthResult<Option<ResourceServer>> {
        Ok(self.servers.read().await.get(id).cloned())
    }

    async fn save(&self, server: &ResourceServer) -> AuthResult<()> {
        self.servers
            .write()
            .await
            .insert(server.id.clone(), server.clone());
        Ok(())
    }

    async fn verify_secret(&self, id: &str, secret: &str) -> AuthResult<bool> {
        let servers = self.servers.read().await;
        let Some(server) = servers.get(id) else {
            return Ok(false);
        };
        Ok(verify_secret(secret, &server.secret_hash))
    }
}
