use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::IdentityRegistry;
use crate::models::{IdentityModel, RepositoryError};

#[derive(Debug, Default)]
pub struct InMemoryIdentityRegistry {
    store: Mutex<HashMap<String, IdentityModel>>,
}

impl InMemoryIdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_identities(identities: impl IntoIterator<Item = IdentityModel>) -> Self {
        let store = identities
            .into_iter()
            .map(|identity| (identity.address.clone(), identity))
            .collect();
        Self {
            store: Mutex::new(store),
        }
    }

    /// Adds or replaces an identity.
    pub async fn register(&self, identity: IdentityModel) {
        let mut store = self.store.lock().await;
        store.insert(identity.address.clone(), identity);
    }

    pub async fn count(&self) -> usize {
        self.store.lock().await.len()
    }
}

#[async_trait]
impl IdentityRegistry for InMemoryIdentityRegistry {
    async fn is_registered(&self, address: &str) -> Result<bool, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store.contains_key(address))
    }

    async fn is_compliant(&self, address: &str) -> Result<bool, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store.get(address).is_some_and(|identity| identity.compliant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registry_lookups() {
        let registry = InMemoryIdentityRegistry::from_identities(vec![
            IdentityModel::new("alice", true),
            IdentityModel::new("mallory", false),
        ]);

        assert!(registry.is_registered("alice").await.unwrap());
        assert!(registry.is_compliant("alice").await.unwrap());
        assert!(registry.is_registered("mallory").await.unwrap());
        assert!(!registry.is_compliant("mallory").await.unwrap());
        assert!(!registry.is_registered("bob").await.unwrap());
        assert!(!registry.is_compliant("bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_register_replaces_compliance() {
        let registry = InMemoryIdentityRegistry::new();
        registry.register(IdentityModel::new("alice", true)).await;
        registry.register(IdentityModel::new("alice", false)).await;

        assert_eq!(registry.count().await, 1);
        assert!(!registry.is_compliant("alice").await.unwrap());
    }
}
