//! In-memory credential store for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::store::{SecretData, SecretStore, StoreError};

/// Credential store holding secrets in process memory.
///
/// Mirrors the lookup semantics of [`super::KubeSecretStore`] (fresh
/// snapshot per call, not-found vs. access errors) without a cluster.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: Mutex<HashMap<(String, String), SecretData>>,
}

impl MemorySecretStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a secret under (namespace, name).
    pub fn insert(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        data: SecretData,
    ) {
        let mut secrets = self.secrets.lock().expect("secret map lock poisoned");
        secrets.insert((namespace.into(), name.into()), data);
    }

    /// Remove a secret, if present.
    pub fn remove(&self, namespace: &str, name: &str) {
        let mut secrets = self.secrets.lock().expect("secret map lock poisoned");
        secrets.remove(&(namespace.to_string(), name.to_string()));
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretData, StoreError> {
        let secrets = self.secrets.lock().expect("secret map lock poisoned");
        secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::not_found(namespace, name))
    }
}
