//! Credential store trait and types.

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

/// Raw key/value byte map of a credential secret, as fetched from the
/// backing store. A fresh snapshot is taken on every check/sign call; the
/// core never caches or mutates it.
pub type SecretData = BTreeMap<String, Vec<u8>>;

/// Errors raised by a credential store lookup.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No secret exists under the requested (namespace, name).
    #[error("secret {namespace}/{name} not found")]
    NotFound { namespace: String, name: String },

    /// The store was reachable but refused or failed the read.
    #[error("failed to read secret {namespace}/{name}: {reason}")]
    Access { namespace: String, name: String, reason: String },
}

impl StoreError {
    /// Create a not-found error.
    pub fn not_found(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound { namespace: namespace.into(), name: name.into() }
    }

    /// Create an access error.
    pub fn access(
        namespace: impl Into<String>,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Access { namespace: namespace.into(), name: name.into(), reason: reason.into() }
    }
}

/// Read-only access to credential secrets by namespaced name.
///
/// The orchestrator fetches issuer credentials through this trait so the
/// backing store (Kubernetes Secrets in production, an in-memory map in
/// tests) stays swappable. Implementations must never write back.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the secret named `name` in `namespace` and return its
    /// key/value byte map.
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretData, StoreError>;
}
