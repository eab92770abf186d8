//! Kubernetes-Secret-backed credential store.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use tracing::debug;

use super::store::{SecretData, SecretStore, StoreError};

/// Credential store reading from Kubernetes `Secret` objects.
///
/// Each lookup performs a fresh `get` against the cluster API; there is no
/// caching layer, so the health gate and the signer always see the secret
/// as it exists at call time.
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    /// Create a store backed by the given cluster client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl std::fmt::Debug for KubeSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeSecretStore").field("client", &"[Client]").finish()
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretData, StoreError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        debug!(namespace = %namespace, secret = %name, "Fetching issuer credential secret");

        let secret = api.get(name).await.map_err(|err| match err {
            kube::Error::Api(ref response) if response.code == 404 => {
                StoreError::not_found(namespace, name)
            }
            other => StoreError::access(namespace, name, other.to_string()),
        })?;

        Ok(secret
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| (key, value.0))
            .collect())
    }
}
