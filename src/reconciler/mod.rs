//! Issuer orchestrator: the check/sign core invoked by the external
//! reconciliation driver.
//!
//! Both operations are synchronous from the driver's point of view
//! (blocking async calls, no background tasks) and safe to invoke
//! concurrently for different issuers: every call resolves the issuer,
//! takes a fresh credential snapshot, and constructs throwaway health
//! checker and signer instances. Nothing is cached across calls.
//! Cancellation is cooperative; dropping the returned future aborts the
//! in-flight secret read or CA call.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::ca::CaBackend;
use crate::config::ControllerConfig;
use crate::errors::{IssuerError, Result, SignError};
use crate::pki::{parse_single_chain, PemBundle};
use crate::resources::{CertificateRequestObject, IssuerConfig, IssuerObject};
use crate::secrets::{SecretData, SecretStore};

/// Coordinates issuer resolution, credential retrieval, health gating, and
/// delegated signing.
pub struct IssuerReconciler {
    store: Arc<dyn SecretStore>,
    backend: Arc<dyn CaBackend>,
    config: ControllerConfig,
}

impl std::fmt::Debug for IssuerReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuerReconciler")
            .field("backend", &self.backend.backend_type())
            .field("config", &self.config)
            .finish()
    }
}

impl IssuerReconciler {
    /// Create an orchestrator over a credential store and a CA backend.
    pub fn new(
        store: Arc<dyn SecretStore>,
        backend: Arc<dyn CaBackend>,
        config: ControllerConfig,
    ) -> Self {
        Self { store, backend, config }
    }

    /// The process-wide configuration this orchestrator was built with.
    /// The external driver reads the registration identity (field owner,
    /// max retry duration) from here.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Fetch the issuer's credential secret and run the health gate.
    ///
    /// On success the raw byte map is returned so the signing path reuses
    /// the exact credentials the health check validated.
    async fn secret_data(&self, config: &IssuerConfig, namespace: &str) -> Result<SecretData> {
        let data = self
            .store
            .get(namespace, &config.auth_secret_name)
            .await
            .map_err(|err| {
                IssuerError::get_auth_secret(namespace, &config.auth_secret_name, err)
            })?;

        let checker = self.backend.health_checker(config, &data)?;
        checker.check().await?;

        Ok(data)
    }

    /// Gate operation: is this issuer ready to serve signing requests?
    ///
    /// Side-effect-free beyond the read-only health probe; never signs.
    pub async fn check(&self, issuer: &IssuerObject) -> Result<()> {
        debug!(kind = %issuer.kind(), name = %issuer.name(), "Checking issuer");

        let (config, namespace) = issuer.resolve(&self.config.cluster_resource_namespace)?;

        match self.secret_data(config, &namespace).await {
            Ok(_) => {
                debug!(kind = %issuer.kind(), name = %issuer.name(), "Issuer is ready");
                Ok(())
            }
            Err(err) => {
                warn!(kind = %issuer.kind(), name = %issuer.name(), error = %err, "Issuer check failed");
                Err(err)
            }
        }
    }

    /// Sign one pending certificate request against this issuer.
    ///
    /// Failures before the template is touched (resolution, credential
    /// retrieval, health gate) come back as [`SignError::Issuer`]; the
    /// rest are request-level. Credential presence is validated before any
    /// signing call goes out, and each invocation performs exactly one
    /// independent remote call.
    pub async fn sign(
        &self,
        request: &dyn CertificateRequestObject,
        issuer: &IssuerObject,
    ) -> std::result::Result<PemBundle, SignError> {
        let (config, namespace) = issuer
            .resolve(&self.config.cluster_resource_namespace)
            .map_err(SignError::Issuer)?;

        let data =
            self.secret_data(config, &namespace).await.map_err(SignError::Issuer)?;

        for field in self.backend.required_fields() {
            match data.get(*field) {
                Some(value) if !value.is_empty() => {}
                _ => {
                    return Err(SignError::Request(IssuerError::missing_credential_field(
                        *field,
                    )))
                }
            }
        }

        let (template, _duration, _usages) = request.get_request().map_err(SignError::Request)?;

        let signer = self.backend.signer(config, &data).map_err(SignError::Request)?;
        let pem = signer.sign(&template).await.map_err(SignError::Request)?;

        let bundle = parse_single_chain(&pem).map_err(SignError::Request)?;

        info!(
            kind = %issuer.kind(),
            name = %issuer.name(),
            namespace = %namespace,
            chain_length = bundle.len(),
            "Signed certificate request"
        );

        Ok(bundle)
    }
}
