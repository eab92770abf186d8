//! # Certgate
//!
//! Certgate is a certificate-issuance adapter: given an issuer custom
//! resource (credentials + configuration) and a pending certificate
//! request, it validates issuer health, fetches stored credentials,
//! delegates signing to an external certificate authority, and returns a
//! parsed certificate chain.
//!
//! ## Architecture
//!
//! ```text
//! External driver ──▶ IssuerReconciler ──▶ SecretStore (credentials)
//!      (check/sign)         │
//!                           ├──▶ CaBackend ──▶ HealthChecker (gate)
//!                           │                  Signer (one remote call)
//!                           └──▶ PemBundle (parsed chain, leaf first)
//! ```
//!
//! The reconciliation scheduler itself (watch loops, retry/backoff, CRD
//! registration) is an external collaborator; this crate supplies the
//! `check`/`sign` core it drives and the classified errors it consumes.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use certgate::{
//!     CloudflareBackend, ControllerConfig, IssuerReconciler, KubeSecretStore,
//! };
//!
//! # async fn run() -> certgate::Result<()> {
//! let config = ControllerConfig::from_env()?;
//! let backend = CloudflareBackend::new(config.signing_timeout)?;
//! let client = kube::Client::try_default().await.map_err(|err| {
//!     certgate::IssuerError::config(err.to_string())
//! })?;
//! let reconciler = IssuerReconciler::new(
//!     Arc::new(KubeSecretStore::new(client)),
//!     Arc::new(backend),
//!     config,
//! );
//! # let _ = reconciler;
//! # Ok(())
//! # }
//! ```

pub mod ca;
pub mod config;
pub mod errors;
pub mod observability;
pub mod pki;
pub mod reconciler;
pub mod resources;
pub mod secrets;

// Re-export commonly used types and traits
pub use ca::{CaBackend, CaBackendType, CloudflareBackend, HealthChecker, Signer};
pub use config::ControllerConfig;
pub use errors::{IssuerError, Result, SignError};
pub use observability::{init_logging, LoggingConfig};
pub use pki::{parse_single_chain, ChainCertificate, PemBundle};
pub use reconciler::IssuerReconciler;
pub use resources::{
    CertificateRequestObject, CertificateTemplate, ClusterOriginIssuer, IssuerConfig,
    IssuerObject, OriginIssuer, PendingCertificateRequest,
};
pub use secrets::{KubeSecretStore, MemorySecretStore, SecretData, SecretStore, StoreError};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
