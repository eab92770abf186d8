//! Pluggable CA backend architecture.
//!
//! The orchestrator never talks to a CA directly. A [`CaBackend`] turns an
//! issuer's configuration plus freshly fetched credential bytes into two
//! single-use capabilities: a [`HealthChecker`] that gates whether signing
//! is attempted at all, and a [`Signer`] that performs the one outbound
//! signing call. Both are constructed per call and discarded afterwards,
//! so no credential state outlives a single check/sign invocation.
//!
//! Adding a CA means implementing this trait; the orchestration logic in
//! [`crate::reconciler`] stays untouched.

use async_trait::async_trait;
use std::fmt;

use crate::errors::Result;
use crate::resources::{CertificateTemplate, IssuerConfig};
use crate::secrets::SecretData;

pub mod cloudflare;

pub use cloudflare::CloudflareBackend;

/// Type of CA backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaBackendType {
    /// Cloudflare origin CA certificates API
    Cloudflare,
}

impl CaBackendType {
    /// Returns the string representation of the backend type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cloudflare => "cloudflare",
        }
    }
}

impl fmt::Display for CaBackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Verifies that an issuer's CA is reachable and usable.
///
/// Used exactly once per check/sign call, then discarded. Failures must be
/// reported as [`crate::errors::IssuerError::HealthCheckerCheck`].
#[async_trait]
pub trait HealthChecker: Send + Sync + fmt::Debug {
    /// Probe the CA. Must not issue anything.
    async fn check(&self) -> Result<()>;
}

/// Performs the remote signing call for one certificate template.
///
/// Used exactly once per sign call, then discarded. Returns the raw PEM
/// bytes from the CA; failures must be reported as `SignerSign` (transport
/// or status failures) or `InvalidSignerResponse` (malformed success
/// bodies).
#[async_trait]
pub trait Signer: Send + Sync + fmt::Debug {
    /// Sign the template with exactly one outbound call. No retries here;
    /// retry policy belongs to the external driver.
    async fn sign(&self, template: &CertificateTemplate) -> Result<Vec<u8>>;
}

/// Factory for per-call health checkers and signers.
///
/// Construction failures must be reported as `HealthCheckerBuilder` and
/// `SignerBuilder` respectively, so the orchestrator's error taxonomy
/// stays intact without it inspecting backend internals.
pub trait CaBackend: Send + Sync + fmt::Debug {
    /// Get the backend type identifier.
    fn backend_type(&self) -> CaBackendType;

    /// Credential fields that must be present and non-empty in the secret
    /// before a signing call is attempted.
    fn required_fields(&self) -> &'static [&'static str];

    /// Build a health checker from issuer configuration and credentials.
    fn health_checker(
        &self,
        config: &IssuerConfig,
        data: &SecretData,
    ) -> Result<Box<dyn HealthChecker>>;

    /// Build a signer from issuer configuration and credentials.
    fn signer(&self, config: &IssuerConfig, data: &SecretData) -> Result<Box<dyn Signer>>;
}
