//! # Configuration Settings
//!
//! Process-wide configuration for the issuer core. Everything the
//! orchestrator needs beyond the issuer objects themselves is carried here
//! explicitly (no ambient global state): the fallback namespace for
//! cluster-scoped issuers, the registration identity handed to the external
//! reconciliation driver, and the signing-call timeout.

use std::time::Duration;

use crate::errors::{IssuerError, Result};

const DEFAULT_CLUSTER_RESOURCE_NAMESPACE: &str = "certgate-system";
const DEFAULT_FIELD_OWNER: &str = "originissuer.certgate.io";
const DEFAULT_MAX_RETRY_SECONDS: u64 = 60;
const DEFAULT_SIGNING_TIMEOUT_SECONDS: u64 = 10;

/// Controller configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Namespace used to resolve credential secrets referenced by
    /// cluster-scoped issuers, which have no namespace of their own.
    pub cluster_resource_namespace: String,

    /// Field-owner identifier the external driver uses when patching
    /// resource status.
    pub field_owner: String,

    /// Upper bound the external driver applies to its retry/backoff loop.
    /// Carried here for registration; the core itself never retries.
    pub max_retry_duration: Duration,

    /// Bound on the outbound CA signing call so a hung remote CA cannot
    /// stall a reconciliation worker.
    pub signing_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            cluster_resource_namespace: DEFAULT_CLUSTER_RESOURCE_NAMESPACE.to_string(),
            field_owner: DEFAULT_FIELD_OWNER.to_string(),
            max_retry_duration: Duration::from_secs(DEFAULT_MAX_RETRY_SECONDS),
            signing_timeout: Duration::from_secs(DEFAULT_SIGNING_TIMEOUT_SECONDS),
        }
    }
}

impl ControllerConfig {
    /// Build the configuration from `CERTGATE_*` environment variables,
    /// falling back to defaults for anything unset.
    ///
    /// - `CERTGATE_CLUSTER_RESOURCE_NAMESPACE`
    /// - `CERTGATE_FIELD_OWNER`
    /// - `CERTGATE_MAX_RETRY_SECONDS`
    /// - `CERTGATE_SIGNING_TIMEOUT_SECONDS`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(namespace) = std::env::var("CERTGATE_CLUSTER_RESOURCE_NAMESPACE") {
            config.cluster_resource_namespace = namespace;
        }
        if let Ok(owner) = std::env::var("CERTGATE_FIELD_OWNER") {
            config.field_owner = owner;
        }
        if let Ok(seconds) = std::env::var("CERTGATE_MAX_RETRY_SECONDS") {
            config.max_retry_duration = Duration::from_secs(parse_seconds(
                "CERTGATE_MAX_RETRY_SECONDS",
                &seconds,
            )?);
        }
        if let Ok(seconds) = std::env::var("CERTGATE_SIGNING_TIMEOUT_SECONDS") {
            config.signing_timeout = Duration::from_secs(parse_seconds(
                "CERTGATE_SIGNING_TIMEOUT_SECONDS",
                &seconds,
            )?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration beyond type-level guarantees.
    pub fn validate(&self) -> Result<()> {
        if self.cluster_resource_namespace.is_empty() {
            return Err(IssuerError::config("cluster resource namespace cannot be empty"));
        }
        if self.field_owner.is_empty() {
            return Err(IssuerError::config("field owner cannot be empty"));
        }
        if self.signing_timeout.is_zero() {
            return Err(IssuerError::config("signing timeout must be greater than zero"));
        }
        Ok(())
    }
}

fn parse_seconds(variable: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|err| IssuerError::config(format!("invalid {variable} '{value}': {err}")))
}
