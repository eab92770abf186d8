//! # Structured Logging
//!
//! Tracing subscriber setup for the issuer core. The orchestrator and its
//! collaborators log with structured fields (issuer kind/name, namespace,
//! secret name, backend type); credential values never appear in log
//! output because they are carried in redacting wrappers.

use tracing_subscriber::EnvFilter;

use crate::errors::{IssuerError, Result};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `certgate=debug,kube=warn`.
    /// Overridden by `RUST_LOG` when set.
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

/// Initialize the global tracing subscriber.
///
/// Fails if called twice or if the filter directive does not parse.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|err| IssuerError::config(format!("invalid log filter: {err}")))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = if config.json {
        builder.json().flatten_event(true).try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|err| IssuerError::config(format!("failed to install subscriber: {err}")))
}
