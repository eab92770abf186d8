//! # Error Handling
//!
//! Classified error types for the issuer core, built with `thiserror`.
//! See [`types::IssuerError`] for the retryable/permanent taxonomy consumed
//! by the external reconciliation driver.

pub mod types;

pub use types::{IssuerError, Result, SignError};
