//! Credential secret access for issuers.
//!
//! Issuer credentials (CA API keys, zone identifiers) live in a backing
//! secret store and are fetched fresh on every check/sign call. This module
//! provides the backend-agnostic [`SecretStore`] trait plus two
//! implementations:
//!
//! - [`KubeSecretStore`]: reads Kubernetes `Secret` objects by namespaced
//!   name (production path).
//! - [`MemorySecretStore`]: process-local map with identical semantics,
//!   used by tests and local development.
//!
//! The store is read-only by contract; nothing in this crate ever writes a
//! secret. Credential values extracted from the byte map are wrapped in
//! [`SecretToken`] so they redact in Debug output and zero on drop.

pub mod kube;
pub mod memory;
pub mod store;
pub mod types;

pub use kube::KubeSecretStore;
pub use memory::MemorySecretStore;
pub use store::{SecretData, SecretStore, StoreError};
pub use types::SecretToken;
