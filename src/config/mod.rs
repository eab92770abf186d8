//! # Configuration Management
//!
//! Explicit configuration structs for the issuer core, resolved once at
//! startup and passed to the orchestrator at construction time.

pub mod settings;

pub use settings::ControllerConfig;
