//! Error taxonomy for issuer reconciliation and signing.
//!
//! Every failure the orchestrator can produce is classified into one of the
//! kinds below so the external reconciliation driver can decide whether to
//! retry. Only [`IssuerError::UnexpectedIssuerType`] suppresses retries
//! entirely; everything else is retryable once the underlying condition
//! (secret contents, CA reachability) changes.

use crate::secrets::StoreError;

/// Custom result type for certgate operations.
pub type Result<T> = std::result::Result<T, IssuerError>;

/// Classified failure produced by the issuer orchestrator or one of its
/// collaborators (credential store, health checker, signer, chain parser).
#[derive(thiserror::Error, Debug)]
pub enum IssuerError {
    /// The issuer object handed over by the driver is not one of the
    /// recognized variants. Permanent: no retry until the issuer is edited.
    #[error("unexpected issuer type: {kind}")]
    UnexpectedIssuerType { kind: String },

    /// The secret holding the issuer credentials could not be read.
    #[error("failed to get Secret containing issuer credentials {namespace}/{name}")]
    GetAuthSecret {
        namespace: String,
        name: String,
        #[source]
        source: StoreError,
    },

    /// The health checker could not be constructed from the issuer
    /// configuration and credential bytes.
    #[error("failed to build the health checker: {reason}")]
    HealthCheckerBuilder { reason: String },

    /// The live health probe against the CA failed.
    #[error("health check failed: {reason}")]
    HealthCheckerCheck { reason: String },

    /// A credential field the signing backend requires is absent or empty.
    #[error("required credential field '{field}' is missing or empty")]
    MissingCredentialField { field: String },

    /// The signer could not be constructed from the issuer configuration
    /// and credential bytes.
    #[error("failed to build the signer: {reason}")]
    SignerBuilder { reason: String },

    /// The remote signing call failed (transport error or non-success
    /// status). Retry policy belongs to the external driver.
    #[error("signing request failed{}: {reason}", fmt_status(.status))]
    SignerSign { reason: String, status: Option<u16> },

    /// The CA reported success but the response body did not carry a
    /// usable certificate.
    #[error("invalid response from CA: {reason}")]
    InvalidSignerResponse { reason: String },

    /// The PEM returned by the CA does not decode to a single ordered
    /// certificate chain.
    #[error("failed to parse certificate chain: {reason}")]
    InvalidChain { reason: String },

    /// The certificate request object could not produce a template.
    #[error("malformed certificate request: {reason}")]
    Request { reason: String },

    /// Process-level configuration problem (env parsing, logging setup).
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {code})"),
        None => String::new(),
    }
}

impl IssuerError {
    /// Create an unexpected-issuer-type error.
    pub fn unexpected_issuer_type(kind: impl Into<String>) -> Self {
        Self::UnexpectedIssuerType { kind: kind.into() }
    }

    /// Create a secret-retrieval error for the attempted (namespace, name).
    pub fn get_auth_secret(
        namespace: impl Into<String>,
        name: impl Into<String>,
        source: StoreError,
    ) -> Self {
        Self::GetAuthSecret { namespace: namespace.into(), name: name.into(), source }
    }

    /// Create a health-checker construction error.
    pub fn health_checker_builder(reason: impl Into<String>) -> Self {
        Self::HealthCheckerBuilder { reason: reason.into() }
    }

    /// Create a health-probe failure error.
    pub fn health_checker_check(reason: impl Into<String>) -> Self {
        Self::HealthCheckerCheck { reason: reason.into() }
    }

    /// Create a missing-credential-field error.
    pub fn missing_credential_field(field: impl Into<String>) -> Self {
        Self::MissingCredentialField { field: field.into() }
    }

    /// Create a signer construction error.
    pub fn signer_builder(reason: impl Into<String>) -> Self {
        Self::SignerBuilder { reason: reason.into() }
    }

    /// Create a signing-call failure, optionally naming the HTTP status.
    pub fn signer_sign(reason: impl Into<String>, status: Option<u16>) -> Self {
        Self::SignerSign { reason: reason.into(), status }
    }

    /// Create a malformed-success-response error.
    pub fn invalid_signer_response(reason: impl Into<String>) -> Self {
        Self::InvalidSignerResponse { reason: reason.into() }
    }

    /// Create a chain-parse error.
    pub fn invalid_chain(reason: impl Into<String>) -> Self {
        Self::InvalidChain { reason: reason.into() }
    }

    /// Create a request-extraction error.
    pub fn request(reason: impl Into<String>) -> Self {
        Self::Request { reason: reason.into() }
    }

    /// Create a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config { reason: reason.into() }
    }

    /// Whether the driver must stop retrying until the issuer spec changes.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::UnexpectedIssuerType { .. })
    }
}

/// Failure returned by the `sign` operation, split into the two levels the
/// external driver distinguishes: issuer-level failures (the issuer itself
/// is misconfigured or unhealthy, reported against the issuer resource) and
/// request-level failures (this particular signing attempt failed).
#[derive(thiserror::Error, Debug)]
pub enum SignError {
    /// The issuer is not usable: resolution, credential retrieval, or the
    /// health gate failed before any signing was attempted.
    #[error("issuer error: {0}")]
    Issuer(#[source] IssuerError),

    /// The issuer passed its gate but this signing request failed.
    #[error(transparent)]
    Request(IssuerError),
}

impl SignError {
    /// The underlying classified error, regardless of level.
    pub fn kind(&self) -> &IssuerError {
        match self {
            Self::Issuer(err) | Self::Request(err) => err,
        }
    }

    /// Whether the driver must stop retrying until the issuer spec changes.
    pub fn is_permanent(&self) -> bool {
        self.kind().is_permanent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_issuer_type_is_permanent() {
        let err = IssuerError::unexpected_issuer_type("GarbageIssuer");
        assert!(err.is_permanent());
        assert_eq!(err.to_string(), "unexpected issuer type: GarbageIssuer");
    }

    #[test]
    fn retryable_kinds_are_not_permanent() {
        let errors = [
            IssuerError::health_checker_builder("bad fields"),
            IssuerError::health_checker_check("unreachable"),
            IssuerError::missing_credential_field("api-key"),
            IssuerError::signer_builder("bad url"),
            IssuerError::signer_sign("refused", None),
            IssuerError::invalid_signer_response("no certificate field"),
            IssuerError::invalid_chain("empty"),
        ];
        for err in errors {
            assert!(!err.is_permanent(), "{err} must be retryable");
        }
    }

    #[test]
    fn signer_sign_names_the_status() {
        let err = IssuerError::signer_sign("CA rejected the request", Some(500));
        assert_eq!(err.to_string(), "signing request failed (status 500): CA rejected the request");

        let err = IssuerError::signer_sign("connection refused", None);
        assert_eq!(err.to_string(), "signing request failed: connection refused");
    }

    #[test]
    fn get_auth_secret_names_namespace_and_name() {
        let err = IssuerError::get_auth_secret(
            "team-a",
            "ca-credentials",
            StoreError::not_found("team-a", "ca-credentials"),
        );
        assert!(err.to_string().contains("team-a/ca-credentials"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn sign_error_levels_share_the_kind() {
        let issuer_level = SignError::Issuer(IssuerError::unexpected_issuer_type("Foo"));
        assert!(issuer_level.is_permanent());
        assert!(issuer_level.to_string().starts_with("issuer error"));

        let request_level = SignError::Request(IssuerError::invalid_chain("two leaves"));
        assert!(!request_level.is_permanent());
        assert!(matches!(request_level.kind(), IssuerError::InvalidChain { .. }));
    }
}
