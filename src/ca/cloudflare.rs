//! Cloudflare CA backend implementation.
//!
//! Signing is a single `POST /client/v4/zones/{zone}/certificates` call
//! carrying the CSR and the primary requested hostname, authenticated with
//! a bearer token from the issuer's credential secret. The health probe is
//! a read-only zone lookup on the same API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{CaBackend, CaBackendType, HealthChecker, Signer};
use crate::errors::{IssuerError, Result};
use crate::resources::{CertificateTemplate, IssuerConfig};
use crate::secrets::{SecretData, SecretToken};

/// Credential secret field holding the API token.
pub const API_KEY_FIELD: &str = "api-key";

/// Credential secret field holding the target zone identifier.
pub const ZONE_ID_FIELD: &str = "zone-id";

const REQUIRED_FIELDS: &[&str] = &[API_KEY_FIELD, ZONE_ID_FIELD];

const DEFAULT_API_BASE: &str = "https://api.cloudflare.com";

/// Cloudflare backend: builds per-call signers and health checkers.
///
/// The HTTP client is constructed once with the signing timeout and shared
/// across calls; only its connection pool is reused, never credential
/// state.
#[derive(Clone)]
pub struct CloudflareBackend {
    http: Client,
    api_base: Url,
}

impl std::fmt::Debug for CloudflareBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareBackend").field("api_base", &self.api_base.as_str()).finish()
    }
}

impl CloudflareBackend {
    /// Create a backend whose outbound calls are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| IssuerError::config(format!("failed to build HTTP client: {err}")))?;
        let api_base = Url::parse(DEFAULT_API_BASE)
            .map_err(|err| IssuerError::config(format!("invalid default API base: {err}")))?;
        Ok(Self { http, api_base })
    }

    /// Override the default API base URL (tests, private deployments).
    pub fn with_api_base(mut self, api_base: Url) -> Self {
        self.api_base = api_base;
        self
    }

    /// Resolve the effective API base for one issuer: the issuer's
    /// `apiUrl` override when set, the backend default otherwise.
    fn resolve_api_base(&self, config: &IssuerConfig) -> std::result::Result<Url, String> {
        match &config.api_url {
            Some(override_url) => Url::parse(override_url)
                .map_err(|err| format!("invalid issuer apiUrl '{override_url}': {err}")),
            None => Ok(self.api_base.clone()),
        }
    }
}

/// Extract a UTF-8 credential field, tolerating absence.
fn optional_field(data: &SecretData, field: &str) -> std::result::Result<Option<String>, String> {
    match data.get(field) {
        None => Ok(None),
        Some(bytes) => std::str::from_utf8(bytes)
            .map(|value| Some(value.to_string()))
            .map_err(|_| format!("credential field '{field}' is not valid UTF-8")),
    }
}

impl CaBackend for CloudflareBackend {
    fn backend_type(&self) -> CaBackendType {
        CaBackendType::Cloudflare
    }

    fn required_fields(&self) -> &'static [&'static str] {
        REQUIRED_FIELDS
    }

    fn health_checker(
        &self,
        config: &IssuerConfig,
        data: &SecretData,
    ) -> Result<Box<dyn HealthChecker>> {
        let api_base = self.resolve_api_base(config).map_err(IssuerError::health_checker_builder)?;
        let api_key =
            optional_field(data, API_KEY_FIELD).map_err(IssuerError::health_checker_builder)?;
        let zone_id =
            optional_field(data, ZONE_ID_FIELD).map_err(IssuerError::health_checker_builder)?;

        let endpoint = api_base
            .join(&format!("client/v4/zones/{}", zone_id.unwrap_or_default()))
            .map_err(|err| IssuerError::health_checker_builder(format!("invalid probe URL: {err}")))?;

        Ok(Box::new(CloudflareHealthChecker {
            http: self.http.clone(),
            endpoint,
            api_key: api_key.filter(|value| !value.is_empty()).map(SecretToken::new),
        }))
    }

    fn signer(&self, config: &IssuerConfig, data: &SecretData) -> Result<Box<dyn Signer>> {
        let api_base = self.resolve_api_base(config).map_err(IssuerError::signer_builder)?;

        let api_key = optional_field(data, API_KEY_FIELD)
            .map_err(IssuerError::signer_builder)?
            .filter(|value| !value.is_empty())
            .ok_or_else(|| IssuerError::missing_credential_field(API_KEY_FIELD))?;
        let zone_id = optional_field(data, ZONE_ID_FIELD)
            .map_err(IssuerError::signer_builder)?
            .filter(|value| !value.is_empty())
            .ok_or_else(|| IssuerError::missing_credential_field(ZONE_ID_FIELD))?;

        let endpoint = api_base
            .join(&format!("client/v4/zones/{zone_id}/certificates"))
            .map_err(|err| IssuerError::signer_builder(format!("invalid signing URL: {err}")))?;

        Ok(Box::new(CloudflareSigner {
            http: self.http.clone(),
            endpoint,
            api_key: SecretToken::new(api_key),
        }))
    }
}

/// Health probe against the zone endpoint.
///
/// The probe answers "is the CA reachable and serving with these
/// credentials": transport failures, server errors, and explicit auth
/// rejections (401/403) fail the check. Incomplete secrets are not failed
/// here; no bearer is sent for a missing or empty token, and the signing
/// path classifies that case as `MissingCredentialField`.
#[derive(Debug)]
struct CloudflareHealthChecker {
    http: Client,
    endpoint: Url,
    api_key: Option<SecretToken>,
}

#[async_trait]
impl HealthChecker for CloudflareHealthChecker {
    async fn check(&self) -> Result<()> {
        let mut request = self.http.get(self.endpoint.clone());
        if let Some(token) = &self.api_key {
            request = request.bearer_auth(token.expose());
        }

        let response = request.send().await.map_err(|err| {
            IssuerError::health_checker_check(format!("CA is unreachable: {err}"))
        })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(IssuerError::health_checker_check(format!(
                "CA responded with status {status}"
            )));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(IssuerError::health_checker_check(format!(
                "CA rejected the credentials with status {status}"
            )));
        }

        debug!(status = %status, "CA health probe succeeded");
        Ok(())
    }
}

/// One-shot signer for a single zone.
#[derive(Debug)]
struct CloudflareSigner {
    http: Client,
    endpoint: Url,
    api_key: SecretToken,
}

#[async_trait]
impl Signer for CloudflareSigner {
    async fn sign(&self, template: &CertificateTemplate) -> Result<Vec<u8>> {
        let hostname = template.primary_dns_name().ok_or_else(|| {
            IssuerError::signer_sign("certificate template has no DNS SANs", None)
        })?;

        let body = json!({
            "csr": template.csr_pem(),
            "hostnames": hostname,
        });

        debug!(hostname = %hostname, "Submitting signing request to CA");

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                IssuerError::signer_sign(format!("failed to send request to CA: {err}"), None)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(IssuerError::signer_sign(
                "CA responded with a non-success status",
                Some(status.as_u16()),
            ));
        }

        let payload: Value = response.json().await.map_err(|err| {
            IssuerError::invalid_signer_response(format!("body is not valid JSON: {err}"))
        })?;

        let certificate = payload
            .get("certificate")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                IssuerError::invalid_signer_response("missing or non-string 'certificate' field")
            })?;

        Ok(certificate.as_bytes().to_vec())
    }
}
