//! Certificate request surface consumed from the external driver.
//!
//! The driver owns the certificate-request resource; this core only needs
//! the X.509 template it carries. [`CertificateRequestObject`] is the
//! capability contract, [`PendingCertificateRequest`] a CSR-PEM-backed
//! implementation used when the driver hands over raw CSR bytes.

use std::time::Duration;

use x509_parser::certification_request::X509CertificationRequest;
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::pem::Pem;
use x509_parser::prelude::FromDer;

use crate::errors::{IssuerError, Result};

/// X.509 request description extracted from a pending certificate request.
///
/// Carries the raw CSR in both PEM and DER form plus the identity fields
/// the signing backend needs to build its payload.
#[derive(Debug, Clone)]
pub struct CertificateTemplate {
    csr_pem: String,
    csr_der: Vec<u8>,
    dns_names: Vec<String>,
    common_name: Option<String>,
}

impl CertificateTemplate {
    /// Parse a template from PEM-encoded CSR bytes.
    pub fn from_csr_pem(pem_bytes: &[u8]) -> Result<Self> {
        let pem = Pem::iter_from_buffer(pem_bytes)
            .next()
            .ok_or_else(|| IssuerError::request("no PEM block in certificate request"))?
            .map_err(|err| IssuerError::request(format!("malformed CSR PEM: {err}")))?;

        if pem.label != "CERTIFICATE REQUEST" && pem.label != "NEW CERTIFICATE REQUEST" {
            return Err(IssuerError::request(format!(
                "expected a CERTIFICATE REQUEST block, found '{}'",
                pem.label
            )));
        }

        let (dns_names, common_name) = {
            let (_, csr) = X509CertificationRequest::from_der(&pem.contents)
                .map_err(|err| IssuerError::request(format!("failed to parse CSR: {err}")))?;

            let mut dns_names = Vec::new();
            if let Some(extensions) = csr.requested_extensions() {
                for extension in extensions {
                    if let ParsedExtension::SubjectAlternativeName(san) = extension {
                        for name in &san.general_names {
                            if let GeneralName::DNSName(dns) = name {
                                dns_names.push(dns.to_string());
                            }
                        }
                    }
                }
            }

            let common_name = csr
                .certification_request_info
                .subject
                .iter_common_name()
                .next()
                .and_then(|attr| attr.as_str().ok())
                .map(str::to_string);

            (dns_names, common_name)
        };

        Ok(Self {
            csr_pem: String::from_utf8_lossy(pem_bytes).into_owned(),
            csr_der: pem.contents,
            dns_names,
            common_name,
        })
    }

    /// The CSR in PEM form, as sent to the signing backend.
    pub fn csr_pem(&self) -> &str {
        &self.csr_pem
    }

    /// The CSR in DER form.
    pub fn csr_der(&self) -> &[u8] {
        &self.csr_der
    }

    /// DNS SANs requested by the CSR, in order.
    pub fn dns_names(&self) -> &[String] {
        &self.dns_names
    }

    /// The first requested DNS SAN, if any.
    pub fn primary_dns_name(&self) -> Option<&str> {
        self.dns_names.first().map(String::as_str)
    }

    /// The subject common name, if any.
    pub fn common_name(&self) -> Option<&str> {
        self.common_name.as_deref()
    }
}

/// Capability exposed by the driver's certificate-request resource.
///
/// Mirrors the driver contract: one call yields the certificate template
/// plus the requested lifetime and key usages. This core only consumes the
/// template; lifetime and usages pass through to backends that need them.
pub trait CertificateRequestObject: Send + Sync {
    /// Extract the template, requested duration, and requested usages.
    fn get_request(&self) -> Result<(CertificateTemplate, Duration, Vec<String>)>;
}

/// A pending request backed by raw CSR PEM bytes.
#[derive(Debug, Clone)]
pub struct PendingCertificateRequest {
    csr_pem: Vec<u8>,
    duration: Duration,
    usages: Vec<String>,
}

impl PendingCertificateRequest {
    /// Create a request around CSR PEM bytes with a requested lifetime.
    pub fn new(csr_pem: impl Into<Vec<u8>>, duration: Duration) -> Self {
        Self { csr_pem: csr_pem.into(), duration, usages: Vec::new() }
    }

    /// Attach requested key usages.
    pub fn with_usages(mut self, usages: Vec<String>) -> Self {
        self.usages = usages;
        self
    }
}

impl CertificateRequestObject for PendingCertificateRequest {
    fn get_request(&self) -> Result<(CertificateTemplate, Duration, Vec<String>)> {
        let template = CertificateTemplate::from_csr_pem(&self.csr_pem)?;
        Ok((template, self.duration, self.usages.clone()))
    }
}
