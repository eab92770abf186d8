//! Issuer and certificate-request resource types.

pub mod issuer;
pub mod request;

pub use issuer::{
    ClusterOriginIssuer, ClusterOriginIssuerSpec, IssuerCondition, IssuerConfig, IssuerObject,
    IssuerStatus, OriginIssuer, OriginIssuerSpec,
};
pub use request::{CertificateRequestObject, CertificateTemplate, PendingCertificateRequest};
