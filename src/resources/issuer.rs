//! Issuer custom resource kinds and detail resolution.
//!
//! Two issuer kinds share one configuration shape: `OriginIssuer` is
//! namespaced and resolves credential secrets in its own namespace;
//! `ClusterOriginIssuer` is cluster-scoped and resolves them in the
//! configured cluster resource namespace. Anything else handed over by the
//! external driver is a permanent misconfiguration.

use kube::core::DynamicObject;
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::{IssuerError, Result};

/// Issuer configuration shared by both issuer kinds.
///
/// This is the view the orchestrator works against; it is extracted from a
/// caller-supplied issuer object and immutable for the duration of one
/// check/sign call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuerConfig {
    /// Name of the secret holding the CA credentials. The namespace comes
    /// from issuer resolution, never from the config itself.
    pub auth_secret_name: String,

    /// CA API base URL override. Defaults to the backend's production
    /// endpoint when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

/// Spec of the namespaced issuer kind.
#[derive(CustomResource, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "certgate.io",
    version = "v1alpha1",
    kind = "OriginIssuer",
    status = "IssuerStatus",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct OriginIssuerSpec {
    #[serde(flatten)]
    pub config: IssuerConfig,
}

/// Spec of the cluster-scoped issuer kind.
#[derive(CustomResource, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "certgate.io",
    version = "v1alpha1",
    kind = "ClusterOriginIssuer",
    status = "IssuerStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterOriginIssuerSpec {
    #[serde(flatten)]
    pub config: IssuerConfig,
}

/// Observed issuer state, written by the external driver from the errors
/// this core returns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuerStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<IssuerCondition>>,
}

/// A single status condition on an issuer resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuerCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// The polymorphic issuer object the external driver hands to check/sign.
///
/// `Foreign` carries any dynamic object of a kind this controller was
/// never registered for; resolution turns it into the permanent
/// [`IssuerError::UnexpectedIssuerType`] so the driver stops retrying
/// until the object is edited.
#[derive(Clone, Debug)]
pub enum IssuerObject {
    Namespaced(OriginIssuer),
    Cluster(ClusterOriginIssuer),
    Foreign(DynamicObject),
}

impl IssuerObject {
    /// Resolve the issuer to its configuration and the namespace in which
    /// its credential secret must be looked up.
    ///
    /// A namespaced issuer with no namespace set resolves to an empty
    /// namespace; the subsequent secret lookup fails with `GetAuthSecret`,
    /// which is retryable once the object is fixed.
    pub fn resolve<'a>(
        &'a self,
        cluster_resource_namespace: &str,
    ) -> Result<(&'a IssuerConfig, String)> {
        match self {
            Self::Namespaced(issuer) => {
                let namespace = issuer.metadata.namespace.clone().unwrap_or_default();
                Ok((&issuer.spec.config, namespace))
            }
            Self::Cluster(issuer) => {
                Ok((&issuer.spec.config, cluster_resource_namespace.to_string()))
            }
            Self::Foreign(object) => Err(IssuerError::unexpected_issuer_type(
                object
                    .types
                    .as_ref()
                    .map(|t| t.kind.clone())
                    .unwrap_or_else(|| "<unknown>".to_string()),
            )),
        }
    }

    /// Resource kind, for logging.
    pub fn kind(&self) -> &str {
        match self {
            Self::Namespaced(_) => "OriginIssuer",
            Self::Cluster(_) => "ClusterOriginIssuer",
            Self::Foreign(_) => "Foreign",
        }
    }

    /// Resource name, for logging.
    pub fn name(&self) -> String {
        match self {
            Self::Namespaced(issuer) => issuer.name_any(),
            Self::Cluster(issuer) => issuer.name_any(),
            Self::Foreign(object) => object.name_any(),
        }
    }
}
