//! IBPCA custom resource

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::registry::ResourceKind;
use super::types::{preserve_unknown_fields, ComponentCommon, ComponentStatus};
use super::ClusterDocument;

/// Desired state of a Fabric certificate authority
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "ibp.com",
    version = "v1beta1",
    kind = "IBPCA",
    root = "IbpCa",
    plural = "ibpcas",
    shortname = "ca",
    namespaced,
    derive = "PartialEq",
    status = "ComponentStatus",
    printcolumn = r#"{"name":"Version","type":"string","jsonPath":".spec.version"}"#,
    printcolumn = r#"{"name":"Phase","type":"string","jsonPath":".status.type"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct IbpCaSpec {
    #[serde(flatten)]
    pub common: ComponentCommon,
    /// Name of the enrollment CA served by this component
    pub ca_name: String,
    /// Name of the TLS CA served by this component
    pub tlsca_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_override: Option<CaConfigOverride>,
}

/// Overrides for the two CA servers running in the component
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct CaConfigOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub ca: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub tlsca: Option<serde_json::Value>,
}

impl ClusterDocument for IbpCa {
    const KIND: ResourceKind = ResourceKind::Ca;
}
