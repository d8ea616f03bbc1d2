//! IBPOrderer custom resource

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::registry::ResourceKind;
use super::secret::SecretSpec;
use super::types::{preserve_unknown_fields, ComponentCommon, ComponentStatus};
use super::ClusterDocument;

/// Desired state of a Fabric ordering node
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "ibp.com",
    version = "v1beta1",
    kind = "IBPOrderer",
    root = "IbpOrderer",
    plural = "ibporderers",
    shortname = "orderer",
    namespaced,
    derive = "PartialEq",
    status = "ComponentStatus",
    printcolumn = r#"{"name":"MSP","type":"string","jsonPath":".spec.mspId"}"#,
    printcolumn = r#"{"name":"Version","type":"string","jsonPath":".spec.version"}"#,
    printcolumn = r#"{"name":"Phase","type":"string","jsonPath":".status.type"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct IbpOrdererSpec {
    #[serde(flatten)]
    pub common: ComponentCommon,
    pub msp_id: String,
    pub system_channel_name: String,
    /// Base64 genesis block, or empty when the node joins channels later
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genesis_block: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_node_ou: Option<bool>,
    /// Set when the node is one member of a multi-node ordering service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretSpec>,
    /// Merged verbatim into orderer.yaml
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub config_override: Option<serde_json::Value>,
}

/// Reference to the ordering service a node belongs to
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParentRef {
    pub name: String,
    /// Parent lifecycle marker, e.g. "pending" until every member is created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ClusterDocument for IbpOrderer {
    const KIND: ResourceKind = ResourceKind::Orderer;
}
