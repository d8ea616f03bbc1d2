//! IBPPeer custom resource

use std::fmt;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::registry::ResourceKind;
use super::secret::SecretSpec;
use super::types::{preserve_unknown_fields, ComponentCommon, ComponentStatus};
use super::ClusterDocument;

/// Desired state of a Fabric peer
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "ibp.com",
    version = "v1beta1",
    kind = "IBPPeer",
    root = "IbpPeer",
    plural = "ibppeers",
    shortname = "peer",
    namespaced,
    derive = "PartialEq",
    status = "ComponentStatus",
    printcolumn = r#"{"name":"MSP","type":"string","jsonPath":".spec.mspId"}"#,
    printcolumn = r#"{"name":"Version","type":"string","jsonPath":".spec.version"}"#,
    printcolumn = r#"{"name":"Phase","type":"string","jsonPath":".status.type"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct IbpPeerSpec {
    #[serde(flatten)]
    pub common: ComponentCommon,
    pub msp_id: String,
    #[serde(default)]
    pub state_db: StateDb,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretSpec>,
    /// Merged verbatim into core.yaml
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub config_override: Option<serde_json::Value>,
}

/// World-state database backing a peer
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StateDb {
    #[default]
    CouchDb,
    LevelDb,
}

impl fmt::Display for StateDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateDb::CouchDb => write!(f, "couchdb"),
            StateDb::LevelDb => write!(f, "leveldb"),
        }
    }
}

impl ClusterDocument for IbpPeer {
    const KIND: ResourceKind = ResourceKind::Peer;
}
