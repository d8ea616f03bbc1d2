//! Shared types for component specifications
//!
//! These types are used across the CRD definitions and the request/response model.

use std::collections::BTreeMap;

use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kubernetes-style resource requirements for one sub-process
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequirements {
    /// Minimum resources requested
    #[serde(default)]
    pub requests: ResourceSpec,
    /// Maximum resources allowed
    #[serde(default)]
    pub limits: ResourceSpec,
}

/// Resource specification for CPU and memory
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpec {
    /// CPU cores (e.g., "100m", "2")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    /// Memory (e.g., "200M", "4Gi")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral_storage: Option<String>,
}

/// Storage configuration for one persistent volume
///
/// Both fields are omitted when empty so a partial update leaves the stored
/// value in place.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageSpec {
    /// Storage class name (e.g., "standard", "ssd"); empty uses the cluster default
    #[serde(default, rename = "class", skip_serializing_if = "String::is_empty")]
    pub storage_class: String,
    /// Size of the PersistentVolumeClaim (e.g., "100Gi")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub size: String,
}

/// Hardware security module binding
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HsmBinding {
    /// Address of the PKCS#11 proxy the component signs through
    #[serde(rename = "pkcs11Endpoint")]
    pub pkcs11_endpoint: String,
}

/// Fields shared by every component kind
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentCommon {
    /// Fabric image version (e.g., "2.5.4")
    pub version: String,
    /// Replica count; unset leaves the operator default in place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    /// Resource allocation keyed by sub-process
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resources: BTreeMap<String, ResourceRequirements>,
    /// Persistent storage keyed by volume
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub storage: BTreeMap<String, StorageSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    /// Node architectures the component may be scheduled on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arch: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsm: Option<HsmBinding>,
    /// Cloud resource name used to correlate billing and metering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_plan: Option<String>,
}

/// Observed state reported by the operator that reconciles the resource
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStatus {
    /// Operator phase (e.g., "Deploying", "Deployed", "Error")
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Version the operator last reconciled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Network endpoints by name (e.g., "api", "operations", "grpcweb")
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub endpoints: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_heartbeat_time: Option<String>,
}

/// Schema for opaque configuration documents
pub(crate) fn preserve_unknown_fields(_: &mut SchemaGenerator) -> Schema {
    Schema::Object(SchemaObject {
        instance_type: Some(InstanceType::Object.into()),
        extensions: [(
            "x-kubernetes-preserve-unknown-fields".to_string(),
            serde_json::Value::Bool(true),
        )]
        .into_iter()
        .collect(),
        ..Default::default()
    })
}
