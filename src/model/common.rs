//! Request/response pieces shared by every node type

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::crd::{
    ComponentCommon, ComponentStatus, HsmBinding, ResourceKind, ResourceRequirements, SecretSpec,
    StorageSpec,
};
use crate::crypto::{extract_admin_certificates, redact_private_material};
use crate::error::{Error, Result};
use crate::lifecycle::Phase;

/// Epoch milliseconds of the deployer's last write to a resource
pub const LAST_UPDATED_ANNOTATION: &str = "ibp.com/last-updated";

/// External service the component was provisioned for
pub const SERVICE_ID_ANNOTATION: &str = "ibp.com/service-id";

/// Node types a deployer client can address
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Ca,
    Peer,
    Orderer,
}

impl NodeType {
    pub fn kind(&self) -> ResourceKind {
        match self {
            NodeType::Ca => ResourceKind::Ca,
            NodeType::Peer => ResourceKind::Peer,
            NodeType::Orderer => ResourceKind::Orderer,
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Ca => write!(f, "ca"),
            NodeType::Peer => write!(f, "peer"),
            NodeType::Orderer => write!(f, "orderer"),
        }
    }
}

/// Resource allocation as supplied by a client: one block for the main
/// process, or one block per sub-process
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Resources {
    Aggregate(ResourceRequirements),
    Itemized(BTreeMap<String, ResourceRequirements>),
}

impl<'de> Deserialize<'de> for Resources {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        let aggregate = fields.keys().any(|key| key == "requests" || key == "limits");
        let value = Value::Object(fields);
        if aggregate {
            ResourceRequirements::deserialize(value)
                .map(Resources::Aggregate)
                .map_err(de::Error::custom)
        } else {
            BTreeMap::deserialize(value)
                .map(Resources::Itemized)
                .map_err(de::Error::custom)
        }
    }
}

impl Resources {
    /// Normalize to the per-sub-process form stored in the cluster
    pub fn itemize(self, main_process: &str) -> BTreeMap<String, ResourceRequirements> {
        match self {
            Resources::Aggregate(requirements) => {
                BTreeMap::from([(main_process.to_string(), requirements)])
            }
            Resources::Itemized(items) => items,
        }
    }
}

/// Deployment fields every create request carries
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRequest {
    pub version: String,
    #[serde(default)]
    pub replicas: Option<i32>,
    #[serde(default)]
    pub resources: Option<Resources>,
    #[serde(default)]
    pub storage: BTreeMap<String, StorageSpec>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub arch: Vec<String>,
    #[serde(default)]
    pub crn: Option<String>,
    #[serde(default)]
    pub resource_plan: Option<String>,
    #[serde(default)]
    pub service_id: Option<String>,
}

impl ComponentRequest {
    pub fn validate(&self) -> Result<()> {
        validate_version(&self.version)?;
        if let Some((volume, _)) = self.storage.iter().find(|(_, spec)| spec.size.trim().is_empty()) {
            return Err(Error::ValidationError(format!(
                "storage {} requires a size",
                volume
            )));
        }
        validate_replicas(self.replicas)
    }

    pub fn into_common(self, main_process: &str, hsm: Option<HsmBinding>) -> ComponentCommon {
        ComponentCommon {
            version: self.version,
            replicas: self.replicas,
            resources: self
                .resources
                .map(|resources| resources.itemize(main_process))
                .unwrap_or_default(),
            storage: self.storage,
            region: self.region,
            zone: self.zone,
            arch: self.arch,
            hsm,
            crn: self.crn,
            resource_plan: self.resource_plan,
        }
    }
}

/// Deployment fields an update request may change; absent fields are kept
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentUpdate {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub replicas: Option<i32>,
    #[serde(default)]
    pub resources: Option<Resources>,
    #[serde(default)]
    pub storage: Option<BTreeMap<String, StorageSpec>>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub arch: Option<Vec<String>>,
    #[serde(default)]
    pub resource_plan: Option<String>,
}

impl ComponentUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(version) = &self.version {
            validate_version(version)?;
        }
        validate_replicas(self.replicas)
    }

    pub fn write(self, patch: &mut SpecPatch, main_process: &str) -> Result<()> {
        patch
            .set("version", self.version)?
            .set("replicas", self.replicas)?
            .set(
                "resources",
                self.resources.map(|resources| resources.itemize(main_process)),
            )?
            .set("storage", self.storage)?
            .set("zone", self.zone)?
            .set("arch", self.arch)?
            .set("resourcePlan", self.resource_plan)?;
        Ok(())
    }
}

/// Cryptographic material supplied with a peer or orderer request
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CryptoRequest {
    #[serde(flatten)]
    pub secret: SecretSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsm: Option<HsmBinding>,
}

impl CryptoRequest {
    /// A component identity must come from enrollment or supplied MSP
    /// material. Supplied MSP material needs a key unless it lives in an HSM.
    pub fn validate(&self, hsm_bound: bool) -> Result<()> {
        if !self.secret.has_component_identity() {
            return Err(Error::ValidationError(
                "crypto must include an enrollment or msp component identity".to_string(),
            ));
        }
        if let Some(enrollment) = self.secret.enrollment.as_ref().and_then(|e| e.component.as_ref()) {
            if enrollment.enroll_id.is_empty() || enrollment.enroll_secret.is_empty() {
                return Err(Error::ValidationError(
                    "enrollment requires enrollId and enrollSecret".to_string(),
                ));
            }
            if enrollment.ca_host.is_none() {
                return Err(Error::ValidationError("enrollment requires caHost".to_string()));
            }
        }
        if let Some(msp) = self.secret.msp.as_ref().and_then(|m| m.component.as_ref()) {
            if msp.sign_certs.is_empty() {
                return Err(Error::ValidationError("msp requires signCerts".to_string()));
            }
            if msp.key_store.is_empty() && !hsm_bound {
                return Err(Error::ValidationError(
                    "msp requires keyStore unless an hsm is bound".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Deployment state shared by every response
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentView {
    pub version: String,
    /// Version the operator last reconciled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconciled_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceRequirements>,
    #[serde(default)]
    pub storage: BTreeMap<String, StorageSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default)]
    pub arch: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsm: Option<HsmBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,
}

impl ComponentView {
    pub fn new(metadata: &ObjectMeta, common: ComponentCommon, status: Option<ComponentStatus>) -> Self {
        let times = RecordTimes::from_metadata(metadata);
        let status = status.unwrap_or_default();
        Self {
            version: common.version,
            reconciled_version: status.version,
            replicas: common.replicas,
            resources: common.resources,
            storage: common.storage,
            region: common.region,
            zone: common.zone,
            arch: common.arch,
            hsm: common.hsm,
            crn: common.crn,
            resource_plan: common.resource_plan,
            service_id: annotation(metadata, SERVICE_ID_ANNOTATION),
            endpoints: status.endpoints,
            message: status.message,
            created_at: times.created_at,
            last_updated: times.last_updated,
        }
    }
}

/// Redacted secret and its admin certificates, ready to cross the trust boundary
pub fn crypto_view(secret: Option<SecretSpec>) -> (Option<SecretSpec>, Vec<String>) {
    match secret {
        Some(mut secret) => {
            let admin_certs = extract_admin_certificates(&secret);
            redact_private_material(&mut secret);
            (Some(secret), admin_certs)
        }
        None => (None, Vec::new()),
    }
}

/// Request to remove a component
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub node_type: NodeType,
    pub node_name: String,
    /// Recorded for audit and metering only
    #[serde(default)]
    pub service_id: Option<String>,
}

/// Confirmation that the cluster accepted a deletion
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub message: String,
    pub node_type: NodeType,
    pub name: String,
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
}

/// Resolve the deprecated top-level HSM binding against the nested one.
/// The nested binding wins when both are supplied.
pub fn resolve_hsm(nested: Option<HsmBinding>, deprecated: Option<HsmBinding>) -> Option<HsmBinding> {
    match (nested, deprecated) {
        (Some(nested), Some(deprecated)) => {
            if nested != deprecated {
                debug!(
                    "Ignoring deprecated hsm {} in favour of {}",
                    deprecated.pkcs11_endpoint, nested.pkcs11_endpoint
                );
            }
            Some(nested)
        }
        (nested, deprecated) => nested.or(deprecated),
    }
}

/// DNS-1123 label check applied to component names
pub fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-');
    if valid {
        Ok(())
    } else {
        Err(Error::ValidationError(format!(
            "name {:?} must be a lowercase DNS-1123 label",
            name
        )))
    }
}

pub fn validate_replicas(replicas: Option<i32>) -> Result<()> {
    match replicas {
        Some(count) if count < 0 => Err(Error::ValidationError(format!(
            "replicas must not be negative, got {}",
            count
        ))),
        _ => Ok(()),
    }
}

pub fn validate_version(version: &str) -> Result<()> {
    if version.trim().is_empty() {
        return Err(Error::ValidationError("version must not be empty".to_string()));
    }
    Ok(())
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Metadata for a newly created component
pub fn new_metadata(name: &str, namespace: &str, service_id: Option<&str>) -> ObjectMeta {
    let mut annotations = BTreeMap::from([(
        LAST_UPDATED_ANNOTATION.to_string(),
        now_millis().to_string(),
    )]);
    if let Some(service_id) = service_id {
        annotations.insert(SERVICE_ID_ANNOTATION.to_string(), service_id.to_string());
    }
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        annotations: Some(annotations),
        ..Default::default()
    }
}

/// Creation and last-write times of a stored component, in epoch ms
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordTimes {
    pub created_at: Option<i64>,
    pub last_updated: Option<i64>,
}

impl RecordTimes {
    pub fn from_metadata(metadata: &ObjectMeta) -> Self {
        Self {
            created_at: metadata
                .creation_timestamp
                .as_ref()
                .map(|time| time.0.timestamp_millis()),
            last_updated: annotation(metadata, LAST_UPDATED_ANNOTATION)
                .and_then(|value| value.parse().ok()),
        }
    }
}

pub fn annotation(metadata: &ObjectMeta, key: &str) -> Option<String> {
    metadata.annotations.as_ref()?.get(key).cloned()
}

/// Merge-patch document built from the fields a client actually supplied
///
/// Absent values are never written, so the stored value survives; a present
/// value, including zero or an empty list, overwrites it.
#[derive(Debug, Default)]
pub struct SpecPatch {
    spec: Map<String, Value>,
}

impl SpecPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: Option<T>) -> Result<&mut Self> {
        if let Some(value) = value {
            let value = serde_json::to_value(value)
                .map_err(|e| Error::ValidationError(format!("field {}: {}", key, e)))?;
            self.spec.insert(key.to_string(), value);
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.spec.is_empty()
    }

    /// Final document, stamped with the last-updated annotation
    pub fn into_document(self) -> Value {
        serde_json::json!({
            "metadata": {
                "annotations": {
                    LAST_UPDATED_ANNOTATION: now_millis().to_string(),
                }
            },
            "spec": Value::Object(self.spec),
        })
    }
}
