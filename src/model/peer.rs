//! Peer requests and responses

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{
    crypto_view, new_metadata, resolve_hsm, validate_name, ComponentRequest, ComponentUpdate,
    ComponentView, CryptoRequest, SpecPatch,
};
use super::ComponentDocument;
use crate::crd::{ComponentStatus, HsmBinding, IbpPeer, IbpPeerSpec, SecretSpec, StateDb};
use crate::error::{Error, Result};
use crate::lifecycle::Phase;

const MAIN_PROCESS: &str = "peer";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePeerRequest {
    pub name: String,
    pub msp_id: String,
    #[serde(default)]
    pub state_db: Option<StateDb>,
    #[serde(flatten)]
    pub component: ComponentRequest,
    /// Deprecated: use `crypto.hsm`, which wins when both are set
    #[serde(default)]
    pub hsm: Option<HsmBinding>,
    pub crypto: CryptoRequest,
    #[serde(default)]
    pub config_override: Option<Value>,
}

impl CreatePeerRequest {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        if self.msp_id.trim().is_empty() {
            return Err(Error::ValidationError("mspId must not be empty".to_string()));
        }
        self.component.validate()?;
        self.crypto
            .validate(self.crypto.hsm.is_some() || self.hsm.is_some())
    }

    pub fn into_document(self, namespace: &str) -> IbpPeer {
        let metadata = new_metadata(&self.name, namespace, self.component.service_id.as_deref());
        let hsm = resolve_hsm(self.crypto.hsm, self.hsm);
        IbpPeer {
            metadata,
            spec: IbpPeerSpec {
                common: self.component.into_common(MAIN_PROCESS, hsm),
                msp_id: self.msp_id,
                state_db: self.state_db.unwrap_or_default(),
                secret: Some(self.crypto.secret),
                config_override: self.config_override,
            },
            status: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePeerRequest {
    #[serde(flatten)]
    pub component: ComponentUpdate,
    /// Deprecated: use `crypto.hsm`, which wins when both are set
    #[serde(default)]
    pub hsm: Option<HsmBinding>,
    #[serde(default)]
    pub crypto: Option<CryptoRequest>,
    #[serde(default)]
    pub config_override: Option<Value>,
}

impl UpdatePeerRequest {
    pub fn validate(&self) -> Result<()> {
        self.component.validate()
    }

    pub fn into_patch(self) -> Result<Value> {
        let (nested_hsm, secret) = match self.crypto {
            Some(crypto) => (crypto.hsm, Some(crypto.secret).filter(|s| !s.is_empty())),
            None => (None, None),
        };

        let mut patch = SpecPatch::new();
        self.component.write(&mut patch, MAIN_PROCESS)?;
        patch
            .set("hsm", resolve_hsm(nested_hsm, self.hsm))?
            .set("secret", secret)?
            .set("configOverride", self.config_override)?;
        if patch.is_empty() {
            return Err(Error::ValidationError(
                "update request does not change any field".to_string(),
            ));
        }
        Ok(patch.into_document())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeerResponse {
    pub name: String,
    pub msp_id: String,
    pub state_db: StateDb,
    pub phase: Phase,
    #[serde(flatten)]
    pub component: ComponentView,
    /// Secret material with every private field redacted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crypto: Option<SecretSpec>,
    #[serde(default)]
    pub admin_certs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_override: Option<Value>,
}

impl ComponentDocument for IbpPeer {
    type Response = PeerResponse;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn status(&self) -> Option<&ComponentStatus> {
        self.status.as_ref()
    }

    fn into_response(self, phase: Phase) -> PeerResponse {
        let (crypto, admin_certs) = crypto_view(self.spec.secret);
        PeerResponse {
            name: self.metadata.name.clone().unwrap_or_default(),
            msp_id: self.spec.msp_id,
            state_db: self.spec.state_db,
            phase,
            component: ComponentView::new(&self.metadata, self.spec.common, self.status),
            crypto,
            admin_certs,
            config_override: self.spec.config_override,
        }
    }
}
