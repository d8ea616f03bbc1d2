//! Certificate authority requests and responses

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{new_metadata, validate_name, ComponentRequest, ComponentUpdate, ComponentView, SpecPatch};
use super::ComponentDocument;
use crate::crd::{CaConfigOverride, ComponentStatus, HsmBinding, IbpCa, IbpCaSpec};
use crate::error::{Error, Result};
use crate::lifecycle::Phase;

const MAIN_PROCESS: &str = "ca";
const DEFAULT_CA_NAME: &str = "ca";
const DEFAULT_TLSCA_NAME: &str = "tlsca";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaRequest {
    pub name: String,
    #[serde(default)]
    pub ca_name: Option<String>,
    #[serde(default)]
    pub tlsca_name: Option<String>,
    #[serde(flatten)]
    pub component: ComponentRequest,
    #[serde(default)]
    pub hsm: Option<HsmBinding>,
    #[serde(default)]
    pub config_override: Option<CaConfigOverride>,
}

impl CreateCaRequest {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        self.component.validate()?;
        if self.ca_name.is_some() && self.ca_name == self.tlsca_name {
            return Err(Error::ValidationError(
                "caName and tlscaName must differ".to_string(),
            ));
        }
        Ok(())
    }

    pub fn into_document(self, namespace: &str) -> IbpCa {
        let metadata = new_metadata(&self.name, namespace, self.component.service_id.as_deref());
        IbpCa {
            metadata,
            spec: IbpCaSpec {
                common: self.component.into_common(MAIN_PROCESS, self.hsm),
                ca_name: self.ca_name.unwrap_or_else(|| DEFAULT_CA_NAME.to_string()),
                tlsca_name: self
                    .tlsca_name
                    .unwrap_or_else(|| DEFAULT_TLSCA_NAME.to_string()),
                config_override: self.config_override,
            },
            status: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCaRequest {
    #[serde(flatten)]
    pub component: ComponentUpdate,
    #[serde(default)]
    pub hsm: Option<HsmBinding>,
    #[serde(default)]
    pub config_override: Option<CaConfigOverride>,
}

impl UpdateCaRequest {
    pub fn validate(&self) -> Result<()> {
        self.component.validate()
    }

    pub fn into_patch(self) -> Result<Value> {
        let mut patch = SpecPatch::new();
        self.component.write(&mut patch, MAIN_PROCESS)?;
        patch
            .set("hsm", self.hsm)?
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
pub struct CaResponse {
    pub name: String,
    pub ca_name: String,
    pub tlsca_name: String,
    pub phase: Phase,
    #[serde(flatten)]
    pub component: ComponentView,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_override: Option<CaConfigOverride>,
}

impl ComponentDocument for IbpCa {
    type Response = CaResponse;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn status(&self) -> Option<&ComponentStatus> {
        self.status.as_ref()
    }

    fn into_response(self, phase: Phase) -> CaResponse {
        CaResponse {
            name: self.metadata.name.clone().unwrap_or_default(),
            ca_name: self.spec.ca_name,
            tlsca_name: self.spec.tlsca_name,
            phase,
            component: ComponentView::new(&self.metadata, self.spec.common, self.status),
            config_override: self.spec.config_override,
        }
    }
}
