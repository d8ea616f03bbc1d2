//! Cryptographic material carried by peers and orderers
//!
//! A [`SecretSpec`] has two independent sources of identity: enrollment
//! credentials used to obtain certificates from a CA, and MSP material that
//! was generated elsewhere and is supplied directly. Each source has one
//! entry per role (component, TLS, client authentication).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecretSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<EnrollmentSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msp: Option<MspSpec>,
}

impl SecretSpec {
    pub fn is_empty(&self) -> bool {
        self.enrollment.is_none() && self.msp.is_none()
    }

    /// True when either branch carries a component identity
    pub fn has_component_identity(&self) -> bool {
        let enrolled = self
            .enrollment
            .as_ref()
            .is_some_and(|e| e.component.is_some());
        let supplied = self.msp.as_ref().is_some_and(|m| m.component.is_some());
        enrolled || supplied
    }
}

/// Enrollment credentials per role
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<Enrollment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<Enrollment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_auth: Option<Enrollment>,
}

impl EnrollmentSpec {
    pub fn roles_mut(&mut self) -> impl Iterator<Item = &mut Enrollment> {
        [
            self.component.as_mut(),
            self.tls.as_mut(),
            self.client_auth.as_mut(),
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_name: Option<String>,
    /// Base64 PEM of the CA's TLS certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_tls_cert: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub enroll_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub enroll_secret: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub admin_certs: Vec<String>,
    /// Subject alternative names requested for the certificate
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub csr_hosts: Vec<String>,
}

/// Pre-generated MSP material per role
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MspSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<Msp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<Msp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_auth: Option<Msp>,
}

impl MspSpec {
    pub fn roles_mut(&mut self) -> impl Iterator<Item = &mut Msp> {
        [
            self.component.as_mut(),
            self.tls.as_mut(),
            self.client_auth.as_mut(),
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Msp {
    /// Base64 private key
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key_store: String,
    /// Base64 PEM signing certificate
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sign_certs: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ca_certs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intermediate_certs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub admin_certs: Vec<String>,
}
