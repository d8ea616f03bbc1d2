//! Handling rules for component cryptographic material
//!
//! Private keys and enrollment secrets never leave the deployer: responses
//! are scrubbed with [`redact_private_material`] before they are returned.

use crate::crd::SecretSpec;

/// Marker written over every private field by [`redact_private_material`]
pub const REDACTED: &str = "redacted";

/// Admin certificates of the component identity.
///
/// MSP material wins over enrollment whenever it carries admin certificates
/// of its own; the two lists are never merged.
pub fn extract_admin_certificates(spec: &SecretSpec) -> Vec<String> {
    let supplied = spec
        .msp
        .as_ref()
        .and_then(|msp| msp.component.as_ref())
        .filter(|component| !component.admin_certs.is_empty());
    if let Some(component) = supplied {
        return component.admin_certs.clone();
    }

    spec.enrollment
        .as_ref()
        .and_then(|enrollment| enrollment.component.as_ref())
        .map(|component| component.admin_certs.clone())
        .unwrap_or_default()
}

/// Overwrite every key store and enroll secret in place. Identifiers and
/// certificates are left as they are. Idempotent.
pub fn redact_private_material(spec: &mut SecretSpec) {
    if let Some(enrollment) = spec.enrollment.as_mut() {
        for role in enrollment.roles_mut() {
            role.enroll_secret = REDACTED.to_string();
        }
    }
    if let Some(msp) = spec.msp.as_mut() {
        for role in msp.roles_mut() {
            role.key_store = REDACTED.to_string();
        }
    }
}
