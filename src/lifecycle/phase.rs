//! Component lifecycle phases
//!
//! `absent -> creating -> ready -> updating -> ready -> deleting -> absent`,
//! with `failed` reachable whenever the cluster reports an error. The
//! deployer only issues transition requests; convergence is driven by the
//! operator and observed through the resource status.

use std::fmt;

use serde::{Deserialize, Serialize};

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::crd::ComponentStatus;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Absent,
    Creating,
    Ready,
    Updating,
    Deleting,
    Failed,
}

/// A change requested by a deployer client
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Create,
    Update,
    Delete,
}

impl Phase {
    /// Phase implied by the stored object. A pending deletion wins over
    /// whatever status the operator last wrote.
    pub fn observed(metadata: &ObjectMeta, status: Option<&ComponentStatus>) -> Phase {
        if metadata.deletion_timestamp.is_some() {
            return Phase::Deleting;
        }
        match status.and_then(|s| s.phase.as_deref()) {
            Some("Deployed") => Phase::Ready,
            Some("Error") => Phase::Failed,
            Some("Deleting") => Phase::Deleting,
            _ => Phase::Creating,
        }
    }

    /// Phase reported once the cluster accepted `transition`
    pub fn accepted(transition: Transition) -> Phase {
        match transition {
            Transition::Create => Phase::Creating,
            Transition::Update => Phase::Updating,
            Transition::Delete => Phase::Deleting,
        }
    }

    pub fn permits(self, transition: Transition) -> bool {
        match transition {
            Transition::Create => self == Phase::Absent,
            Transition::Update => matches!(self, Phase::Creating | Phase::Ready | Phase::Updating),
            // failed components must stay removable
            Transition::Delete => self != Phase::Absent,
        }
    }

    /// Phase once the operator has converged
    pub fn settled(self) -> Phase {
        match self {
            Phase::Creating | Phase::Updating => Phase::Ready,
            Phase::Deleting => Phase::Absent,
            other => other,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Absent => "absent",
            Phase::Creating => "creating",
            Phase::Ready => "ready",
            Phase::Updating => "updating",
            Phase::Deleting => "deleting",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Create => write!(f, "create"),
            Transition::Update => write!(f, "update"),
            Transition::Delete => write!(f, "delete"),
        }
    }
}
