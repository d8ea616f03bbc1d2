//! Custom Resource Definitions for Fabric components
//!
//! This module defines the Kubernetes CRDs the deployer reads and writes,
//! and the registry of kinds the lifecycle client can address.

mod ca;
mod orderer;
mod peer;
pub mod registry;
mod secret;
mod types;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use ca::{CaConfigOverride, IbpCa, IbpCaSpec};
pub use orderer::{IbpOrderer, IbpOrdererSpec, ParentRef};
pub use peer::{IbpPeer, IbpPeerSpec, StateDb};
pub use registry::{register, ResourceKind, Scheme};
pub use secret::*;
pub use types::*;

/// A typed document stored as one custom resource of a fixed kind
pub trait ClusterDocument: Serialize + DeserializeOwned + Send {
    const KIND: ResourceKind;
}
