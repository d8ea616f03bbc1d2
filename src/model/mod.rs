//! Request and response schemas for each node type
//!
//! Requests are validated and translated into custom resource documents (or
//! merge patches for updates); stored documents are projected back into
//! responses with private key material redacted.

mod ca;
pub mod common;
mod orderer;
mod peer;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::Serialize;

use crate::crd::{ClusterDocument, ComponentStatus};
use crate::lifecycle::Phase;

pub use ca::{CaResponse, CreateCaRequest, UpdateCaRequest};
pub use common::{
    ComponentRequest, ComponentUpdate, ComponentView, CryptoRequest, DeleteRequest, DeleteResponse,
    NodeType, Resources,
};
pub use orderer::{CreateOrdererRequest, OrdererResponse, UpdateOrdererRequest};
pub use peer::{CreatePeerRequest, PeerResponse, UpdatePeerRequest};

/// A stored component that can be reported back to a deployer client
pub trait ComponentDocument: ClusterDocument {
    type Response: Serialize;

    fn metadata(&self) -> &ObjectMeta;

    fn status(&self) -> Option<&ComponentStatus>;

    /// Phase implied by the stored object and its operator status
    fn observed_phase(&self) -> Phase {
        Phase::observed(self.metadata(), self.status())
    }

    fn into_response(self, phase: Phase) -> Self::Response;
}
