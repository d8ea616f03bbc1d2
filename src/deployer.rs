//! Deployer operations exposed to clients
//!
//! Each operation validates the request, translates it into a custom
//! resource document or merge patch, issues one lifecycle transition and
//! reports the cluster's synchronous answer. Convergence is left to the
//! operator; nothing here polls or retries.

use tracing::{info, instrument, warn};

use crate::crd::{IbpCa, IbpOrderer, IbpPeer};
use crate::error::{Error, Result};
use crate::lifecycle::{LifecycleClient, Phase, Transition};
use crate::model::{
    CaResponse, ComponentDocument, CreateCaRequest, CreateOrdererRequest, CreatePeerRequest,
    DeleteRequest, DeleteResponse, OrdererResponse, PeerResponse, UpdateCaRequest,
    UpdateOrdererRequest, UpdatePeerRequest,
};

#[derive(Clone)]
pub struct Deployer {
    lifecycle: LifecycleClient,
}

impl Deployer {
    pub fn new(lifecycle: LifecycleClient) -> Self {
        Self { lifecycle }
    }

    pub fn lifecycle(&self) -> &LifecycleClient {
        &self.lifecycle
    }

    // ========================================================================
    // Certificate authorities
    // ========================================================================

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_ca(&self, namespace: &str, request: CreateCaRequest) -> Result<CaResponse> {
        request.validate()?;
        let name = request.name.clone();
        self.create(namespace, &name, request.into_document(namespace))
            .await
    }

    pub async fn get_ca(&self, namespace: &str, name: &str) -> Result<CaResponse> {
        self.get::<IbpCa>(namespace, name).await
    }

    pub async fn list_cas(&self, namespace: &str) -> Result<Vec<CaResponse>> {
        self.list::<IbpCa>(namespace).await
    }

    #[instrument(skip(self, request))]
    pub async fn update_ca(&self, namespace: &str, name: &str, request: UpdateCaRequest) -> Result<CaResponse> {
        request.validate()?;
        self.update::<IbpCa>(namespace, name, request.into_patch()?)
            .await
    }

    // ========================================================================
    // Peers
    // ========================================================================

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_peer(&self, namespace: &str, request: CreatePeerRequest) -> Result<PeerResponse> {
        request.validate()?;
        let name = request.name.clone();
        self.create(namespace, &name, request.into_document(namespace))
            .await
    }

    pub async fn get_peer(&self, namespace: &str, name: &str) -> Result<PeerResponse> {
        self.get::<IbpPeer>(namespace, name).await
    }

    pub async fn list_peers(&self, namespace: &str) -> Result<Vec<PeerResponse>> {
        self.list::<IbpPeer>(namespace).await
    }

    #[instrument(skip(self, request))]
    pub async fn update_peer(
        &self,
        namespace: &str,
        name: &str,
        request: UpdatePeerRequest,
    ) -> Result<PeerResponse> {
        request.validate()?;
        self.update::<IbpPeer>(namespace, name, request.into_patch()?)
            .await
    }

    // ========================================================================
    // Orderers
    // ========================================================================

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_orderer(
        &self,
        namespace: &str,
        request: CreateOrdererRequest,
    ) -> Result<OrdererResponse> {
        request.validate()?;
        let name = request.name.clone();
        self.create(namespace, &name, request.into_document(namespace))
            .await
    }

    pub async fn get_orderer(&self, namespace: &str, name: &str) -> Result<OrdererResponse> {
        self.get::<IbpOrderer>(namespace, name).await
    }

    pub async fn list_orderers(&self, namespace: &str) -> Result<Vec<OrdererResponse>> {
        self.list::<IbpOrderer>(namespace).await
    }

    #[instrument(skip(self, request))]
    pub async fn update_orderer(
        &self,
        namespace: &str,
        name: &str,
        request: UpdateOrdererRequest,
    ) -> Result<OrdererResponse> {
        request.validate()?;
        self.update::<IbpOrderer>(namespace, name, request.into_patch()?)
            .await
    }

    // ========================================================================
    // Any node type
    // ========================================================================

    /// Request deletion of a component, addressed by node name only
    #[instrument(skip(self, request), fields(node_type = %request.node_type, name = %request.node_name))]
    pub async fn delete_component(&self, namespace: &str, request: DeleteRequest) -> Result<DeleteResponse> {
        let kind = request.node_type.kind();
        self.lifecycle
            .delete(namespace, kind, &request.node_name)
            .await?;

        info!(
            service_id = request.service_id.as_deref().unwrap_or("-"),
            "Deletion of {} {}/{} accepted", kind, namespace, request.node_name
        );
        Ok(DeleteResponse {
            message: format!("{} {} is being deleted", request.node_type, request.node_name),
            node_type: request.node_type,
            name: request.node_name,
            phase: Phase::accepted(Transition::Delete),
            service_id: request.service_id,
        })
    }

    async fn create<C: ComponentDocument>(&self, namespace: &str, name: &str, document: C) -> Result<C::Response> {
        let stored = self.lifecycle.create(namespace, C::KIND, &document).await?;
        info!("Created {} {}/{}", C::KIND, namespace, name);
        Ok(stored.into_response(Phase::accepted(Transition::Create)))
    }

    async fn get<C: ComponentDocument>(&self, namespace: &str, name: &str) -> Result<C::Response> {
        let document: C = self.lifecycle.get(namespace, C::KIND, name).await?;
        let phase = document.observed_phase();
        Ok(document.into_response(phase))
    }

    async fn list<C: ComponentDocument>(&self, namespace: &str) -> Result<Vec<C::Response>> {
        let documents: Vec<C> = self.lifecycle.list(namespace, C::KIND).await?;
        Ok(documents
            .into_iter()
            .map(|document| {
                let phase = document.observed_phase();
                document.into_response(phase)
            })
            .collect())
    }

    async fn update<C: ComponentDocument>(
        &self,
        namespace: &str,
        name: &str,
        patch: serde_json::Value,
    ) -> Result<C::Response> {
        let current: C = self.lifecycle.get(namespace, C::KIND, name).await?;
        let phase = current.observed_phase();
        if !phase.permits(Transition::Update) {
            warn!("Refusing to update {} {}/{} while {}", C::KIND, namespace, name, phase);
            return Err(Error::InvalidTransition {
                name: name.to_string(),
                phase,
                transition: Transition::Update,
            });
        }

        let updated: C = self.lifecycle.patch(namespace, C::KIND, name, &patch).await?;
        info!("Updated {} {}/{}", C::KIND, namespace, name);
        Ok(updated.into_response(Phase::accepted(Transition::Update)))
    }
}
