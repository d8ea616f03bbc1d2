//! Request handlers for the REST API

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

use super::dto::{ErrorResponse, HealthResponse, ListResponse};
use super::server::AppState;
use crate::error::Error;
use crate::model::{
    CaResponse, CreateCaRequest, CreateOrdererRequest, CreatePeerRequest, DeleteRequest,
    DeleteResponse, OrdererResponse, PeerResponse, UpdateCaRequest, UpdateOrdererRequest,
    UpdatePeerRequest,
};

/// Deployer error rendered as an HTTP response
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!("Request failed: {}", self.0);
        }
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn create_ca(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateCaRequest>,
) -> Result<(StatusCode, Json<CaResponse>), ApiError> {
    let response = state.deployer.create_ca(&state.namespace, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_cas(State(state): State<Arc<AppState>>) -> ApiResult<ListResponse<CaResponse>> {
    let items = state.deployer.list_cas(&state.namespace).await?;
    Ok(Json(items.into()))
}

pub async fn get_ca(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> ApiResult<CaResponse> {
    Ok(Json(state.deployer.get_ca(&state.namespace, &name).await?))
}

pub async fn update_ca(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<UpdateCaRequest>,
) -> ApiResult<CaResponse> {
    Ok(Json(
        state
            .deployer
            .update_ca(&state.namespace, &name, request)
            .await?,
    ))
}

pub async fn create_peer(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePeerRequest>,
) -> Result<(StatusCode, Json<PeerResponse>), ApiError> {
    let response = state.deployer.create_peer(&state.namespace, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_peers(State(state): State<Arc<AppState>>) -> ApiResult<ListResponse<PeerResponse>> {
    let items = state.deployer.list_peers(&state.namespace).await?;
    Ok(Json(items.into()))
}

pub async fn get_peer(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> ApiResult<PeerResponse> {
    Ok(Json(state.deployer.get_peer(&state.namespace, &name).await?))
}

pub async fn update_peer(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<UpdatePeerRequest>,
) -> ApiResult<PeerResponse> {
    Ok(Json(
        state
            .deployer
            .update_peer(&state.namespace, &name, request)
            .await?,
    ))
}

pub async fn create_orderer(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateOrdererRequest>,
) -> Result<(StatusCode, Json<OrdererResponse>), ApiError> {
    let response = state
        .deployer
        .create_orderer(&state.namespace, request)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_orderers(State(state): State<Arc<AppState>>) -> ApiResult<ListResponse<OrdererResponse>> {
    let items = state.deployer.list_orderers(&state.namespace).await?;
    Ok(Json(items.into()))
}

pub async fn get_orderer(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<OrdererResponse> {
    Ok(Json(state.deployer.get_orderer(&state.namespace, &name).await?))
}

pub async fn update_orderer(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<UpdateOrdererRequest>,
) -> ApiResult<OrdererResponse> {
    Ok(Json(
        state
            .deployer
            .update_orderer(&state.namespace, &name, request)
            .await?,
    ))
}

pub async fn delete_component(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DeleteRequest>,
) -> ApiResult<DeleteResponse> {
    Ok(Json(
        state
            .deployer
            .delete_component(&state.namespace, request)
            .await?,
    ))
}
