//! Axum HTTP server for the REST API

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::deployer::Deployer;
use crate::error::{Error, Result};

use super::handlers;

/// State shared by every request handler
pub struct AppState {
    pub deployer: Deployer,
    /// Namespace every component is managed in
    pub namespace: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/v1/components",
            axum::routing::delete(handlers::delete_component),
        )
        .route(
            "/api/v1/components/ca",
            post(handlers::create_ca).get(handlers::list_cas),
        )
        .route(
            "/api/v1/components/ca/{name}",
            get(handlers::get_ca).put(handlers::update_ca),
        )
        .route(
            "/api/v1/components/peer",
            post(handlers::create_peer).get(handlers::list_peers),
        )
        .route(
            "/api/v1/components/peer/{name}",
            get(handlers::get_peer).put(handlers::update_peer),
        )
        .route(
            "/api/v1/components/orderer",
            post(handlers::create_orderer).get(handlers::list_orderers),
        )
        .route(
            "/api/v1/components/orderer/{name}",
            get(handlers::get_orderer).put(handlers::update_orderer),
        )
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Run the REST API server
pub async fn run_server(state: Arc<AppState>, addr: SocketAddr) -> Result<()> {
    let app = router(state);
    info!("REST API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::ConfigError(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::ConfigError(format!("Server error: {}", e)))?;

    Ok(())
}
