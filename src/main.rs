//! Fabric Deployer entry point
//!
//! Registers the component kinds, connects to the cluster and serves the REST API.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use kube::CustomResourceExt;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fabric_deployer::config::Config;
use fabric_deployer::crd::{register, IbpCa, IbpOrderer, IbpPeer, Scheme};
use fabric_deployer::deployer::Deployer;
use fabric_deployer::lifecycle::LifecycleClient;
use fabric_deployer::rest_api::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    if config.print_crds {
        let crds = [IbpCa::crd(), IbpPeer::crd(), IbpOrderer::crd()];
        let rendered = crds
            .iter()
            .map(serde_yaml::to_string)
            .collect::<Result<Vec<_>, _>>()
            .context("failed to render custom resource definitions")?;
        print!("{}", rendered.join("---\n"));
        return Ok(());
    }

    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }

    info!("Starting Fabric Deployer v{}", env!("CARGO_PKG_VERSION"));

    let mut scheme = Scheme::new();
    register(&mut scheme)?;
    info!("Registered {} resource kinds", scheme.len());

    let client = kube::Client::try_default()
        .await
        .context("failed to connect to Kubernetes cluster")?;
    info!("Connected to Kubernetes cluster");

    let lifecycle = LifecycleClient::new(client, Arc::new(scheme));
    let state = Arc::new(AppState {
        deployer: Deployer::new(lifecycle),
        namespace: config.namespace,
    });

    rest_api::run_server(state, config.listen_addr).await?;
    Ok(())
}
