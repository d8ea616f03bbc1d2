//! Runtime configuration for the deployer binary

use std::net::SocketAddr;

use clap::Parser;

#[derive(Clone, Debug, Parser)]
#[command(name = "fabric-deployer", version, about = "Deploys Fabric components as Kubernetes custom resources")]
pub struct Config {
    /// Namespace the components are managed in
    #[arg(long, env = "DEPLOYER_NAMESPACE", default_value = "default")]
    pub namespace: String,

    /// Address the REST API listens on
    #[arg(long, env = "DEPLOYER_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: SocketAddr,

    /// Emit logs as JSON lines
    #[arg(long, env = "DEPLOYER_LOG_JSON")]
    pub log_json: bool,

    /// Print the custom resource definitions as YAML and exit
    #[arg(long)]
    pub print_crds: bool,
}
