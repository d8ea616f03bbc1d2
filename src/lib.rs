//! Fabric Deployer: control plane for Hyperledger Fabric components on Kubernetes
//!
//! Certificate authorities, peers and ordering nodes are represented as
//! `ibp.com/v1beta1` custom resources. This crate validates deployment
//! requests, writes the matching resources through the cluster API and
//! reports what the cluster accepted; an external operator reconciles them.

pub mod config;
pub mod crd;
pub mod crypto;
pub mod deployer;
pub mod error;
pub mod lifecycle;
pub mod model;

#[cfg(feature = "rest-api")]
pub mod rest_api;

pub use crate::error::{Error, Result};
