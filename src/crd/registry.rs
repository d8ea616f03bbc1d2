//! Resource kinds managed by the deployer
//!
//! Every kind lives under a single API group and version. The set is closed:
//! it is registered once into a [`Scheme`] at startup and never changes for
//! the lifetime of the process.

use std::collections::BTreeMap;
use std::fmt;

use kube::core::{ApiResource, GroupVersionKind};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// API group shared by all component kinds
pub const GROUP: &str = "ibp.com";

/// API version shared by all component kinds
pub const VERSION: &str = "v1beta1";

/// Custom resource kinds addressable through the lifecycle client
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    /// Fabric certificate authority
    Ca,
    /// Fabric peer
    Peer,
    /// Fabric ordering node
    Orderer,
    /// Operations console
    Console,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Ca,
        ResourceKind::Peer,
        ResourceKind::Orderer,
        ResourceKind::Console,
    ];

    /// Kind name as stored in the cluster
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceKind::Ca => "IBPCA",
            ResourceKind::Peer => "IBPPeer",
            ResourceKind::Orderer => "IBPOrderer",
            ResourceKind::Console => "IBPConsole",
        }
    }

    /// Kind name of the collection returned by list calls
    pub fn list_kind(&self) -> &'static str {
        match self {
            ResourceKind::Ca => "IBPCAList",
            ResourceKind::Peer => "IBPPeerList",
            ResourceKind::Orderer => "IBPOrdererList",
            ResourceKind::Console => "IBPConsoleList",
        }
    }

    /// Plural resource name used in API paths
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Ca => "ibpcas",
            ResourceKind::Peer => "ibppeers",
            ResourceKind::Orderer => "ibporderers",
            ResourceKind::Console => "ibpconsoles",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Type information recorded for one registered kind
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KindEntry {
    pub gvk: GroupVersionKind,
    pub plural: String,
    /// True for the collection kinds (e.g. `IBPCAList`)
    pub list: bool,
}

/// Serialization scheme mapping kind names to their API coordinates
#[derive(Clone, Debug, Default)]
pub struct Scheme {
    kinds: BTreeMap<String, KindEntry>,
}

impl Scheme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a kind. Registering the same kind twice is a programming error.
    pub fn add_known_type(&mut self, gvk: GroupVersionKind, plural: &str, list: bool) -> Result<()> {
        if self.kinds.contains_key(&gvk.kind) {
            return Err(Error::DuplicateKind(gvk.kind));
        }
        self.kinds.insert(
            gvk.kind.clone(),
            KindEntry {
                gvk,
                plural: plural.to_string(),
                list,
            },
        );
        Ok(())
    }

    pub fn recognizes(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    pub fn entry(&self, kind: &str) -> Option<&KindEntry> {
        self.kinds.get(kind)
    }

    /// Resolve the API coordinates used to address single resources of `kind`
    pub fn api_resource(&self, kind: ResourceKind) -> Result<ApiResource> {
        let entry = self
            .kinds
            .get(kind.kind())
            .filter(|entry| !entry.list)
            .ok_or_else(|| Error::UnregisteredKind(kind.kind().to_string()))?;
        Ok(ApiResource::from_gvk_with_plural(&entry.gvk, &entry.plural))
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Add every component kind and its list kind to `scheme`
pub fn register(scheme: &mut Scheme) -> Result<()> {
    for kind in ResourceKind::ALL {
        scheme.add_known_type(
            GroupVersionKind::gvk(GROUP, VERSION, kind.kind()),
            kind.plural(),
            false,
        )?;
        scheme.add_known_type(
            GroupVersionKind::gvk(GROUP, VERSION, kind.list_kind()),
            kind.plural(),
            true,
        )?;
    }
    Ok(())
}
