//! Namespace-scoped CRUD against any registered component kind
//!
//! All calls go through one `Api<DynamicObject>` code path; typed documents
//! are converted through `serde_json` at the edges so shape-specific mapping
//! stays in the model.

use std::fmt::Debug;
use std::sync::Arc;

use kube::api::{Api, DeleteParams, DynamicObject, ListParams, Patch, PatchParams, PostParams};
use kube::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::crd::{ResourceKind, Scheme};
use crate::error::{Error, Operation, OperationContext, Result};

/// Typed client over the cluster resource API
///
/// Holds only the transport handle and the registered scheme, so it can be
/// cloned freely and shared between concurrent callers. Concurrent writes to
/// the same resource are ordered solely by the cluster's resource version.
#[derive(Clone)]
pub struct LifecycleClient {
    client: Client,
    scheme: Arc<Scheme>,
}

impl LifecycleClient {
    pub fn new(client: Client, scheme: Arc<Scheme>) -> Self {
        Self { client, scheme }
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    fn api(&self, namespace: &str, kind: ResourceKind) -> Result<Api<DynamicObject>> {
        let resource = self.scheme.api_resource(kind)?;
        Ok(Api::namespaced_with(self.client.clone(), namespace, &resource))
    }

    /// Fetch one resource and decode it into `T`
    pub async fn get<T: DeserializeOwned>(&self, namespace: &str, kind: ResourceKind, name: &str) -> Result<T> {
        let context = OperationContext::new(Operation::Get, namespace, kind, Some(name));
        let api = self.api(namespace, kind)?;

        debug!("Fetching {} {}/{}", kind, namespace, name);
        let object = api
            .get(name)
            .await
            .map_err(|e| Error::from_kube(context.clone(), e))?;
        decode(&context, object)
    }

    /// Fetch every resource of `kind` in the namespace
    pub async fn list<T: DeserializeOwned>(&self, namespace: &str, kind: ResourceKind) -> Result<Vec<T>> {
        let context = OperationContext::new(Operation::List, namespace, kind, None);
        let api = self.api(namespace, kind)?;

        let objects = api
            .list(&ListParams::default())
            .await
            .map_err(|e| Error::from_kube(context.clone(), e))?;
        debug!("Listed {} {} in {}", objects.items.len(), kind, namespace);

        objects
            .items
            .into_iter()
            .map(|object| decode(&context, object))
            .collect()
    }

    /// Create a resource; the name is taken from the document's metadata.
    /// Returns the object as stored by the cluster.
    pub async fn create<D>(&self, namespace: &str, kind: ResourceKind, document: &D) -> Result<D>
    where
        D: Serialize + DeserializeOwned,
    {
        let mut context = OperationContext::new(Operation::Create, namespace, kind, None);
        let object = encode(&context, document)?;
        context.name = object.metadata.name.clone();
        let api = self.api(namespace, kind)?;

        let created = api
            .create(&PostParams::default(), &object)
            .await
            .map_err(|e| Error::from_kube(context.clone(), e))?;
        debug!(
            "Created {} {}/{}",
            kind,
            namespace,
            context.name.as_deref().unwrap_or_default()
        );
        decode(&context, created)
    }

    /// Replace the whole document. The cluster rejects the write with a
    /// conflict when `metadata.resourceVersion` is stale.
    pub async fn update<D>(&self, namespace: &str, kind: ResourceKind, name: &str, document: &D) -> Result<D>
    where
        D: Serialize + DeserializeOwned,
    {
        let context = OperationContext::new(Operation::Update, namespace, kind, Some(name));
        let object = encode(&context, document)?;
        let api = self.api(namespace, kind)?;

        let replaced = api
            .replace(name, &PostParams::default(), &object)
            .await
            .map_err(|e| Error::from_kube(context.clone(), e))?;
        debug!("Replaced {} {}/{}", kind, namespace, name);
        decode(&context, replaced)
    }

    /// Apply a JSON merge patch: present fields overwrite, absent fields are
    /// untouched, arrays are replaced wholesale. Returns the patched object.
    pub async fn patch<T: DeserializeOwned>(
        &self,
        namespace: &str,
        kind: ResourceKind,
        name: &str,
        partial: &(impl Serialize + Debug),
    ) -> Result<T> {
        let context = OperationContext::new(Operation::Patch, namespace, kind, Some(name));
        let api = self.api(namespace, kind)?;

        let patched = api
            .patch(name, &PatchParams::default(), &Patch::Merge(partial))
            .await
            .map_err(|e| Error::from_kube(context.clone(), e))?;
        debug!("Patched {} {}/{}", kind, namespace, name);
        decode(&context, patched)
    }

    /// Request deletion. Success means the cluster accepted the request; the
    /// resource may linger while it terminates.
    pub async fn delete(&self, namespace: &str, kind: ResourceKind, name: &str) -> Result<()> {
        let context = OperationContext::new(Operation::Delete, namespace, kind, Some(name));
        let api = self.api(namespace, kind)?;

        api.delete(name, &DeleteParams::default())
            .await
            .map_err(|e| Error::from_kube(context.clone(), e))?;
        debug!("Deletion accepted for {} {}/{}", kind, namespace, name);
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(context: &OperationContext, object: DynamicObject) -> Result<T> {
    serde_json::to_value(object)
        .and_then(serde_json::from_value)
        .map_err(|source| Error::Serialization {
            context: context.clone(),
            source,
        })
}

fn encode<D: Serialize>(context: &OperationContext, document: &D) -> Result<DynamicObject> {
    serde_json::to_value(document)
        .and_then(serde_json::from_value)
        .map_err(|source| Error::Serialization {
            context: context.clone(),
            source,
        })
}
