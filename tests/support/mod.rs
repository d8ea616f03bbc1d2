//! In-memory stand-in for the cluster API server
//!
//! Serves the namespaced custom resource endpoints the lifecycle client
//! calls, with the status codes and `Status` bodies a real API server
//! returns for missing, duplicate, stale and malformed writes.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use http::{Method, Request, Response, StatusCode};
use kube::client::Body;
use serde_json::{json, Map, Value};

use fabric_deployer::crd::{register, Scheme};
use fabric_deployer::deployer::Deployer;
use fabric_deployer::lifecycle::LifecycleClient;

const API_PREFIX: &str = "/apis/ibp.com/v1beta1/namespaces/";

type Key = (String, String, String);

#[derive(Default)]
struct Store {
    objects: BTreeMap<Key, Value>,
    revision: u64,
    requests: Vec<(Method, String)>,
}

#[derive(Clone, Default)]
pub struct FakeCluster {
    store: Arc<Mutex<Store>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client whose every call is answered by this fake
    pub fn client(&self) -> kube::Client {
        let store = self.store.clone();
        let service = tower::service_fn(move |request: Request<Body>| {
            let store = store.clone();
            async move {
                let (parts, body) = request.into_parts();
                let body = body.collect_bytes().await.map(|b| b.to_vec()).unwrap_or_default();
                let response = store.lock().unwrap().handle(&parts.method, parts.uri.path(), &body);
                Ok::<_, Infallible>(response)
            }
        });
        kube::Client::new(service, "default")
    }

    pub fn lifecycle(&self) -> LifecycleClient {
        let mut scheme = Scheme::new();
        register(&mut scheme).unwrap();
        LifecycleClient::new(self.client(), Arc::new(scheme))
    }

    pub fn deployer(&self) -> Deployer {
        Deployer::new(self.lifecycle())
    }

    /// Raw stored object, as the operator would see it
    pub fn stored(&self, namespace: &str, plural: &str, name: &str) -> Option<Value> {
        let store = self.store.lock().unwrap();
        store.objects.get(&key(namespace, plural, name)).cloned()
    }

    /// Write a status the way the operator does through the status subresource
    pub fn set_status(&self, namespace: &str, plural: &str, name: &str, status: Value) {
        let mut store = self.store.lock().unwrap();
        let object = store
            .objects
            .get_mut(&key(namespace, plural, name))
            .expect("object to set status on");
        object["status"] = status;
    }

    /// Mark an object as terminating, as the API server does while finalizers run
    pub fn mark_terminating(&self, namespace: &str, plural: &str, name: &str) {
        let mut store = self.store.lock().unwrap();
        let object = store
            .objects
            .get_mut(&key(namespace, plural, name))
            .expect("object to mark terminating");
        object["metadata"]["deletionTimestamp"] = json!("2026-01-02T00:00:00Z");
    }

    pub fn len(&self) -> usize {
        self.store.lock().unwrap().objects.len()
    }

    /// Number of calls that reached the server with `method`
    pub fn requests(&self, method: Method) -> usize {
        let store = self.store.lock().unwrap();
        store.requests.iter().filter(|(m, _)| *m == method).count()
    }
}

fn key(namespace: &str, plural: &str, name: &str) -> Key {
    (namespace.to_string(), plural.to_string(), name.to_string())
}

impl Store {
    fn handle(&mut self, method: &Method, path: &str, body: &[u8]) -> Response<Body> {
        self.requests.push((method.clone(), path.to_string()));

        let Some(rest) = path.strip_prefix(API_PREFIX) else {
            return failure(StatusCode::NOT_FOUND, "NotFound", "the server could not find the requested resource");
        };
        let segments: Vec<&str> = rest.split('/').collect();
        let (namespace, plural, name) = match segments.as_slice() {
            [namespace, plural] => (*namespace, *plural, None),
            [namespace, plural, name] => (*namespace, *plural, Some(*name)),
            _ => return failure(StatusCode::NOT_FOUND, "NotFound", "unsupported path"),
        };
        let body: Option<Value> = serde_json::from_slice(body).ok();

        match (method, name) {
            (&Method::GET, None) => self.list(namespace, plural),
            (&Method::GET, Some(name)) => self.get(namespace, plural, name),
            (&Method::POST, None) => self.create(namespace, plural, body.unwrap_or(Value::Null)),
            (&Method::PUT, Some(name)) => self.replace(namespace, plural, name, body.unwrap_or(Value::Null)),
            (&Method::PATCH, Some(name)) => self.patch(namespace, plural, name, body.unwrap_or(Value::Null)),
            (&Method::DELETE, Some(name)) => self.delete(namespace, plural, name),
            _ => failure(StatusCode::METHOD_NOT_ALLOWED, "MethodNotAllowed", "method not allowed"),
        }
    }

    fn list(&self, namespace: &str, plural: &str) -> Response<Body> {
        let items: Vec<Value> = self
            .objects
            .iter()
            .filter(|((ns, p, _), _)| ns == namespace && p == plural)
            .map(|(_, object)| object.clone())
            .collect();
        let kind = items
            .first()
            .and_then(|item| item["kind"].as_str())
            .map(|kind| format!("{}List", kind))
            .unwrap_or_else(|| "List".to_string());
        respond(
            StatusCode::OK,
            &json!({
                "apiVersion": "ibp.com/v1beta1",
                "kind": kind,
                "metadata": {"resourceVersion": self.revision.to_string()},
                "items": items,
            }),
        )
    }

    fn get(&self, namespace: &str, plural: &str, name: &str) -> Response<Body> {
        match self.objects.get(&key(namespace, plural, name)) {
            Some(object) => respond(StatusCode::OK, object),
            None => not_found(plural, name),
        }
    }

    fn create(&mut self, namespace: &str, plural: &str, mut object: Value) -> Response<Body> {
        let Some(name) = object["metadata"]["name"].as_str().map(str::to_string) else {
            return failure(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid",
                "metadata.name: Required value: name or generateName is required",
            );
        };
        let key = key(namespace, plural, &name);
        if self.objects.contains_key(&key) {
            return failure(
                StatusCode::CONFLICT,
                "AlreadyExists",
                &format!("{}.ibp.com \"{}\" already exists", plural, name),
            );
        }

        self.revision += 1;
        if let Some(fields) = object.as_object_mut() {
            fields.remove("status");
        }
        let metadata = &mut object["metadata"];
        metadata["namespace"] = json!(namespace);
        metadata["uid"] = json!(format!("uid-{}", self.revision));
        metadata["resourceVersion"] = json!(self.revision.to_string());
        metadata["creationTimestamp"] = json!("2026-01-01T00:00:00Z");

        self.objects.insert(key, object.clone());
        respond(StatusCode::CREATED, &object)
    }

    fn replace(&mut self, namespace: &str, plural: &str, name: &str, mut object: Value) -> Response<Body> {
        let key = key(namespace, plural, name);
        let Some(current) = self.objects.get(&key) else {
            return not_found(plural, name);
        };
        let current_version = current["metadata"]["resourceVersion"].clone();
        let status = current.get("status").cloned();
        let created = current["metadata"]["creationTimestamp"].clone();
        let uid = current["metadata"]["uid"].clone();
        if let Some(version) = object["metadata"]["resourceVersion"].as_str() {
            if Some(version) != current_version.as_str() {
                return failure(
                    StatusCode::CONFLICT,
                    "Conflict",
                    &format!(
                        "Operation cannot be fulfilled on {}.ibp.com \"{}\": the object has been modified",
                        plural, name
                    ),
                );
            }
        }

        self.revision += 1;
        if let Some(fields) = object.as_object_mut() {
            fields.remove("status");
            if let Some(status) = status {
                fields.insert("status".to_string(), status);
            }
        }
        let metadata = &mut object["metadata"];
        metadata["namespace"] = json!(namespace);
        metadata["uid"] = uid;
        metadata["creationTimestamp"] = created;
        metadata["resourceVersion"] = json!(self.revision.to_string());

        self.objects.insert(key, object.clone());
        respond(StatusCode::OK, &object)
    }

    fn patch(&mut self, namespace: &str, plural: &str, name: &str, mut patch: Value) -> Response<Body> {
        let key = key(namespace, plural, name);
        if !self.objects.contains_key(&key) {
            return not_found(plural, name);
        }
        if let Some(fields) = patch.as_object_mut() {
            fields.remove("status");
        }

        self.revision += 1;
        let revision = self.revision.to_string();
        let Some(object) = self.objects.get_mut(&key) else {
            return not_found(plural, name);
        };
        merge(object, patch);
        object["metadata"]["resourceVersion"] = json!(revision);
        respond(StatusCode::OK, object)
    }

    fn delete(&mut self, namespace: &str, plural: &str, name: &str) -> Response<Body> {
        match self.objects.remove(&key(namespace, plural, name)) {
            Some(object) => respond(StatusCode::OK, &object),
            None => not_found(plural, name),
        }
    }
}

/// JSON merge patch: `null` removes, objects merge, anything else replaces
fn merge(target: &mut Value, patch: Value) {
    match patch {
        Value::Object(fields) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(existing) = target {
                for (field, value) in fields {
                    if value.is_null() {
                        existing.remove(&field);
                    } else {
                        merge(existing.entry(field).or_insert(Value::Null), value);
                    }
                }
            }
        }
        other => *target = other,
    }
}

fn respond(status: StatusCode, body: &Value) -> Response<Body> {
    let bytes = serde_json::to_vec(body).unwrap();
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(bytes))
        .unwrap()
}

fn not_found(plural: &str, name: &str) -> Response<Body> {
    failure(
        StatusCode::NOT_FOUND,
        "NotFound",
        &format!("{}.ibp.com \"{}\" not found", plural, name),
    )
}

fn failure(status: StatusCode, reason: &str, message: &str) -> Response<Body> {
    respond(
        status,
        &json!({
            "kind": "Status",
            "apiVersion": "v1",
            "metadata": {},
            "status": "Failure",
            "message": message,
            "reason": reason,
            "code": status.as_u16(),
        }),
    )
}
