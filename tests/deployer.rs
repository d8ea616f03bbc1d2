//! Deployer operations end to end against an in-memory API server

mod support;

use http::Method;
use serde_json::{json, Value};

use fabric_deployer::crypto::REDACTED;
use fabric_deployer::error::Error;
use fabric_deployer::lifecycle::{Phase, Transition};
use fabric_deployer::model::common::LAST_UPDATED_ANNOTATION;
use fabric_deployer::model::{
    CreateCaRequest, CreateOrdererRequest, CreatePeerRequest, DeleteRequest, NodeType,
    UpdateCaRequest, UpdateOrdererRequest, UpdatePeerRequest,
};

use support::FakeCluster;

const NS: &str = "ns1";

fn peer_request() -> CreatePeerRequest {
    serde_json::from_value(json!({
        "name": "peer1",
        "mspId": "org1msp",
        "version": "2.5.4",
        "serviceId": "svc-42",
        "crypto": {
            "enrollment": {
                "component": {
                    "caHost": "ca1-ca.example.com",
                    "caPort": "443",
                    "enrollId": "peer1",
                    "enrollSecret": "peer1pw",
                    "adminCerts": ["enroll-admin"]
                },
                "tls": {
                    "caHost": "ca1-ca.example.com",
                    "enrollId": "peer1tls",
                    "enrollSecret": "tlspw"
                }
            },
            "msp": {
                "component": {
                    "keyStore": "cHJpdmF0ZQ==",
                    "signCerts": "sign-cert",
                    "adminCerts": ["msp-admin"]
                }
            }
        }
    }))
    .unwrap()
}

fn orderer_request() -> CreateOrdererRequest {
    serde_json::from_value(json!({
        "name": "ord1",
        "mspId": "orderermsp",
        "version": "2.5.4",
        "replicas": 1,
        "crypto": {
            "enrollment": {
                "component": {
                    "caHost": "ca1-ca.example.com",
                    "enrollId": "ord1",
                    "enrollSecret": "ord1pw"
                }
            }
        }
    }))
    .unwrap()
}

fn ca_request(name: &str) -> CreateCaRequest {
    serde_json::from_value(json!({"name": name, "version": "1.5.7"})).unwrap()
}

fn stored_secret_contains(stored: &Value, needle: &str) -> bool {
    stored["spec"]["secret"].to_string().contains(needle)
}

#[tokio::test]
async fn create_peer_reports_redacted_crypto() {
    let cluster = FakeCluster::new();
    let deployer = cluster.deployer();

    let response = deployer.create_peer(NS, peer_request()).await.unwrap();

    assert_eq!(response.name, "peer1");
    assert_eq!(response.phase, Phase::Creating);
    assert_eq!(response.component.service_id.as_deref(), Some("svc-42"));
    assert_eq!(response.component.created_at, Some(1_767_225_600_000));
    assert!(response.component.last_updated.is_some());
    // msp admin certs take precedence over enrollment ones
    assert_eq!(response.admin_certs, vec!["msp-admin"]);

    let crypto = response.crypto.as_ref().unwrap();
    let enrollment = crypto.enrollment.as_ref().unwrap();
    assert_eq!(enrollment.component.as_ref().unwrap().enroll_secret, REDACTED);
    assert_eq!(enrollment.tls.as_ref().unwrap().enroll_secret, REDACTED);
    assert_eq!(
        crypto.msp.as_ref().unwrap().component.as_ref().unwrap().key_store,
        REDACTED
    );

    let rendered = serde_json::to_string(&response).unwrap();
    assert!(!rendered.contains("peer1pw"));
    assert!(!rendered.contains("cHJpdmF0ZQ=="));

    // the cluster keeps the real material for the operator
    let stored = cluster.stored(NS, "ibppeers", "peer1").unwrap();
    assert!(stored_secret_contains(&stored, "peer1pw"));
    assert!(stored_secret_contains(&stored, "cHJpdmF0ZQ=="));
}

#[tokio::test]
async fn invalid_request_never_reaches_the_cluster() {
    let cluster = FakeCluster::new();
    let deployer = cluster.deployer();

    let mut request = peer_request();
    request.name = "Peer_1".to_string();
    let err = deployer.create_peer(NS, request).await.unwrap_err();

    assert!(matches!(err, Error::ValidationError(_)));
    assert_eq!(err.status_code(), 400);
    assert_eq!(cluster.requests(Method::POST), 0);
}

#[tokio::test]
async fn duplicate_create_is_rejected() {
    let cluster = FakeCluster::new();
    let deployer = cluster.deployer();

    deployer.create_orderer(NS, orderer_request()).await.unwrap();
    let err = deployer
        .create_orderer(NS, orderer_request())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AlreadyExists { .. }));
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn get_reflects_operator_status() {
    let cluster = FakeCluster::new();
    let deployer = cluster.deployer();
    deployer.create_peer(NS, peer_request()).await.unwrap();

    cluster.set_status(
        NS,
        "ibppeers",
        "peer1",
        json!({
            "type": "Deployed",
            "version": "2.5.4",
            "endpoints": {"api": "https://peer1.example.com:7051"}
        }),
    );

    let response = deployer.get_peer(NS, "peer1").await.unwrap();
    assert_eq!(response.phase, Phase::Ready);
    assert_eq!(response.component.reconciled_version.as_deref(), Some("2.5.4"));
    assert_eq!(
        response.component.endpoints.get("api").map(String::as_str),
        Some("https://peer1.example.com:7051")
    );
    assert_eq!(response.admin_certs, vec!["msp-admin"]);
}

#[tokio::test]
async fn get_missing_component_is_not_found() {
    let cluster = FakeCluster::new();
    let err = cluster.deployer().get_ca(NS, "ca9").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn list_reports_each_component_phase() {
    let cluster = FakeCluster::new();
    let deployer = cluster.deployer();
    deployer.create_ca(NS, ca_request("ca1")).await.unwrap();
    deployer.create_ca(NS, ca_request("ca2")).await.unwrap();
    cluster.set_status(NS, "ibpcas", "ca2", json!({"type": "Error", "message": "image pull failed"}));

    let cas = deployer.list_cas(NS).await.unwrap();
    assert_eq!(cas.len(), 2);
    assert_eq!(cas[0].name, "ca1");
    assert_eq!(cas[0].phase, Phase::Creating);
    assert_eq!(cas[1].phase, Phase::Failed);
    assert_eq!(cas[1].component.message.as_deref(), Some("image pull failed"));

    assert!(deployer.list_peers(NS).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_prefers_nested_hsm_binding() {
    let cluster = FakeCluster::new();
    let deployer = cluster.deployer();
    deployer.create_peer(NS, peer_request()).await.unwrap();

    let update: UpdatePeerRequest = serde_json::from_value(json!({
        "hsm": {"pkcs11Endpoint": "tcp://legacy-proxy:2345"},
        "crypto": {"hsm": {"pkcs11Endpoint": "tcp://pkcs11-proxy:2345"}}
    }))
    .unwrap();
    let response = deployer.update_peer(NS, "peer1", update).await.unwrap();

    assert_eq!(response.phase, Phase::Updating);
    assert_eq!(
        response.component.hsm.as_ref().unwrap().pkcs11_endpoint,
        "tcp://pkcs11-proxy:2345"
    );

    let stored = cluster.stored(NS, "ibppeers", "peer1").unwrap();
    assert_eq!(stored["spec"]["hsm"]["pkcs11Endpoint"], "tcp://pkcs11-proxy:2345");
    assert!(stored["metadata"]["annotations"][LAST_UPDATED_ANNOTATION].is_string());
    // untouched fields survive the patch
    assert_eq!(stored["spec"]["mspId"], "org1msp");
    assert!(stored_secret_contains(&stored, "peer1pw"));
}

#[tokio::test]
async fn update_to_zero_replicas_is_applied() {
    let cluster = FakeCluster::new();
    let deployer = cluster.deployer();
    deployer.create_orderer(NS, orderer_request()).await.unwrap();

    let update: UpdateOrdererRequest = serde_json::from_value(json!({"replicas": 0})).unwrap();
    let response = deployer.update_orderer(NS, "ord1", update).await.unwrap();

    assert_eq!(response.component.replicas, Some(0));
    let stored = cluster.stored(NS, "ibporderers", "ord1").unwrap();
    assert_eq!(stored["spec"]["replicas"], 0);
    assert_eq!(stored["spec"]["systemChannelName"], "testchainid");
}

#[tokio::test]
async fn failed_component_cannot_be_updated() {
    let cluster = FakeCluster::new();
    let deployer = cluster.deployer();
    deployer.create_ca(NS, ca_request("ca1")).await.unwrap();
    cluster.set_status(NS, "ibpcas", "ca1", json!({"type": "Error"}));

    let update: UpdateCaRequest = serde_json::from_value(json!({"version": "1.5.8"})).unwrap();
    let err = deployer.update_ca(NS, "ca1", update).await.unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidTransition {
            phase: Phase::Failed,
            transition: Transition::Update,
            ..
        }
    ));
    assert_eq!(err.status_code(), 409);
    assert_eq!(cluster.requests(Method::PATCH), 0);
}

#[tokio::test]
async fn empty_update_is_rejected() {
    let cluster = FakeCluster::new();
    let deployer = cluster.deployer();
    deployer.create_ca(NS, ca_request("ca1")).await.unwrap();

    let err = deployer
        .update_ca(NS, "ca1", UpdateCaRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ValidationError(_)));
}

#[tokio::test]
async fn delete_confirms_and_removes_component() {
    let cluster = FakeCluster::new();
    let deployer = cluster.deployer();
    deployer.create_orderer(NS, orderer_request()).await.unwrap();
    cluster.set_status(NS, "ibporderers", "ord1", json!({"type": "Error"}));

    let response = deployer
        .delete_component(
            NS,
            DeleteRequest {
                node_type: NodeType::Orderer,
                node_name: "ord1".to_string(),
                service_id: Some("svc-7".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(response.phase, Phase::Deleting);
    assert_eq!(response.node_type, NodeType::Orderer);
    assert_eq!(response.name, "ord1");
    assert_eq!(response.service_id.as_deref(), Some("svc-7"));
    assert!(cluster.stored(NS, "ibporderers", "ord1").is_none());
}

#[tokio::test]
async fn delete_of_missing_component_is_not_found() {
    let cluster = FakeCluster::new();
    let deployer = cluster.deployer();
    deployer.create_ca(NS, ca_request("ca1")).await.unwrap();

    let request: DeleteRequest =
        serde_json::from_value(json!({"nodeType": "orderer", "nodeName": "ord-missing"})).unwrap();
    let err = deployer.delete_component(NS, request).await.unwrap_err();

    assert!(matches!(err, Error::NotFound { .. }));
    assert_eq!(cluster.len(), 1);
}

#[tokio::test]
async fn partial_crypto_update_keeps_stored_credentials() {
    let cluster = FakeCluster::new();
    let deployer = cluster.deployer();
    deployer.create_peer(NS, peer_request()).await.unwrap();

    let update: UpdatePeerRequest = serde_json::from_value(json!({
        "crypto": {"enrollment": {"component": {"adminCerts": ["rotated-admin"]}}}
    }))
    .unwrap();
    deployer.update_peer(NS, "peer1", update).await.unwrap();

    let stored = cluster.stored(NS, "ibppeers", "peer1").unwrap();
    let component = &stored["spec"]["secret"]["enrollment"]["component"];
    assert_eq!(component["adminCerts"], json!(["rotated-admin"]));
    assert_eq!(component["enrollId"], "peer1");
    assert_eq!(component["enrollSecret"], "peer1pw");
    assert_eq!(component["caHost"], "ca1-ca.example.com");
    let msp = &stored["spec"]["secret"]["msp"]["component"];
    assert_eq!(msp["keyStore"], "cHJpdmF0ZQ==");
    assert_eq!(msp["signCerts"], "sign-cert");
}

#[tokio::test]
async fn storage_size_update_keeps_class() {
    let cluster = FakeCluster::new();
    let deployer = cluster.deployer();
    let request: CreateCaRequest = serde_json::from_value(json!({
        "name": "ca1",
        "version": "1.5.7",
        "storage": {"ca": {"class": "ssd", "size": "1Gi"}}
    }))
    .unwrap();
    deployer.create_ca(NS, request).await.unwrap();

    let update: UpdateCaRequest =
        serde_json::from_value(json!({"storage": {"ca": {"size": "2Gi"}}})).unwrap();
    let response = deployer.update_ca(NS, "ca1", update).await.unwrap();

    assert_eq!(response.component.storage["ca"].storage_class, "ssd");
    assert_eq!(response.component.storage["ca"].size, "2Gi");
    let stored = cluster.stored(NS, "ibpcas", "ca1").unwrap();
    assert_eq!(stored["spec"]["storage"]["ca"], json!({"class": "ssd", "size": "2Gi"}));
}

#[tokio::test]
async fn terminating_component_reports_deleting() {
    let cluster = FakeCluster::new();
    let deployer = cluster.deployer();
    deployer.create_ca(NS, ca_request("ca1")).await.unwrap();
    cluster.set_status(NS, "ibpcas", "ca1", json!({"type": "Deployed"}));
    cluster.mark_terminating(NS, "ibpcas", "ca1");

    let response = deployer.get_ca(NS, "ca1").await.unwrap();
    assert_eq!(response.phase, Phase::Deleting);

    let update: UpdateCaRequest = serde_json::from_value(json!({"replicas": 3})).unwrap();
    let err = deployer.update_ca(NS, "ca1", update).await.unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidTransition {
            phase: Phase::Deleting,
            ..
        }
    ));
    assert_eq!(cluster.requests(Method::PATCH), 0);
}

#[tokio::test]
async fn writes_answer_from_the_write_response() {
    let cluster = FakeCluster::new();
    let deployer = cluster.deployer();

    let created = deployer.create_ca(NS, ca_request("ca1")).await.unwrap();
    assert_eq!(created.component.created_at, Some(1_767_225_600_000));
    assert_eq!(cluster.requests(Method::GET), 0);

    let update: UpdateCaRequest = serde_json::from_value(json!({"replicas": 2})).unwrap();
    let updated = deployer.update_ca(NS, "ca1", update).await.unwrap();
    assert_eq!(updated.component.replicas, Some(2));
    // one read for the transition check, none after the patch
    assert_eq!(cluster.requests(Method::GET), 1);
}
