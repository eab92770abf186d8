//! End-to-end signing flow against a mocked CA backend.
//!
//! Exercises the orchestrator with the real Cloudflare backend pointed at
//! a wiremock server: credential gating, error classification for CA
//! failures, and chain parsing of successful responses.

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use certgate::{
    CloudflareBackend, ControllerConfig, IssuerError, IssuerObject, IssuerReconciler,
    MemorySecretStore, PendingCertificateRequest, SignError,
};
use certgate::resources::{
    ClusterOriginIssuer, ClusterOriginIssuerSpec, IssuerConfig, OriginIssuer, OriginIssuerSpec,
};

const NAMESPACE: &str = "team-a";
const SECRET_NAME: &str = "ca-credentials";

fn issuer_for(api_url: &str) -> IssuerObject {
    let mut issuer = OriginIssuer::new(
        "origin-issuer",
        OriginIssuerSpec {
            config: IssuerConfig {
                auth_secret_name: SECRET_NAME.to_string(),
                api_url: Some(api_url.to_string()),
            },
        },
    );
    issuer.metadata.namespace = Some(NAMESPACE.to_string());
    IssuerObject::Namespaced(issuer)
}

fn store_with_secret(namespace: &str, api_key: &str, zone_id: &str) -> Arc<MemorySecretStore> {
    let store = MemorySecretStore::new();
    store.insert(
        namespace,
        SECRET_NAME,
        [
            ("api-key".to_string(), api_key.as_bytes().to_vec()),
            ("zone-id".to_string(), zone_id.as_bytes().to_vec()),
        ]
        .into_iter()
        .collect(),
    );
    Arc::new(store)
}

fn reconciler(store: Arc<MemorySecretStore>) -> IssuerReconciler {
    let backend = CloudflareBackend::new(Duration::from_secs(10)).unwrap();
    IssuerReconciler::new(store, Arc::new(backend), ControllerConfig::default())
}

fn csr_request(dns_name: &str) -> PendingCertificateRequest {
    let key = rcgen::KeyPair::generate().unwrap();
    let params = rcgen::CertificateParams::new(vec![dns_name.to_string()]).unwrap();
    let pem = params.serialize_request(&key).unwrap().pem().unwrap();
    PendingCertificateRequest::new(pem.into_bytes(), Duration::from_secs(3600))
}

fn leaf_certificate() -> (String, Vec<u8>) {
    let key = rcgen::KeyPair::generate().unwrap();
    let params = rcgen::CertificateParams::new(vec!["svc.example.com".to_string()]).unwrap();
    let cert = params.self_signed(&key).unwrap();
    (cert.pem(), cert.der().to_vec())
}

async fn mount_healthy_zone(server: &MockServer, zone_id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/client/v4/zones/{zone_id}")))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

#[tokio::test]
async fn sign_returns_single_certificate_chain() {
    let server = MockServer::start().await;
    mount_healthy_zone(&server, "z1").await;

    let (pem, der) = leaf_certificate();
    Mock::given(method("POST"))
        .and(path("/client/v4/zones/z1/certificates"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "certificate": pem })),
        )
        .mount(&server)
        .await;

    let reconciler = reconciler(store_with_secret(NAMESPACE, "test-key", "z1"));
    let issuer = issuer_for(&server.uri());

    let bundle = reconciler.sign(&csr_request("svc.example.com"), &issuer).await.unwrap();
    assert_eq!(bundle.len(), 1);
    assert_eq!(bundle.leaf().der(), der.as_slice());

    // The signing call carries the CSR, the primary hostname, and the
    // bearer credential.
    let requests = server.received_requests().await.unwrap();
    let sign_request = requests.iter().find(|r| r.method.as_str() == "POST").unwrap();
    let body: serde_json::Value = serde_json::from_slice(&sign_request.body).unwrap();
    assert!(body["csr"].as_str().unwrap().contains("BEGIN CERTIFICATE REQUEST"));
    assert_eq!(body["hostnames"], "svc.example.com");
    assert_eq!(
        sign_request.headers.get("authorization").unwrap().to_str().unwrap(),
        "Bearer test-key"
    );
}

#[tokio::test]
async fn sign_with_empty_api_key_makes_no_signing_call() {
    let server = MockServer::start().await;
    mount_healthy_zone(&server, "z1").await;

    let reconciler = reconciler(store_with_secret(NAMESPACE, "", "z1"));
    let issuer = issuer_for(&server.uri());

    let err = reconciler.sign(&csr_request("svc.example.com"), &issuer).await.unwrap_err();
    match err {
        SignError::Request(IssuerError::MissingCredentialField { field }) => {
            assert_eq!(field, "api-key")
        }
        other => panic!("expected MissingCredentialField, got {other:?}"),
    }

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.method.as_str() != "POST"));
}

#[tokio::test]
async fn sign_maps_http_500_to_signer_sign() {
    let server = MockServer::start().await;
    mount_healthy_zone(&server, "z1").await;

    Mock::given(method("POST"))
        .and(path("/client/v4/zones/z1/certificates"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let reconciler = reconciler(store_with_secret(NAMESPACE, "test-key", "z1"));
    let issuer = issuer_for(&server.uri());

    let err = reconciler.sign(&csr_request("svc.example.com"), &issuer).await.unwrap_err();
    match err {
        SignError::Request(IssuerError::SignerSign { status, .. }) => {
            assert_eq!(status, Some(500))
        }
        other => panic!("expected SignerSign, got {other:?}"),
    }
}

#[tokio::test]
async fn sign_times_out_against_a_hung_ca() {
    let server = MockServer::start().await;
    mount_healthy_zone(&server, "z1").await;

    // The CA accepts the request but never answers within the signing
    // timeout; the bounded client must surface a transport-level failure
    // instead of stalling the caller.
    Mock::given(method("POST"))
        .and(path("/client/v4/zones/z1/certificates"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let backend = CloudflareBackend::new(Duration::from_millis(250)).unwrap();
    let reconciler = IssuerReconciler::new(
        store_with_secret(NAMESPACE, "test-key", "z1"),
        Arc::new(backend),
        ControllerConfig::default(),
    );
    let issuer = issuer_for(&server.uri());

    let err = reconciler.sign(&csr_request("svc.example.com"), &issuer).await.unwrap_err();
    match err {
        SignError::Request(IssuerError::SignerSign { status, .. }) => assert_eq!(status, None),
        other => panic!("expected SignerSign without a status, got {other:?}"),
    }
}

#[tokio::test]
async fn sign_failure_kind_is_stable_across_repeat_calls() {
    // Only the health probe is mounted; the signing endpoint answers 404
    // both times. No hidden state may turn the second call into a success.
    let server = MockServer::start().await;
    mount_healthy_zone(&server, "z1").await;

    let reconciler = reconciler(store_with_secret(NAMESPACE, "test-key", "z1"));
    let issuer = issuer_for(&server.uri());
    let request = csr_request("svc.example.com");

    for _ in 0..2 {
        let err = reconciler.sign(&request, &issuer).await.unwrap_err();
        assert!(
            matches!(err, SignError::Request(IssuerError::SignerSign { .. })),
            "expected SignerSign, got {err:?}"
        );
    }
}

#[tokio::test]
async fn success_body_without_certificate_field_is_invalid_response() {
    let server = MockServer::start().await;
    mount_healthy_zone(&server, "z1").await;

    Mock::given(method("POST"))
        .and(path("/client/v4/zones/z1/certificates"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "result": "ok" })),
        )
        .mount(&server)
        .await;

    let reconciler = reconciler(store_with_secret(NAMESPACE, "test-key", "z1"));
    let issuer = issuer_for(&server.uri());

    let err = reconciler.sign(&csr_request("svc.example.com"), &issuer).await.unwrap_err();
    assert!(matches!(err, SignError::Request(IssuerError::InvalidSignerResponse { .. })));
}

#[tokio::test]
async fn non_json_success_body_is_invalid_response() {
    let server = MockServer::start().await;
    mount_healthy_zone(&server, "z1").await;

    Mock::given(method("POST"))
        .and(path("/client/v4/zones/z1/certificates"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>surprise</html>"))
        .mount(&server)
        .await;

    let reconciler = reconciler(store_with_secret(NAMESPACE, "test-key", "z1"));
    let issuer = issuer_for(&server.uri());

    let err = reconciler.sign(&csr_request("svc.example.com"), &issuer).await.unwrap_err();
    assert!(matches!(err, SignError::Request(IssuerError::InvalidSignerResponse { .. })));
}

#[tokio::test]
async fn check_fails_when_ca_is_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/client/v4/zones/z1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let reconciler = reconciler(store_with_secret(NAMESPACE, "test-key", "z1"));
    let issuer = issuer_for(&server.uri());

    let err = reconciler.check(&issuer).await.unwrap_err();
    assert!(matches!(err, IssuerError::HealthCheckerCheck { .. }));

    // Sign against the same stale state must fail at the same gate.
    let sign_err = reconciler.sign(&csr_request("svc.example.com"), &issuer).await.unwrap_err();
    assert!(matches!(sign_err, SignError::Issuer(IssuerError::HealthCheckerCheck { .. })));
}

#[tokio::test]
async fn check_fails_when_ca_rejects_the_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/client/v4/zones/z1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let reconciler = reconciler(store_with_secret(NAMESPACE, "wrong-key", "z1"));
    let issuer = issuer_for(&server.uri());

    let err = reconciler.check(&issuer).await.unwrap_err();
    assert!(matches!(err, IssuerError::HealthCheckerCheck { .. }));
    assert!(!err.is_permanent());
}

#[tokio::test]
async fn cluster_issuer_signs_with_fallback_namespace_credentials() {
    let server = MockServer::start().await;
    mount_healthy_zone(&server, "z1").await;

    let (pem, _) = leaf_certificate();
    Mock::given(method("POST"))
        .and(path("/client/v4/zones/z1/certificates"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "certificate": pem })),
        )
        .mount(&server)
        .await;

    let config = ControllerConfig::default();
    // Credentials live in the cluster resource namespace, not in any
    // issuer namespace.
    let store = store_with_secret(&config.cluster_resource_namespace, "test-key", "z1");
    let backend = CloudflareBackend::new(config.signing_timeout).unwrap();
    let reconciler = IssuerReconciler::new(store, Arc::new(backend), config);

    let issuer = IssuerObject::Cluster(ClusterOriginIssuer::new(
        "cluster-issuer",
        ClusterOriginIssuerSpec {
            config: IssuerConfig {
                auth_secret_name: SECRET_NAME.to_string(),
                api_url: Some(server.uri()),
            },
        },
    ));

    let bundle = reconciler.sign(&csr_request("svc.example.com"), &issuer).await.unwrap();
    assert_eq!(bundle.len(), 1);
}

#[tokio::test]
async fn missing_secret_is_issuer_level_error() {
    let server = MockServer::start().await;
    let reconciler = reconciler(Arc::new(MemorySecretStore::new()));
    let issuer = issuer_for(&server.uri());

    let err = reconciler.check(&issuer).await.unwrap_err();
    assert!(matches!(err, IssuerError::GetAuthSecret { .. }));
    assert!(!err.is_permanent());
}
