//! Integration tests for `LicenseGate` against a wiremock validation endpoint.

use std::time::Duration;

use chrono::Utc;
use clipstat_license::{
    LicenseClient, LicenseError, LicenseGate, LicenseState, MemoryStore, ProCache, ProSource,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TTL: Duration = Duration::from_secs(6 * 3600);

fn test_client(server: &MockServer) -> LicenseClient {
    LicenseClient::new(
        &format!("{}/api/license/validate", server.uri()),
        5,
        "clipstat-test/0.1",
    )
    .expect("client construction should not fail")
}

fn gate_with(server: &MockServer, state: LicenseState) -> LicenseGate<MemoryStore> {
    LicenseGate::new(test_client(server), MemoryStore::new(state), TTL)
}

fn with_token(token: &str, cache: Option<ProCache>) -> LicenseState {
    LicenseState {
        token: Some(token.to_string()),
        cache,
    }
}

async fn mount_validate(server: &MockServer, token: &str, pro: bool, hits: u64) {
    Mock::given(method("POST"))
        .and(path("/api/license/validate"))
        .and(body_json(json!({ "token": token })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "pro": pro })))
        .expect(hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn no_token_is_not_pro_and_overwrites_cache() {
    let server = MockServer::start().await;
    let stale_pro = ProCache {
        pro: true,
        checked_at: Utc::now(),
    };
    let gate = gate_with(
        &server,
        LicenseState {
            token: None,
            cache: Some(stale_pro),
        },
    );

    let status = gate.pro_status(false).await.unwrap();
    assert!(!status.pro);
    assert_eq!(status.source, ProSource::NoToken);
    assert_eq!(gate.store().snapshot().cache.map(|c| c.pro), Some(false));
}

#[tokio::test]
async fn server_answer_is_cached() {
    let server = MockServer::start().await;
    mount_validate(&server, "tok_good", true, 1).await;
    let gate = gate_with(&server, with_token("tok_good", None));

    let first = gate.pro_status(false).await.unwrap();
    assert!(first.pro);
    assert_eq!(first.source, ProSource::Server);

    let second = gate.pro_status(false).await.unwrap();
    assert!(second.pro);
    assert_eq!(second.source, ProSource::Cache);
}

#[tokio::test]
async fn stale_cache_goes_back_to_server() {
    let server = MockServer::start().await;
    mount_validate(&server, "tok_lapsed", false, 1).await;
    let old = ProCache {
        pro: true,
        checked_at: Utc::now() - chrono::Duration::hours(7),
    };
    let gate = gate_with(&server, with_token("tok_lapsed", Some(old)));

    let status = gate.pro_status(false).await.unwrap();
    assert!(!status.pro);
    assert_eq!(status.source, ProSource::Server);
}

#[tokio::test]
async fn force_refresh_skips_fresh_cache() {
    let server = MockServer::start().await;
    mount_validate(&server, "tok_good", true, 1).await;
    let fresh = ProCache {
        pro: false,
        checked_at: Utc::now(),
    };
    let gate = gate_with(&server, with_token("tok_good", Some(fresh)));

    let status = gate.pro_status(true).await.unwrap();
    assert!(status.pro);
    assert_eq!(status.source, ProSource::Server);
}

#[tokio::test]
async fn server_error_degrades_to_not_pro() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/license/validate"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let gate = gate_with(&server, with_token("tok", None));

    let status = gate.pro_status(false).await.unwrap();
    assert!(!status.pro);
    assert_eq!(status.source, ProSource::Server);
    assert_eq!(gate.store().snapshot().cache.map(|c| c.pro), Some(false));
}

#[tokio::test]
async fn malformed_body_degrades_to_not_pro() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/license/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server).validate("tok").await.unwrap_err();
    assert!(matches!(err, LicenseError::Json { .. }));

    let status = gate_with(&server, with_token("tok", None))
        .pro_status(false)
        .await
        .unwrap();
    assert!(!status.pro);
}

#[tokio::test]
async fn set_token_trims_and_revalidates() {
    let server = MockServer::start().await;
    mount_validate(&server, "tok_new", true, 1).await;
    let fresh_free = ProCache {
        pro: false,
        checked_at: Utc::now(),
    };
    let gate = gate_with(&server, with_token("tok_old", Some(fresh_free)));

    let status = gate.set_token("  tok_new \n").await.unwrap();
    assert!(status.pro);
    assert_eq!(status.source, ProSource::Server);
    assert_eq!(gate.store().snapshot().token.as_deref(), Some("tok_new"));
}

#[tokio::test]
async fn blank_token_clears_entitlement() {
    let server = MockServer::start().await;
    let gate = gate_with(&server, with_token("tok_old", None));

    let status = gate.set_token("   ").await.unwrap();
    assert_eq!(status.source, ProSource::NoToken);
    assert!(gate.store().snapshot().token.is_none());
}

#[test]
fn invalid_validation_url_is_rejected() {
    let err = LicenseClient::new("not a url", 5, "ua").err().unwrap();
    assert!(matches!(err, LicenseError::InvalidUrl { .. }));
}
