//! Integration tests for configuration loading
//!
//! Loads JSON and TOML files from a temporary directory and checks that the
//! resulting configuration drives a working client.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use bookdesk_common::security::MemorySecretStore;
use bookdesk_common::time::{MockClock, SharedClock};
use bookdesk_domain::{BookdeskError, ResultEnvelope};
use bookdesk_infra::api::{ApiClient, ClientContext};
use bookdesk_infra::config;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_config(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_json_file_applies_defaults() {
    let dir = TempDir::new().unwrap();
    let path =
        write_config(&dir, "bookdesk.json", r#"{"base_url": "https://api.bookdesk.test"}"#);

    let config = config::load_from_file(Some(path)).unwrap();

    assert_eq!(config.base_url, "https://api.bookdesk.test");
    assert_eq!(config.request_timeout(), Duration::from_secs(10));
    assert_eq!(config.cache_ttl(), Duration::from_secs(300));
    assert_eq!(config.keychain_service, "bookdesk");
    assert_eq!(config.cache_max_entries, None);
}

#[test]
fn test_toml_file_overrides() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "bookdesk.toml",
        r#"
base_url = "https://api.bookdesk.test/v1/"
request_timeout_secs = 5
cache_ttl_secs = 60
cache_max_entries = 128
keychain_service = "bookdesk-staging"
user_agent = "bookdesk-admin/2.0"
"#,
    );

    let config = config::load_from_file(Some(path)).unwrap();

    assert_eq!(config.normalized_base_url(), "https://api.bookdesk.test/v1");
    assert_eq!(config.request_timeout(), Duration::from_secs(5));
    assert_eq!(config.cache_ttl(), Duration::from_secs(60));
    assert_eq!(config.cache_max_entries, Some(128));
    assert_eq!(config.keychain_service, "bookdesk-staging");
    assert_eq!(config.user_agent.as_deref(), Some("bookdesk-admin/2.0"));
}

#[test]
fn test_invalid_files_are_rejected() {
    let dir = TempDir::new().unwrap();
    let cases = [
        ("scheme.json", r#"{"base_url": "ftp://files.bookdesk.test"}"#),
        (
            "timeout.json",
            r#"{"base_url": "https://api.bookdesk.test", "request_timeout_secs": 0}"#,
        ),
        ("missing.toml", "cache_ttl_secs = 10"),
        ("broken.json", "{ not json"),
        ("settings.yaml", "base_url: https://api.bookdesk.test"),
    ];

    for (name, contents) in cases {
        let path = write_config(&dir, name, contents);
        let err = config::load_from_file(Some(path)).unwrap_err();
        assert!(matches!(err, BookdeskError::Config(_)), "{name}: unexpected error {err:?}");
    }
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let err = config::load_from_file(Some(dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, BookdeskError::Config(_)));
}

/// A file-loaded configuration drives base URL joining, the User-Agent
/// header and the default cache TTL.
#[tokio::test]
async fn test_loaded_config_drives_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/services"))
        .and(header("User-Agent", "bookdesk-admin/2.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let contents = format!(
        "base_url = \"{}/v1/\"\ncache_ttl_secs = 30\nuser_agent = \"bookdesk-admin/2.0\"\n",
        server.uri()
    );
    let path = write_config(&dir, "bookdesk.toml", &contents);
    let loaded = config::load_from_file(Some(path)).unwrap();

    let clock = MockClock::new();
    let shared_clock: SharedClock = Arc::new(clock.clone());
    let context =
        ClientContext::with_clock(loaded, Arc::new(MemorySecretStore::new()), shared_clock)
            .unwrap();
    let client = ApiClient::new(context).unwrap();

    let first: ResultEnvelope<Value> = client.get("services").await;
    assert!(first.success, "request failed: {:?}", first.error);

    clock.advance_secs(29);
    let _: ResultEnvelope<Value> = client.get("/services").await;
    clock.advance_secs(1);
    let _: ResultEnvelope<Value> = client.get("/services").await;

    server.verify().await;
}
