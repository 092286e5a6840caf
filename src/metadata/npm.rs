//! Fetch package metadata from the npm registry

use crate::config::NetworkConfig;
use crate::error::{AuditError, Result};
use crate::types::{RegistryLookup, RegistryRecord};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Registry document ("packument") for a package.
///
/// Only the fields the audit needs are decoded.
#[derive(Debug, Deserialize)]
struct Packument {
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    /// Version -> ISO-8601 publish time, plus `created`/`modified` and, for
    /// unpublished packages, an `unpublished` object.
    #[serde(default)]
    time: HashMap<String, serde_json::Value>,
}

/// Client for one audit run. Owns its HTTP connection pool.
pub struct NpmRegistryClient {
    client: Client,
    base_url: String,
}

impl NpmRegistryClient {
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.registry_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the package document. Scoped names are encoded as one path segment.
    pub fn package_url(&self, package_name: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(package_name))
    }

    /// Resolve a package to its registry record.
    ///
    /// A single attempt: no retries and no caching. Transport failures and
    /// unexpected statuses are returned as [`AuditError::Lookup`].
    pub async fn resolve(&self, package_name: &str) -> Result<RegistryLookup> {
        let url = self.package_url(package_name);
        debug!("Fetching registry metadata for {} from {}", package_name, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AuditError::lookup(package_name, describe_transport_error(&e)))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Ok(RegistryLookup::NotFound),
            status => {
                return Err(AuditError::lookup(package_name, format!("HTTP {}", status)));
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| AuditError::lookup(package_name, describe_transport_error(&e)))?;

        Ok(parse_packument(&body))
    }
}

/// Interpret a 200 response body
fn parse_packument(body: &str) -> RegistryLookup {
    let packument: Packument = match serde_json::from_str(body) {
        Ok(p) => p,
        Err(e) => return RegistryLookup::Malformed(format!("invalid JSON: {}", e)),
    };

    let Some(latest_version) = packument.dist_tags.get("latest").cloned() else {
        // npm keeps a tombstone document for unpublished packages
        if packument.time.contains_key("unpublished") {
            return RegistryLookup::NotFound;
        }
        return RegistryLookup::Malformed("missing dist-tags.latest".to_string());
    };

    let mut publish_times = HashMap::with_capacity(packument.time.len());
    for (version, value) in packument.time {
        let serde_json::Value::String(raw) = value else {
            continue;
        };
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(dt) => {
                publish_times.insert(version, dt.with_timezone(&Utc));
            }
            // Only the evaluated version matters; classify reports it if missing
            Err(e) => debug!("Skipping unparseable publish time for {}: {}", version, e),
        }
    }

    RegistryLookup::Found(RegistryRecord {
        latest_version,
        publish_times,
    })
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        format!("request failed: {}", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const LEFT_PAD: &str = r#"{
        "name": "left-pad",
        "dist-tags": { "latest": "1.3.0" },
        "time": {
            "created": "2014-03-14T20:06:58.193Z",
            "modified": "2022-06-19T11:04:55.720Z",
            "1.0.0": "2014-03-14T20:06:58.193Z",
            "1.3.0": "2015-01-01T00:00:00Z"
        }
    }"#;

    fn client_for(server: &mockito::ServerGuard) -> NpmRegistryClient {
        let config = NetworkConfig {
            registry_url: server.url(),
            ..NetworkConfig::default()
        };
        NpmRegistryClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_found() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/left-pad")
            .match_header("user-agent", USER_AGENT)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(LEFT_PAD)
            .create_async()
            .await;

        let lookup = client_for(&server).resolve("left-pad").await.unwrap();
        mock.assert_async().await;

        let record = match lookup {
            RegistryLookup::Found(record) => record,
            other => panic!("expected a record, got {:?}", other),
        };
        assert_eq!(record.latest_version, "1.3.0");
        assert_eq!(
            record.publish_times["1.3.0"],
            Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap()
        );
        assert!(record.publish_times.contains_key("created"));
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/does-not-exist")
            .with_status(404)
            .with_body(r#"{"error":"Not found"}"#)
            .create_async()
            .await;

        let lookup = client_for(&server).resolve("does-not-exist").await.unwrap();
        assert_eq!(lookup, RegistryLookup::NotFound);
    }

    #[tokio::test]
    async fn test_resolve_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/flaky")
            .with_status(503)
            .create_async()
            .await;

        let err = client_for(&server).resolve("flaky").await.unwrap_err();
        match err {
            AuditError::Lookup { package, message } => {
                assert_eq!(package, "flaky");
                assert!(message.contains("503"), "unexpected message: {}", message);
            }
            other => panic!("expected lookup error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/broken")
            .with_status(200)
            .with_body("{ not json")
            .create_async()
            .await;

        let lookup = client_for(&server).resolve("broken").await.unwrap();
        assert!(matches!(lookup, RegistryLookup::Malformed(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_lookup_error() {
        let config = NetworkConfig {
            registry_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 5,
            ..NetworkConfig::default()
        };
        let client = NpmRegistryClient::new(&config).unwrap();

        let err = client.resolve("left-pad").await.unwrap_err();
        assert!(matches!(err, AuditError::Lookup { .. }));
    }

    #[tokio::test]
    async fn test_unresponsive_registry_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and never answer
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = NetworkConfig {
            registry_url: format!("http://{}", addr),
            timeout_secs: 1,
            ..NetworkConfig::default()
        };
        let client = NpmRegistryClient::new(&config).unwrap();

        let started = std::time::Instant::now();
        let err = client.resolve("left-pad").await.unwrap_err();
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
        match err {
            AuditError::Lookup { message, .. } => assert_eq!(message, "request timed out"),
            other => panic!("expected lookup error, got {:?}", other),
        }

        server.abort();
    }

    #[test]
    fn test_scoped_package_url() {
        let config = NetworkConfig {
            registry_url: "https://registry.example.com/".to_string(),
            ..NetworkConfig::default()
        };
        let client = NpmRegistryClient::new(&config).unwrap();
        assert_eq!(
            client.package_url("@acme/internal"),
            "https://registry.example.com/%40acme%2Finternal"
        );
    }

    #[test]
    fn test_unpublished_tombstone_is_not_found() {
        let body = r#"{
            "name": "gone",
            "time": {
                "created": "2016-01-01T00:00:00Z",
                "unpublished": { "time": "2016-02-01T00:00:00Z", "versions": ["1.0.0"] }
            }
        }"#;
        assert_eq!(parse_packument(body), RegistryLookup::NotFound);
    }

    #[test]
    fn test_missing_latest_tag_is_malformed() {
        let body = r#"{ "dist-tags": {}, "time": {} }"#;
        assert!(matches!(parse_packument(body), RegistryLookup::Malformed(_)));
    }

    #[test]
    fn test_invalid_unrelated_timestamp_is_skipped() {
        let body = r#"{
            "dist-tags": { "latest": "1.3.0" },
            "time": { "0.0.1": "2012-01-01", "1.3.0": "2015-01-01T00:00:00Z" }
        }"#;

        let record = match parse_packument(body) {
            RegistryLookup::Found(record) => record,
            other => panic!("expected a record, got {:?}", other),
        };
        assert!(!record.publish_times.contains_key("0.0.1"));
        assert_eq!(
            record.publish_times["1.3.0"],
            Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_invalid_latest_timestamp_is_dropped() {
        let body = r#"{ "dist-tags": { "latest": "1.0.0" }, "time": { "1.0.0": "yesterday" } }"#;

        let record = match parse_packument(body) {
            RegistryLookup::Found(record) => record,
            other => panic!("expected a record, got {:?}", other),
        };
        assert!(record.publish_times.is_empty());
    }
}
