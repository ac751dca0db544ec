//! Unit tests for registry client

use super::*;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> RegistryClient {
    RegistryClient::with_options(ClientOptions {
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
        auth: None,
        retry: RetryConfig {
            max_retries: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            multiplier: 2.0,
        },
    })
    .unwrap()
}

#[tokio::test]
async fn test_registry_client_creation() {
    let client = RegistryClient::new().unwrap();
    assert_eq!(client.base_url(), "https://registry.npmjs.org");
    assert_eq!(client.retry_config.max_retries, 3);
}

#[tokio::test]
async fn test_trailing_slash_trimmed() {
    let client = RegistryClient::with_options(ClientOptions {
        base_url: "https://npm.example.com/".to_string(),
        ..ClientOptions::default()
    })
    .unwrap();
    assert_eq!(client.base_url(), "https://npm.example.com");
}

#[tokio::test]
async fn test_invalid_base_url() {
    let result = RegistryClient::with_options(ClientOptions {
        base_url: "not a url".to_string(),
        ..ClientOptions::default()
    });
    assert!(matches!(result, Err(SprigError::ConfigValidation { .. })));
}

#[test]
fn test_encode_package_name() {
    assert_eq!(encode_package_name("lodash"), "lodash");
    assert_eq!(encode_package_name("@types/node"), "@types%2fnode");
}

#[test]
fn test_authorization_header() {
    let token = AuthConfig {
        token: Some("test-token".to_string()),
        ..AuthConfig::default()
    };
    let header = authorization_header(token).unwrap().unwrap();
    assert_eq!(header.to_str().unwrap(), "Bearer test-token");
    assert!(header.is_sensitive());

    let basic = AuthConfig {
        token: None,
        username: Some("user".to_string()),
        password: Some("pass".to_string()),
    };
    let header = authorization_header(basic).unwrap().unwrap();
    assert_eq!(header.to_str().unwrap(), "Basic dXNlcjpwYXNz");

    let incomplete = AuthConfig {
        username: Some("user".to_string()),
        ..AuthConfig::default()
    };
    assert!(authorization_header(incomplete).unwrap().is_none());
}

#[test]
fn test_retry_config_default() {
    let config = RetryConfig::default();
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.initial_delay, Duration::from_millis(100));
    assert_eq!(config.max_delay, Duration::from_secs(10));
    assert_eq!(config.multiplier, 2.0);
}

#[tokio::test]
async fn test_fetch_metadata_success() {
    let mock_server = MockServer::start().await;

    let mock_response = serde_json::json!({
        "name": "loose-envify",
        "dist-tags": { "latest": "1.4.0" },
        "versions": {
            "1.4.0": {
                "version": "1.4.0",
                "dependencies": { "js-tokens": "^3.0.0 || ^4.0.0" }
            },
            "1.3.1": { "version": "1.3.1" }
        }
    });

    Mock::given(method("GET"))
        .and(path("/loose-envify"))
        .and(header("Accept", ABBREVIATED_METADATA))
        .respond_with(ResponseTemplate::new(200).set_body_json(&mock_response))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let metadata = client.fetch_metadata("loose-envify").await.unwrap();

    assert_eq!(metadata.name, "loose-envify");
    assert_eq!(metadata.latest(), Some("1.4.0"));
    assert_eq!(
        metadata.version("1.4.0").unwrap().dependencies["js-tokens"],
        "^3.0.0 || ^4.0.0"
    );
}

#[tokio::test]
async fn test_fetch_metadata_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nonexistent-package"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    match client.fetch_metadata("nonexistent-package").await {
        Err(SprigError::PackageNotFound { name }) => {
            assert_eq!(name, "nonexistent-package");
        },
        other => panic!("Expected PackageNotFound error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_retry_on_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "flaky",
            "dist-tags": { "latest": "1.0.0" },
            "versions": { "1.0.0": {} }
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let metadata = client.fetch_metadata("flaky").await.unwrap();
    assert_eq!(metadata.latest(), Some("1.0.0"));
}

#[tokio::test]
async fn test_retries_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.fetch_metadata("down").await;
    assert!(matches!(result, Err(SprigError::RegistryUnavailable { .. })));
}

#[tokio::test]
async fn test_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.fetch_metadata("garbage").await;
    match result {
        Err(error @ SprigError::JsonParse { .. }) => {
            assert!(!error.is_recoverable());
            assert!(error.to_string().contains("registry document of garbage"));
        },
        other => panic!("expected JsonParse, got {:?}", other),
    }
}

#[tokio::test]
async fn test_scoped_package_url_encoding() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/@types%2fnode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "@types/node",
            "dist-tags": { "latest": "1.0.0" },
            "versions": {}
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.fetch_metadata("@types/node").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_bearer_token_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/private"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "private",
            "versions": {}
        })))
        .mount(&mock_server)
        .await;

    let client = RegistryClient::with_options(ClientOptions {
        base_url: mock_server.uri(),
        auth: Some(AuthConfig {
            token: Some("secret".to_string()),
            ..AuthConfig::default()
        }),
        ..ClientOptions::default()
    })
    .unwrap();

    let metadata = client.fetch_metadata("private").await.unwrap();
    assert_eq!(metadata.latest(), None);
}
