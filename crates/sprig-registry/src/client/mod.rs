//! HTTP client implementation with connection pooling and retry logic

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, ClientBuilder, StatusCode};
use sprig_core::error::SprigError;
use sprig_core::types::PackageMetadata;
use tracing::{debug, warn};
use url::Url;

use crate::api::PackageMetadataResponse;
use crate::source::RegistrySource;
use crate::RegistryResult;

/// Public npm registry
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Abbreviated metadata: versions with dependencies, no readmes
const ABBREVIATED_METADATA: &str = "application/vnd.npm.install-v1+json";

/// Configuration for exponential backoff retry logic
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// Authentication configuration for registry access
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthConfig {
    /// Bearer token for authentication
    pub token: Option<String>,
    /// Basic auth username
    pub username: Option<String>,
    /// Basic auth password
    pub password: Option<String>,
}

/// Everything needed to build a [`RegistryClient`]
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    /// Registry base URL
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Optional credentials
    pub auth: Option<AuthConfig>,
    /// Retry behaviour
    pub retry: RetryConfig,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REGISTRY.to_string(),
            timeout: Duration::from_secs(30),
            auth: None,
            retry: RetryConfig::default(),
        }
    }
}

/// HTTP client for npm registry metadata
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Retry configuration
    retry_config: RetryConfig,
    /// Base registry URL, without trailing slash
    base_url: String,
}

impl RegistryClient {
    /// Create a client for the public registry
    pub fn new() -> RegistryResult<Self> {
        Self::with_options(ClientOptions::default())
    }

    /// Create a client with custom configuration
    pub fn with_options(options: ClientOptions) -> RegistryResult<Self> {
        let base_url = Url::parse(&options.base_url).map_err(|e| SprigError::ConfigValidation {
            field: "registry.url".to_string(),
            reason: format!("'{}' is not a valid URL: {}", options.base_url, e),
        })?;

        let mut builder = ClientBuilder::new()
            // Connection pooling configuration
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(options.timeout)
            .gzip(true)
            .user_agent(concat!("sprig/", env!("CARGO_PKG_VERSION")));

        if let Some(auth) = options.auth {
            if let Some(header) = authorization_header(auth)? {
                let mut headers = HeaderMap::new();
                headers.insert(AUTHORIZATION, header);
                builder = builder.default_headers(headers);
            }
        }

        let client = builder
            .build()
            .map_err(|e| SprigError::registry(format!("Failed to create HTTP client: {}", e), e))?;

        Ok(Self {
            client,
            retry_config: options.retry,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Registry this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute an operation with exponential backoff retry logic
    async fn with_retry<F, Fut, T>(&self, operation: F) -> RegistryResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = RegistryResult<T>>,
    {
        let mut delay = self.retry_config.initial_delay;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) if error.is_recoverable() && attempt < self.retry_config.max_retries => {
                    attempt += 1;
                    warn!("Registry request failed (attempt {}): {}", attempt, error);

                    tokio::time::sleep(delay).await;

                    delay = std::cmp::min(
                        Duration::from_millis(
                            (delay.as_millis() as f64 * self.retry_config.multiplier) as u64,
                        ),
                        self.retry_config.max_delay,
                    );
                },
                Err(error) => return Err(error),
            }
        }
    }

    /// Fetch package metadata with retry logic
    pub async fn fetch_document(&self, package_name: &str) -> RegistryResult<PackageMetadataResponse> {
        let url = format!("{}/{}", self.base_url, encode_package_name(package_name));
        debug!("Fetching metadata from {}", url);

        self.with_retry(|| async {
            let response = self
                .client
                .get(&url)
                .header(ACCEPT, ABBREVIATED_METADATA)
                .send()
                .await
                .map_err(|e| SprigError::registry(format!("Failed to fetch {}: {}", package_name, e), e))?;

            match response.status() {
                StatusCode::OK => {
                    let body = response.bytes().await.map_err(|e| {
                        SprigError::registry(format!("Failed to read metadata of {}: {}", package_name, e), e)
                    })?;
                    // A body that does not decode will not decode on a retry either
                    serde_json::from_slice::<PackageMetadataResponse>(&body).map_err(|e| SprigError::JsonParse {
                        file: format!("registry document of {}", package_name),
                        message: e.to_string(),
                    })
                },
                StatusCode::NOT_FOUND => Err(SprigError::PackageNotFound {
                    name: package_name.to_string(),
                }),
                status => Err(SprigError::RegistryUnavailable {
                    message: format!("Registry returned status {} for {}", status, package_name),
                    source: None,
                }),
            }
        })
        .await
    }
}

impl RegistrySource for RegistryClient {
    async fn fetch_metadata(&self, name: &str) -> RegistryResult<Arc<PackageMetadata>> {
        let mut document = self.fetch_document(name).await?;
        if document.name.is_empty() {
            document.name = name.to_string();
        }
        Ok(Arc::new(document.into()))
    }
}

/// Encode package name for URL (handle scoped packages)
fn encode_package_name(name: &str) -> String {
    if name.starts_with('@') {
        // Scoped package: @org/pkg -> @org%2fpkg
        name.replace('/', "%2f")
    } else {
        name.to_string()
    }
}

/// Build the Authorization header; a token wins over basic credentials
fn authorization_header(auth: AuthConfig) -> RegistryResult<Option<HeaderValue>> {
    let value = match auth {
        AuthConfig { token: Some(token), .. } => format!("Bearer {}", token),
        AuthConfig {
            username: Some(username),
            password: Some(password),
            ..
        } => {
            use base64::{engine::general_purpose, Engine as _};
            format!(
                "Basic {}",
                general_purpose::STANDARD.encode(format!("{}:{}", username, password))
            )
        },
        _ => return Ok(None),
    };

    let mut header = HeaderValue::from_str(&value).map_err(|e| SprigError::ConfigValidation {
        field: "registry.token".to_string(),
        reason: format!("Credentials are not a valid header value: {}", e),
    })?;
    header.set_sensitive(true);
    Ok(Some(header))
}

#[cfg(test)]
mod tests;
