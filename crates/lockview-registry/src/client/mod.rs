//! HTTP client for the registry's latest-version endpoint

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use tracing::debug;

use lockview_core::error::LockviewError;
use lockview_core::types::PackageMetadata;
use crate::api::latest_url;
use crate::RegistryResult;

/// Anything that can answer "latest metadata for this package name"
///
/// The fetch pool only ever talks to this trait, so tests can swap the
/// network for an instrumented fake.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch latest-version metadata for one package.
    ///
    /// Every failure mode (transport, status, body, missing `version`) is an
    /// `Err`; callers decide whether to care.
    async fn fetch_latest(&self, registry_url: &str, name: &str) -> RegistryResult<PackageMetadata>;
}

/// Authentication configuration for registry access
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Bearer token for authentication
    pub token: Option<String>,
}

/// HTTP client for npm registry metadata
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
}

impl RegistryClient {
    /// Create new registry client with connection pooling
    pub fn new() -> RegistryResult<Self> {
        Self::with_auth(AuthConfig::default())
    }

    /// Create registry client with authentication
    pub fn with_auth(auth: AuthConfig) -> RegistryResult<Self> {
        let mut builder = ClientBuilder::new()
            // Connection pooling configuration
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            // Request timeout
            .timeout(Duration::from_secs(30))
            .gzip(true)
            .user_agent(concat!("lockview/", env!("CARGO_PKG_VERSION")));

        if let Some(token) = auth.token {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", token).parse().map_err(|e| LockviewError::Network {
                    message: format!("Invalid auth token: {}", e),
                    source: Some(Box::new(e)),
                })?,
            );
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|e| LockviewError::Network {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
        })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl MetadataSource for RegistryClient {
    async fn fetch_latest(&self, registry_url: &str, name: &str) -> RegistryResult<PackageMetadata> {
        let url = latest_url(registry_url, name)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| LockviewError::network(format!("Failed to fetch {}: {}", name, e), e))?;

        match response.status() {
            status if status.is_success() => {
                let body = response
                    .json::<serde_json::Value>()
                    .await
                    .map_err(|e| LockviewError::InvalidMetadata {
                        name: name.to_string(),
                        reason: format!("malformed response body: {}", e),
                    })?;

                PackageMetadata::from_value(body).map_err(|e| match e {
                    LockviewError::InvalidMetadata { reason, .. } => LockviewError::InvalidMetadata {
                        name: name.to_string(),
                        reason,
                    },
                    other => other,
                })
            },
            StatusCode::NOT_FOUND => Err(LockviewError::PackageNotFound {
                name: name.to_string(),
            }),
            status => Err(LockviewError::Network {
                message: format!("Registry returned status {}: {}", status, name),
                source: None,
            }),
        }
    }
}
