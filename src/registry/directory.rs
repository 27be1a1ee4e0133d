//! React Native Directory adapter
//!
//! Fetches New Architecture compatibility and maintenance data.
//! API endpoint: POST https://reactnative.directory/api/libraries/check
//! with body `{"packages": ["name@version", ...]}`.

use crate::domain::PackageInfo;
use crate::error::RegistryError;
use crate::registry::{HttpClient, HttpFailure, PackageInfoSource};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// React Native Directory check endpoint
pub const DEFAULT_METADATA_URL: &str = "https://reactnative.directory/api/libraries/check";

const REGISTRY_NAME: &str = "React Native Directory";

/// Request body
#[derive(Debug, Serialize)]
struct CheckRequest {
    packages: Vec<String>,
}

/// Response body
#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    packages: HashMap<String, PackageInfo>,
}

/// React Native Directory client
pub struct DirectoryClient {
    client: HttpClient,
    url: String,
}

impl DirectoryClient {
    /// Create a client against the public directory
    pub fn new(client: HttpClient) -> Self {
        Self::with_url(client, DEFAULT_METADATA_URL)
    }

    /// Create a client against a custom endpoint
    pub fn with_url(client: HttpClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

/// Request key for a package: `name@version` with the range prefix removed
pub fn request_key(name: &str, version: &str) -> String {
    format!("{}@{}", name, crate::version::clean(version))
}

#[async_trait]
impl PackageInfoSource for DirectoryClient {
    fn source_name(&self) -> &'static str {
        REGISTRY_NAME
    }

    async fn fetch_info(
        &self,
        packages: &[(String, String)],
    ) -> Result<HashMap<String, PackageInfo>, RegistryError> {
        if packages.is_empty() {
            return Ok(HashMap::new());
        }

        let by_key: HashMap<String, &str> = packages
            .iter()
            .map(|(name, version)| (request_key(name, version), name.as_str()))
            .collect();
        let body = CheckRequest {
            packages: packages
                .iter()
                .map(|(name, version)| request_key(name, version))
                .collect(),
        };

        info!(count = packages.len(), "querying {}", REGISTRY_NAME);
        let response: CheckResponse =
            self.client
                .post_json(&self.url, &body)
                .await
                .map_err(|e| match e {
                    HttpFailure::Timeout => RegistryError::timeout(REGISTRY_NAME),
                    HttpFailure::Body(message) => {
                        RegistryError::invalid_response(REGISTRY_NAME, message)
                    }
                    other => RegistryError::network_error(REGISTRY_NAME, other.to_string()),
                })?;

        Ok(response
            .packages
            .into_iter()
            .map(|(key, info)| {
                let name = by_key
                    .get(&key)
                    .map(|name| name.to_string())
                    .unwrap_or(key);
                (name, info)
            })
            .collect())
    }
}
