//! Release diff sources
//!
//! Remote diffs are served per pair at `{base}/{from}..{to}.diff`. A local
//! file can stand in for the remote source, which is how offline runs and
//! the end-to-end tests feed a diff in.

use crate::error::DiffError;
use crate::registry::{DiffSource, HttpClient, HttpFailure};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

/// Default base URL for upstream release diffs
pub const DEFAULT_DIFF_BASE_URL: &str =
    "https://raw.githubusercontent.com/react-native-community/rn-diff-purge/diffs/diffs";

/// Fetches release diffs over HTTP
pub struct HttpDiffSource {
    client: HttpClient,
    base_url: String,
}

impl HttpDiffSource {
    /// Create a diff source against the default upstream location
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, DEFAULT_DIFF_BASE_URL)
    }

    /// Create a diff source against a custom base URL
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL for a version pair
    pub fn build_url(&self, from: &str, to: &str) -> String {
        format!("{}/{}..{}.diff", self.base_url, from, to)
    }
}

#[async_trait]
impl DiffSource for HttpDiffSource {
    fn source_name(&self) -> &str {
        &self.base_url
    }

    async fn fetch_diff(&self, from: &str, to: &str) -> Result<String, DiffError> {
        let url = self.build_url(from, to);
        info!(%url, "fetching upgrade diff");
        self.client.get_text(&url).await.map_err(|e| match e {
            HttpFailure::NotFound => DiffError::not_found(from, to),
            HttpFailure::Timeout => DiffError::timeout(from, to),
            other => DiffError::fetch(from, to, other.to_string()),
        })
    }
}

/// Serves one local diff file for whatever pair is requested
pub struct FileDiffSource {
    path: PathBuf,
}

impl FileDiffSource {
    /// Create a source reading the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DiffSource for FileDiffSource {
    fn source_name(&self) -> &str {
        "local diff file"
    }

    async fn fetch_diff(&self, from: &str, to: &str) -> Result<String, DiffError> {
        info!(path = %self.path.display(), "reading upgrade diff");
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DiffError::fetch(
                from,
                to,
                format!("cannot read {}: {}", self.path.display(), e),
            )
        })
    }
}
