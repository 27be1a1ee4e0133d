//! Remote sources for release diffs and package metadata
//!
//! This module provides:
//! - HTTP client shared foundation
//! - Release diff sources (HTTP and local file)
//! - React Native Directory adapter for package metadata

mod client;
mod diff_source;
mod directory;

pub use client::{HttpClient, HttpFailure, DEFAULT_TIMEOUT};
pub use diff_source::{FileDiffSource, HttpDiffSource, DEFAULT_DIFF_BASE_URL};
pub use directory::{request_key, DirectoryClient, DEFAULT_METADATA_URL};

use crate::domain::PackageInfo;
use crate::error::{DiffError, RegistryError};
use async_trait::async_trait;
use std::collections::HashMap;

/// Trait for sources of upstream release diffs
#[async_trait]
pub trait DiffSource: Send + Sync {
    /// Human-readable name of the source
    fn source_name(&self) -> &str;

    /// Fetch the raw diff text between two releases
    async fn fetch_diff(&self, from: &str, to: &str) -> Result<String, DiffError>;
}

/// Trait for sources of per-package compatibility metadata
#[async_trait]
pub trait PackageInfoSource: Send + Sync {
    /// Human-readable name of the source
    fn source_name(&self) -> &'static str;

    /// Fetch metadata for `(name, version)` pairs, keyed by package name.
    ///
    /// Packages the source does not know are simply absent from the result.
    async fn fetch_info(
        &self,
        packages: &[(String, String)],
    ) -> Result<HashMap<String, PackageInfo>, RegistryError>;
}
