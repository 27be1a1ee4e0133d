//! Upstream release diffs
//!
//! This module provides:
//! - `DiffParser`: unified diff text → `PackageChange` list
//! - `VersionPairCache`: parsed diffs memoized per `(from, to)` pair

mod cache;
mod parser;

pub use cache::VersionPairCache;
pub use parser::{DiffParser, DEFAULT_MANIFEST_FILENAME, SCAFFOLD_ONLY_PACKAGE};

use crate::domain::PackageChange;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Parsed diff for one version pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffData {
    /// Older reference release
    pub from: String,
    /// Newer reference release
    pub to: String,
    /// Package changes between the two releases
    pub changes: Vec<PackageChange>,
    /// When the diff was fetched and parsed
    pub fetched_at: DateTime<Utc>,
}

impl DiffData {
    /// Wrap parsed changes for a pair, stamped with the current time
    pub fn new(from: impl Into<String>, to: impl Into<String>, changes: Vec<PackageChange>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            changes,
            fetched_at: Utc::now(),
        }
    }
}
