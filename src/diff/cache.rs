//! Memoization of parsed release diffs per version pair

use super::DiffData;
use std::collections::HashMap;
use tracing::debug;

/// Parsed diffs keyed by `"{from}..{to}"`.
///
/// Entries never expire; upstream diffs for a published pair do not change.
#[derive(Debug, Default)]
pub struct VersionPairCache {
    entries: HashMap<String, DiffData>,
}

impl VersionPairCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for a version pair
    pub fn key(from: &str, to: &str) -> String {
        format!("{}..{}", from, to)
    }

    /// Look up the parsed diff for a pair
    pub fn get(&self, from: &str, to: &str) -> Option<&DiffData> {
        let hit = self.entries.get(&Self::key(from, to));
        debug!(from, to, hit = hit.is_some(), "diff cache lookup");
        hit
    }

    /// Store the parsed diff for a pair, replacing any previous entry
    pub fn put(&mut self, from: &str, to: &str, data: DiffData) {
        self.entries.insert(Self::key(from, to), data);
    }

    /// Drop every cached pair
    pub fn clear(&mut self) {
        debug!(entries = self.entries.len(), "clearing diff cache");
        self.entries.clear();
    }

    /// Number of cached pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
