//! Manifest file access with per-file write serialization
//!
//! Every edit is a full read → parse → modify → serialize → write cycle on
//! the whole file. Cycles targeting the same path run one at a time, so two
//! overlapping applies can never lose each other's updates.

use crate::error::ManifestError;
use crate::manifest::ManifestDocument;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Serializes read-modify-write cycles per manifest path
#[derive(Default)]
pub struct ManifestStore {
    /// Whether to skip writing (dry-run mode)
    dry_run: bool,
    locks: Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>,
}

/// Result of one edit cycle
#[derive(Debug)]
pub struct EditResult<T> {
    /// Value returned by the edit closure
    pub value: T,
    /// Whether the file content changed (false in dry-run mode)
    pub file_modified: bool,
    /// Serialized manifest after the edit
    pub content: String,
}

impl ManifestStore {
    /// Create a new store
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Check if this store is in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn lock_for(&self, path: &Path) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = match self.locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        locks.entry(path.to_path_buf()).or_default().clone()
    }

    /// Read the manifest under the path's lock
    pub async fn load(&self, path: &Path) -> Result<ManifestDocument, ManifestError> {
        let lock = self.lock_for(path);
        let _guard = lock.lock().await;
        ManifestDocument::parse(&read_manifest(path)?)
    }

    /// Run one read-modify-write cycle on the manifest at `path`.
    ///
    /// The closure receives the freshly parsed document; the result is
    /// written back as a single full-text replacement when it changed.
    pub async fn edit<T>(
        &self,
        path: &Path,
        edit: impl FnOnce(&mut ManifestDocument) -> T,
    ) -> Result<EditResult<T>, ManifestError> {
        let lock = self.lock_for(path);
        let _guard = lock.lock().await;

        let original = read_manifest(path)?;
        let mut document = ManifestDocument::parse(&original)?;
        let value = edit(&mut document);
        let content = document.serialize()?;

        let changed = content != original;
        if changed && !self.dry_run {
            write_manifest(path, &content)?;
            debug!(path = %path.display(), "manifest written");
        }

        Ok(EditResult {
            value,
            file_modified: changed && !self.dry_run,
            content,
        })
    }
}

/// Read a manifest file content safely
pub fn read_manifest(path: &Path) -> Result<String, ManifestError> {
    fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))
}

/// Write content to a manifest file
pub fn write_manifest(path: &Path, content: &str) -> Result<(), ManifestError> {
    fs::write(path, content).map_err(|e| ManifestError::write_error(path, e))
}
