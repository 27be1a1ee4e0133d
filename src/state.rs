//! Persisted upgrade state
//!
//! Remembers an upgrade in progress between runs: whether it is enabled,
//! the target release, and the release the project started from. Stored as
//! JSON at `.rnup/state.json` under the project directory. The last fetched
//! directory metadata is kept beside it in `.rnup/metadata.json`.

use crate::domain::PackageInfo;
use crate::error::ConfigError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory holding tool state inside a project
pub const STATE_DIR: &str = ".rnup";

/// State file name inside [`STATE_DIR`]
pub const STATE_FILE: &str = "state.json";

/// Metadata cache file name inside [`STATE_DIR`]
pub const METADATA_FILE: &str = "metadata.json";

/// An upgrade in progress
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeState {
    /// Whether an upgrade is being tracked
    pub enabled: bool,
    /// Release being upgraded to
    pub target_version: Option<String>,
    /// Release the project was on when the upgrade started
    pub original_version: Option<String>,
}

impl UpgradeState {
    /// Start tracking an upgrade.
    ///
    /// Re-enabling for the same target keeps the recorded original release.
    pub fn enable(&mut self, target: &str, original: &str) {
        let same_target = self.enabled && self.target_version.as_deref() == Some(target);
        if !same_target || self.original_version.is_none() {
            self.original_version = Some(original.to_string());
        }
        self.enabled = true;
        self.target_version = Some(target.to_string());
    }

    /// Stop tracking and forget the target
    pub fn disable(&mut self) {
        *self = Self::default();
    }

    /// Target release if an upgrade is enabled
    pub fn active_target(&self) -> Option<&str> {
        if self.enabled {
            self.target_version.as_deref()
        } else {
            None
        }
    }

    /// Release the upgrade started from, if it was tracked for `target`
    pub fn original_for(&self, target: &str) -> Option<&str> {
        if self.active_target() == Some(target) {
            self.original_version.as_deref()
        } else {
            None
        }
    }

    /// Path of the state file for a project
    pub fn path_for(project_dir: &Path) -> PathBuf {
        project_dir.join(STATE_DIR).join(STATE_FILE)
    }

    /// Load the state of a project; no file means no upgrade in progress
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        read_json(&Self::path_for(project_dir))
    }

    /// Persist the state of a project
    pub fn save(&self, project_dir: &Path) -> Result<(), ConfigError> {
        let path = Self::path_for(project_dir);
        write_json(&path, self)?;
        debug!(path = %path.display(), enabled = self.enabled, "saved upgrade state");
        Ok(())
    }

    /// Delete the state file of a project, if any
    pub fn clear(project_dir: &Path) -> Result<(), ConfigError> {
        remove_json(&Self::path_for(project_dir))
    }
}

/// Directory metadata from earlier runs, keyed by package name.
///
/// Used when the metadata API cannot be reached. Stored next to the upgrade
/// state as [`METADATA_FILE`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataCache {
    /// Last known metadata per package
    pub packages: BTreeMap<String, PackageInfo>,
}

impl MetadataCache {
    /// Path of the metadata cache for a project
    pub fn path_for(project_dir: &Path) -> PathBuf {
        project_dir.join(STATE_DIR).join(METADATA_FILE)
    }

    /// Load the cache of a project; no file means an empty cache
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        read_json(&Self::path_for(project_dir))
    }

    /// Persist the cache of a project
    pub fn save(&self, project_dir: &Path) -> Result<(), ConfigError> {
        let path = Self::path_for(project_dir);
        write_json(&path, self)?;
        debug!(path = %path.display(), packages = self.packages.len(), "saved metadata cache");
        Ok(())
    }

    /// Delete the cache of a project, if any
    pub fn clear(project_dir: &Path) -> Result<(), ConfigError> {
        remove_json(&Self::path_for(project_dir))
    }
}

fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let write_error = |source| ConfigError::WriteError {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    let text = serde_json::to_string_pretty(value).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    std::fs::write(path, text + "\n").map_err(write_error)
}

fn remove_json(path: &Path) -> Result<(), ConfigError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ConfigError::WriteError {
            path: path.to_path_buf(),
            source,
        }),
    }
}
