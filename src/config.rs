//! Settings loaded from `rnup.toml`
//!
//! Every key is optional; a missing file means all defaults. Example:
//!
//! ```toml
//! timeout_secs = 10
//! baseline_version = "0.74.0"
//! ```

use crate::diff::DEFAULT_MANIFEST_FILENAME;
use crate::error::ConfigError;
use crate::registry::{DEFAULT_DIFF_BASE_URL, DEFAULT_METADATA_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Settings file looked up in the project directory
pub const CONFIG_FILENAME: &str = "rnup.toml";

/// Default framework package whose version drives upgrades
pub const DEFAULT_FRAMEWORK_PACKAGE: &str = "react-native";

/// Tool settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base URL of the release diff source
    pub diff_base_url: String,
    /// Package metadata endpoint
    pub metadata_url: String,
    /// Network timeout in seconds
    pub timeout_secs: u64,
    /// Quiet period before re-analysis in watch mode, in milliseconds
    pub debounce_ms: u64,
    /// Fixed `from` release used when the target equals the current release
    pub baseline_version: Option<String>,
    /// Package whose declared version is the project's current release
    pub framework_package: String,
    /// Manifest filename, both on disk and inside diffs
    pub manifest_filename: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            diff_base_url: DEFAULT_DIFF_BASE_URL.to_string(),
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            timeout_secs: 5,
            debounce_ms: 300,
            baseline_version: None,
            framework_package: DEFAULT_FRAMEWORK_PACKAGE.to_string(),
            manifest_filename: DEFAULT_MANIFEST_FILENAME.to_string(),
        }
    }
}

impl Settings {
    /// Load settings for a project.
    ///
    /// An explicit path must exist. Without one, `rnup.toml` in the project
    /// directory is used if present and defaults otherwise.
    pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path: PathBuf = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = project_dir.join(CONFIG_FILENAME);
                if !candidate.is_file() {
                    debug!("no {} found, using defaults", CONFIG_FILENAME);
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
            path: path.clone(),
            source,
        })?;
        let settings = Self::from_toml_str(&text, &path)?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Parse and validate settings text
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check values that deserialize fine but are unusable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };

        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs", "must be greater than zero"));
        }
        if self.framework_package.trim().is_empty() {
            return Err(invalid("framework_package", "must not be empty"));
        }
        if self.manifest_filename.trim().is_empty() {
            return Err(invalid("manifest_filename", "must not be empty"));
        }
        if let Some(baseline) = &self.baseline_version {
            crate::version::parse_release(baseline)
                .map_err(|e| invalid("baseline_version", &e.to_string()))?;
        }
        Ok(())
    }

    /// Network timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Watch-mode quiet period
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.timeout(), Duration::from_secs(5));
        assert_eq!(settings.debounce(), Duration::from_millis(300));
        assert_eq!(settings.framework_package, "react-native");
        assert_eq!(settings.manifest_filename, "package.json");
        assert!(settings.baseline_version.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings =
            Settings::from_toml_str("timeout_secs = 10\n", Path::new("rnup.toml")).unwrap();
        assert_eq!(settings.timeout_secs, 10);
        assert_eq!(settings.debounce_ms, 300);
    }

    #[test]
    fn test_baseline_version() {
        let settings = Settings::from_toml_str(
            "baseline_version = \"0.74.0\"\n",
            Path::new("rnup.toml"),
        )
        .unwrap();
        assert_eq!(settings.baseline_version.as_deref(), Some("0.74.0"));

        let err = Settings::from_toml_str("baseline_version = \"soon\"\n", Path::new("rnup.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Settings::from_toml_str("timeout_secs = 0\n", Path::new("rnup.toml")).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Settings::from_toml_str("retries = 3\n", Path::new("rnup.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Settings::load(dir.path(), None).unwrap(), Settings::default());
    }

    #[test]
    fn test_load_from_project_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "debounce_ms = 50\n").unwrap();
        let settings = Settings::load(dir.path(), None).unwrap();
        assert_eq!(settings.debounce(), Duration::from_millis(50));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("custom.toml");
        let err = Settings::load(dir.path(), Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}
