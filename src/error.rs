//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: Issues reading, parsing or writing package.json
//! - DiffError: Issues fetching the upstream release diff for a version pair
//! - RegistryError: Issues talking to the package metadata API
//! - ValidationError: Rejected upgrade requests (checked before any fetch)
//! - ConfigError: Issues loading settings or persisted state

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Release diff related errors
    #[error(transparent)]
    Diff(#[from] DiffError),

    /// Package metadata API errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Upgrade request validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write manifest file
    #[error("failed to write manifest file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest text is not valid JSON (or not a JSON object)
    #[error("failed to parse manifest JSON: {message}")]
    Parse { message: String },
}

/// Errors related to fetching the release diff for a version pair
#[derive(Error, Debug)]
pub enum DiffError {
    /// The diff source has no diff for this pair (HTTP 404)
    #[error("no upgrade diff is tracked for {from}..{to}; the version may not be in the tracked release history")]
    NotFound { from: String, to: String },

    /// Network failure or unexpected HTTP status
    #[error("failed to fetch upgrade diff {from}..{to}: {message}")]
    Fetch {
        from: String,
        to: String,
        message: String,
    },

    /// The request did not complete within the configured timeout
    #[error("timeout while fetching upgrade diff {from}..{to}")]
    Timeout { from: String, to: String },
}

/// Errors related to the package metadata API
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Network request failed
    #[error("failed to query {registry}: {message}")]
    NetworkError { registry: String, message: String },

    /// Timeout
    #[error("timeout while querying {registry}")]
    Timeout { registry: String },

    /// Invalid response from registry
    #[error("invalid response from {registry}: {message}")]
    InvalidResponse { registry: String, message: String },
}

/// Upgrade requests rejected before any network activity
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Target version is lower than the current version
    #[error("cannot upgrade from {from} to {to}: target version is older than the current version")]
    Downgrade { from: String, to: String },

    /// Version string is not a usable release version
    #[error("invalid version '{value}': expected MAJOR.MINOR.PATCH")]
    InvalidVersion { value: String },

    /// The framework package is not declared in the manifest
    #[error("cannot determine the current {package} version: it is not declared in the manifest")]
    UnknownFrameworkVersion { package: String },

    /// No target version was given and none is persisted
    #[error("no target version: pass --to or enable an upgrade with `rnup check --to <version>`")]
    MissingTarget,
}

/// Errors related to configuration and persisted state
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration or state file
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a configuration or state file
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File contents could not be parsed
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A setting has an unusable value
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError, mapping a missing file to NotFound
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return ManifestError::NotFound { path };
        }
        ManifestError::ReadError { path, source }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new Parse error
    pub fn parse(message: impl Into<String>) -> Self {
        ManifestError::Parse {
            message: message.into(),
        }
    }
}

impl DiffError {
    /// Creates a new NotFound error
    pub fn not_found(from: impl Into<String>, to: impl Into<String>) -> Self {
        DiffError::NotFound {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Creates a new Fetch error
    pub fn fetch(from: impl Into<String>, to: impl Into<String>, message: impl Into<String>) -> Self {
        DiffError::Fetch {
            from: from.into(),
            to: to.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(from: impl Into<String>, to: impl Into<String>) -> Self {
        DiffError::Timeout {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Returns true if the pair is not tracked upstream
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiffError::NotFound { .. })
    }
}

impl RegistryError {
    /// Creates a new NetworkError
    pub fn network_error(registry: impl Into<String>, message: impl Into<String>) -> Self {
        RegistryError::NetworkError {
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            registry: registry.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(registry: impl Into<String>, message: impl Into<String>) -> Self {
        RegistryError::InvalidResponse {
            registry: registry.into(),
            message: message.into(),
        }
    }
}

impl ValidationError {
    /// Creates a new Downgrade error
    pub fn downgrade(from: impl Into<String>, to: impl Into<String>) -> Self {
        ValidationError::Downgrade {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Creates a new InvalidVersion error
    pub fn invalid_version(value: impl Into<String>) -> Self {
        ValidationError::InvalidVersion {
            value: value.into(),
        }
    }
}
