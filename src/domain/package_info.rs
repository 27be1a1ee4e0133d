//! Package metadata returned by the React Native Directory API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// New Architecture compatibility status of a package
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchStatus {
    /// Works with the New Architecture
    Supported,
    /// Known not to work with the New Architecture
    Unsupported,
    /// Nobody has checked yet
    Untested,
    /// Not listed in the directory (also used for unknown values)
    #[default]
    #[serde(other)]
    Unlisted,
}

impl ArchStatus {
    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            ArchStatus::Supported => "supported",
            ArchStatus::Unsupported => "unsupported",
            ArchStatus::Untested => "untested",
            ArchStatus::Unlisted => "unlisted",
        }
    }
}

impl fmt::Display for ArchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Platforms a package declares support for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Platforms {
    pub ios: bool,
    pub android: bool,
    pub web: bool,
    pub windows: bool,
    pub macos: bool,
    pub expo_go: bool,
}

impl Platforms {
    /// Short names of the supported platforms
    pub fn names(&self) -> Vec<&'static str> {
        [
            (self.ios, "ios"),
            (self.android, "android"),
            (self.web, "web"),
            (self.windows, "windows"),
            (self.macos, "macos"),
            (self.expo_go, "expo-go"),
        ]
        .into_iter()
        .filter_map(|(enabled, name)| enabled.then_some(name))
        .collect()
    }
}

/// Compatibility and maintenance information for one package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageInfo {
    /// New Architecture status
    pub new_architecture: ArchStatus,
    /// Whether the package is flagged as unmaintained
    pub unmaintained: bool,
    /// Latest published version, if known
    pub latest_release: Option<String>,
    /// When the latest version was published
    pub latest_release_date: Option<DateTime<Utc>>,
    /// Supported platforms
    pub platforms: Platforms,
    /// Source repository URL
    pub github_url: Option<String>,
}

impl PackageInfo {
    /// Placeholder for packages the directory does not know about
    pub fn unlisted() -> Self {
        Self::default()
    }

    /// Returns true if the directory lists this package
    pub fn is_listed(&self) -> bool {
        self.new_architecture != ArchStatus::Unlisted
    }
}
