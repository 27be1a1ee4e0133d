//! Package changes extracted from an upstream release diff

use super::DependencyType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of edit a package change or requirement represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Package is new in the target release
    Addition,
    /// Package was dropped in the target release
    Removal,
    /// Package version differs between releases
    VersionChange,
}

impl ChangeType {
    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            ChangeType::Addition => "add",
            ChangeType::Removal => "remove",
            ChangeType::VersionChange => "update",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single package difference between two reference releases.
///
/// `from_version` is empty for additions and `to_version` is empty for removals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageChange {
    /// Package name
    pub package_name: String,
    /// Version in the older reference release
    pub from_version: String,
    /// Version in the newer reference release
    pub to_version: String,
    /// What kind of change this is
    pub change_type: ChangeType,
    /// Section the upstream diff shows the package in
    pub dependency_type: DependencyType,
}

impl PackageChange {
    /// Creates an Addition change
    pub fn addition(
        name: impl Into<String>,
        to_version: impl Into<String>,
        dependency_type: DependencyType,
    ) -> Self {
        Self {
            package_name: name.into(),
            from_version: String::new(),
            to_version: to_version.into(),
            change_type: ChangeType::Addition,
            dependency_type,
        }
    }

    /// Creates a Removal change
    pub fn removal(
        name: impl Into<String>,
        from_version: impl Into<String>,
        dependency_type: DependencyType,
    ) -> Self {
        Self {
            package_name: name.into(),
            from_version: from_version.into(),
            to_version: String::new(),
            change_type: ChangeType::Removal,
            dependency_type,
        }
    }

    /// Creates a VersionChange change
    pub fn version_change(
        name: impl Into<String>,
        from_version: impl Into<String>,
        to_version: impl Into<String>,
        dependency_type: DependencyType,
    ) -> Self {
        Self {
            package_name: name.into(),
            from_version: from_version.into(),
            to_version: to_version.into(),
            change_type: ChangeType::VersionChange,
            dependency_type,
        }
    }
}

impl fmt::Display for PackageChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.change_type {
            ChangeType::Addition => write!(f, "+ {}@{}", self.package_name, self.to_version),
            ChangeType::Removal => write!(f, "- {}@{}", self.package_name, self.from_version),
            ChangeType::VersionChange => write!(
                f,
                "~ {} {} -> {}",
                self.package_name, self.from_version, self.to_version
            ),
        }?;
        if self.dependency_type.is_dev() {
            write!(f, " (dev)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addition_has_no_from_version() {
        let change = PackageChange::addition("react", "18.3.1", DependencyType::Dependencies);
        assert_eq!(change.change_type, ChangeType::Addition);
        assert!(change.from_version.is_empty());
        assert_eq!(change.to_version, "18.3.1");
    }

    #[test]
    fn test_removal_has_no_to_version() {
        let change = PackageChange::removal("metro-react-native-babel-preset", "0.77.0", DependencyType::DevDependencies);
        assert_eq!(change.change_type, ChangeType::Removal);
        assert!(change.to_version.is_empty());
    }

    #[test]
    fn test_display() {
        let change = PackageChange::version_change("react-native", "0.74.0", "0.75.1", DependencyType::Dependencies);
        assert_eq!(change.to_string(), "~ react-native 0.74.0 -> 0.75.1");

        let change = PackageChange::addition("@react-native/babel-preset", "0.75.1", DependencyType::DevDependencies);
        assert_eq!(change.to_string(), "+ @react-native/babel-preset@0.75.1 (dev)");
    }

    #[test]
    fn test_serde_change_type() {
        let json = serde_json::to_string(&ChangeType::VersionChange).unwrap();
        assert_eq!(json, "\"version_change\"");
        let parsed: ChangeType = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ChangeType::VersionChange);
    }
}
