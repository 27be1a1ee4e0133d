//! Requirement results: the edits needed to satisfy a target release

use super::{ChangeType, DependencyType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single edit the user's manifest needs to match the target release.
///
/// Created fresh on every reconciliation pass; any edit to the manifest
/// invalidates previously computed results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementResult {
    /// Package name
    pub package_name: String,
    /// Version currently declared (empty for additions)
    pub current_version: String,
    /// Version the target release expects (empty for removals)
    pub required_version: String,
    /// Edit to perform
    pub change_type: ChangeType,
    /// Section the edit applies to
    pub dependency_type: DependencyType,
    /// Whether the manifest currently disagrees with the target release
    pub has_mismatch: bool,
}

impl RequirementResult {
    /// Creates a result for a package that must be added
    pub fn addition(
        name: impl Into<String>,
        required_version: impl Into<String>,
        dependency_type: DependencyType,
    ) -> Self {
        Self {
            package_name: name.into(),
            current_version: String::new(),
            required_version: required_version.into(),
            change_type: ChangeType::Addition,
            dependency_type,
            has_mismatch: true,
        }
    }

    /// Creates a result for a package that must be removed
    pub fn removal(
        name: impl Into<String>,
        current_version: impl Into<String>,
        dependency_type: DependencyType,
    ) -> Self {
        Self {
            package_name: name.into(),
            current_version: current_version.into(),
            required_version: String::new(),
            change_type: ChangeType::Removal,
            dependency_type,
            has_mismatch: true,
        }
    }

    /// Creates a result for a package whose version must change
    pub fn version_change(
        name: impl Into<String>,
        current_version: impl Into<String>,
        required_version: impl Into<String>,
        dependency_type: DependencyType,
    ) -> Self {
        let current_version = current_version.into();
        let required_version = required_version.into();
        let has_mismatch = !crate::version::same_version(&current_version, &required_version);
        Self {
            package_name: name.into(),
            current_version,
            required_version,
            change_type: ChangeType::VersionChange,
            dependency_type,
            has_mismatch,
        }
    }
}

impl fmt::Display for RequirementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.change_type {
            ChangeType::Addition => write!(f, "add {}@{}", self.package_name, self.required_version),
            ChangeType::Removal => write!(f, "remove {}@{}", self.package_name, self.current_version),
            ChangeType::VersionChange => write!(
                f,
                "update {} {} -> {}",
                self.package_name, self.current_version, self.required_version
            ),
        }
    }
}
