//! Dependency section types

use serde::{Deserialize, Serialize};
use std::fmt;

/// A dependency section of package.json
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum DependencyType {
    /// `dependencies`
    #[default]
    #[serde(rename = "dependencies")]
    Dependencies,
    /// `devDependencies`
    #[serde(rename = "devDependencies")]
    DevDependencies,
}

impl DependencyType {
    /// Both sections, in presentation order
    pub const ALL: [DependencyType; 2] =
        [DependencyType::Dependencies, DependencyType::DevDependencies];

    /// Returns the JSON key of this section
    pub fn key(&self) -> &'static str {
        match self {
            DependencyType::Dependencies => "dependencies",
            DependencyType::DevDependencies => "devDependencies",
        }
    }

    /// Look up a section by its JSON key
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "dependencies" => Some(DependencyType::Dependencies),
            "devDependencies" => Some(DependencyType::DevDependencies),
            _ => None,
        }
    }

    /// Returns true for devDependencies
    pub fn is_dev(&self) -> bool {
        matches!(self, DependencyType::DevDependencies)
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Section that encloses a line of raw manifest text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Inside a dependency section
    Dependency(DependencyType),
    /// Anywhere else: `scripts`, `engines`, `peerDependencies`, top level, ...
    Other,
}

impl Section {
    /// Returns the dependency type if this is a dependency section
    pub fn dependency_type(&self) -> Option<DependencyType> {
        match self {
            Section::Dependency(kind) => Some(*kind),
            Section::Other => None,
        }
    }
}
