//! Selection of requirement results to apply
//!
//! This module provides the Selection struct that narrows a reconciliation
//! report down to the packages the user approved.

use crate::domain::RequirementResult;

/// Package filter applied before edits
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// If non-empty, only apply these packages
    pub only: Vec<String>,
    /// Packages to leave alone
    pub exclude: Vec<String>,
    /// Include devDependencies results
    pub include_dev: bool,
}

impl Selection {
    /// Create a selection that accepts dependencies results only
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a selection that accepts everything
    pub fn all() -> Self {
        Self::new().with_include_dev(true)
    }

    /// Set packages to include (only list)
    pub fn with_only(mut self, only: Vec<String>) -> Self {
        self.only = only;
        self
    }

    /// Set packages to exclude
    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Set whether devDependencies results are included
    pub fn with_include_dev(mut self, include_dev: bool) -> Self {
        self.include_dev = include_dev;
        self
    }

    /// Check if a result is selected
    pub fn accepts(&self, result: &RequirementResult) -> bool {
        if result.dependency_type.is_dev() && !self.include_dev {
            return false;
        }
        let name = result.package_name.as_str();
        if !self.only.is_empty() {
            return self.only.iter().any(|p| p == name);
        }
        !self.exclude.iter().any(|p| p == name)
    }

    /// Keep only the selected results, preserving order
    pub fn filter(&self, results: &[RequirementResult]) -> Vec<RequirementResult> {
        results
            .iter()
            .filter(|r| self.accepts(r))
            .cloned()
            .collect()
    }
}
