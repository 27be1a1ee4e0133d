//! Application of approved requirement results to a manifest document

use crate::domain::{ChangeType, RequirementResult};
use crate::manifest::ManifestDocument;
use crate::version;
use serde::Serialize;
use tracing::{debug, warn};

/// A selected edit that could not be applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyFailure {
    /// Package name
    pub package_name: String,
    /// Edit that was attempted
    pub change_type: ChangeType,
    /// Why nothing changed
    pub reason: String,
}

/// Per-package results of one apply pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Packages whose edit took effect
    pub applied: Vec<String>,
    /// Packages whose edit did not
    pub failed: Vec<ApplyFailure>,
}

impl ApplyReport {
    /// Number of edits that took effect
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    /// Returns true if no selected edit took effect
    pub fn nothing_applied(&self) -> bool {
        self.applied.is_empty()
    }

    /// Returns true if some edits took effect and some did not
    pub fn is_partial(&self) -> bool {
        !self.applied.is_empty() && !self.failed.is_empty()
    }
}

/// Result of applying edits to an owned document
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    /// Document after the edits and re-sort
    pub document: ManifestDocument,
    /// Number of edits that took effect
    pub applied_count: usize,
    /// Edits that did not take effect
    pub failed: Vec<ApplyFailure>,
}

/// Apply the selected results to a document and hand it back
pub fn apply(mut document: ManifestDocument, selected: &[RequirementResult]) -> ApplyOutcome {
    let report = apply_in_place(&mut document, selected);
    ApplyOutcome {
        document,
        applied_count: report.applied_count(),
        failed: report.failed,
    }
}

/// Apply the selected results to a document.
///
/// Best effort: each package is applied on its own and failures are
/// collected. A version change keeps the local range prefix; an exact local
/// entry takes the required version as written. Both dependency sections are
/// re-sorted afterwards.
pub fn apply_in_place(document: &mut ManifestDocument, selected: &[RequirementResult]) -> ApplyReport {
    let mut report = ApplyReport::default();

    for result in selected {
        let name = result.package_name.as_str();
        let outcome = match result.change_type {
            ChangeType::Addition => {
                if result.required_version.is_empty() {
                    Err("no version to add")
                } else {
                    document.set_package(result.dependency_type, name, &result.required_version);
                    Ok(())
                }
            }
            ChangeType::Removal => {
                if document.remove_package(name) {
                    Ok(())
                } else {
                    Err("not declared in any dependency section")
                }
            }
            ChangeType::VersionChange => {
                let required = result.required_version.as_str();
                let found = document.update_version(name, |existing| {
                    match version::prefix(existing) {
                        "" => required.to_string(),
                        local => format!("{}{}", local, version::clean(required)),
                    }
                });
                if found {
                    Ok(())
                } else {
                    Err("not declared in any dependency section")
                }
            }
        };

        match outcome {
            Ok(()) => {
                debug!(package = name, change = %result.change_type, "applied");
                report.applied.push(name.to_string());
            }
            Err(reason) => {
                warn!(package = name, change = %result.change_type, "not applied: {}", reason);
                report.failed.push(ApplyFailure {
                    package_name: name.to_string(),
                    change_type: result.change_type,
                    reason: reason.to_string(),
                });
            }
        }
    }

    document.sort_sections();
    report
}
