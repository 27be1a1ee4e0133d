//! Core domain models for rnup
//!
//! This module contains the fundamental types used throughout the application:
//! - Dependency sections of a manifest
//! - Package changes extracted from an upstream release diff
//! - Requirement results computed against the user's manifest
//! - Package metadata returned by the directory API

mod change;
mod package_info;
mod requirement;
mod section;

pub use change::{ChangeType, PackageChange};
pub use package_info::{ArchStatus, PackageInfo, Platforms};
pub use requirement::RequirementResult;
pub use section::{DependencyType, Section};
