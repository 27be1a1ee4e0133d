//! Requirement reconciliation
//!
//! This module provides:
//! - The reconciliation engine: manifest state + package changes → requirement results
//! - Version pair resolution, including the same-version baseline
//! - Selection of results to apply
//! - The edit applier

mod applier;
mod engine;
mod selection;

pub use applier::{apply, apply_in_place, ApplyFailure, ApplyOutcome, ApplyReport};
pub use engine::{reconcile, resolve_pair, InstalledPackages, VersionPair};
pub use selection::Selection;
