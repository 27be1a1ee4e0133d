//! Version comparison for manifest version strings
//!
//! Manifest versions look like `^0.75.1`, `~18.2.0` or `3.4`. Comparison is
//! purely numeric: range prefixes are stripped, components are compared as
//! integers and missing trailing components count as zero.

use crate::error::ValidationError;
use std::cmp::Ordering;

/// Strips a single leading `^` or `~` range prefix
pub fn clean(version: &str) -> &str {
    version
        .strip_prefix('^')
        .or_else(|| version.strip_prefix('~'))
        .unwrap_or(version)
}

/// Returns the range prefix (`^`, `~`) of a version string, if any
pub fn prefix(version: &str) -> &str {
    if version.starts_with('^') || version.starts_with('~') {
        &version[..1]
    } else {
        ""
    }
}

/// Compare two version strings component-wise.
///
/// Non-numeric components (e.g. `rc1` or `x`) compare as 0, so this never
/// panics on odd input; `1.2.x` and `1.2.0` are considered equal.
pub fn compare(a: &str, b: &str) -> Ordering {
    let parts_a = components(a);
    let parts_b = components(b);
    let len = parts_a.len().max(parts_b.len());

    for i in 0..len {
        let pa = parts_a.get(i).copied().unwrap_or(0);
        let pb = parts_b.get(i).copied().unwrap_or(0);
        match pa.cmp(&pb) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}

fn components(version: &str) -> Vec<u64> {
    version
        .trim()
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}

/// Returns true if `latest` is newer than `current`
pub fn has_update(current: &str, latest: &str) -> bool {
    compare(clean(latest), clean(current)) == Ordering::Greater
}

/// Returns true if moving to `target` would go backwards from `current`
pub fn is_downgrade(target: &str, current: &str) -> bool {
    compare(clean(target), clean(current)) == Ordering::Less
}

/// Returns true if both versions name the same release once prefixes are stripped
pub fn same_version(a: &str, b: &str) -> bool {
    clean(a) == clean(b)
}

/// Parse a release version given on the command line or in state.
///
/// Accepts an optional range prefix and returns the cleaned `MAJOR.MINOR.PATCH`.
pub fn parse_release(version: &str) -> Result<semver::Version, ValidationError> {
    semver::Version::parse(clean(version.trim()))
        .map_err(|_| ValidationError::invalid_version(version))
}

/// Synthetic reference version used when source and target are identical.
///
/// Steps one patch below the target, or one minor (then one major) below
/// when the lower components are zero. Returns `None` for `0.0.0`.
pub fn baseline_below(target: &semver::Version) -> Option<semver::Version> {
    if target.patch > 0 {
        Some(semver::Version::new(target.major, target.minor, target.patch - 1))
    } else if target.minor > 0 {
        Some(semver::Version::new(target.major, target.minor - 1, 0))
    } else if target.major > 0 {
        Some(semver::Version::new(target.major - 1, 0, 0))
    } else {
        None
    }
}

/// Classification of a version bump, used for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpKind {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch version change (fixes)
    Patch,
    /// Versions are equal or could not be classified
    None,
}

impl BumpKind {
    /// Determine the bump kind between two versions
    pub fn between(old: &str, new: &str) -> Self {
        let old = components(clean(old));
        let new = components(clean(new));
        let at = |v: &[u64], i: usize| v.get(i).copied().unwrap_or(0);

        if at(&old, 0) != at(&new, 0) {
            BumpKind::Major
        } else if at(&old, 1) != at(&new, 1) {
            BumpKind::Minor
        } else if at(&old, 2) != at(&new, 2) {
            BumpKind::Patch
        } else {
            BumpKind::None
        }
    }

    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            BumpKind::Major => "major",
            BumpKind::Minor => "minor",
            BumpKind::Patch => "patch",
            BumpKind::None => "",
        }
    }
}
