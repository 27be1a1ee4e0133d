//! Reconciliation of upstream package changes against a local manifest
//!
//! The engine is a pure function of the declared packages and the change
//! list: no I/O, no caching. Results are recomputed on every pass.

use crate::domain::{ChangeType, DependencyType, PackageChange, RequirementResult};
use crate::error::ValidationError;
use crate::manifest::ManifestDocument;
use crate::version;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Packages declared in the local manifest, with the section each lives in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledPackages {
    packages: BTreeMap<String, (String, DependencyType)>,
}

impl InstalledPackages {
    /// Collect both dependency sections of a document.
    ///
    /// A package declared in both sections is reported from `dependencies`.
    pub fn from_document(doc: &ManifestDocument) -> Self {
        let mut installed = Self::default();
        for kind in DependencyType::ALL {
            for (name, version) in doc.section(kind) {
                installed.insert(name, version, kind);
            }
        }
        installed
    }

    /// Collect packages from plain `name → version` maps
    pub fn from_sections(
        dependencies: BTreeMap<String, String>,
        dev_dependencies: BTreeMap<String, String>,
    ) -> Self {
        let mut installed = Self::default();
        for (name, version) in dependencies {
            installed.insert(name, version, DependencyType::Dependencies);
        }
        for (name, version) in dev_dependencies {
            installed.insert(name, version, DependencyType::DevDependencies);
        }
        installed
    }

    fn insert(&mut self, name: String, version: String, kind: DependencyType) {
        self.packages.entry(name).or_insert((version, kind));
    }

    /// Declared version and section of a package
    pub fn get(&self, name: &str) -> Option<(&str, DependencyType)> {
        self.packages
            .get(name)
            .map(|(version, kind)| (version.as_str(), *kind))
    }

    /// Number of declared packages
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Returns true if nothing is declared
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Compute the edits the manifest needs to match the target release.
///
/// Results are grouped `dependencies` first, then `devDependencies`, and
/// ordered by package name inside each group. Each package appears at most
/// once.
pub fn reconcile(installed: &InstalledPackages, changes: &[PackageChange]) -> Vec<RequirementResult> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut results = Vec::new();

    for change in changes {
        if !seen.insert(change.package_name.as_str()) {
            continue;
        }
        let name = change.package_name.as_str();
        let local = installed.get(name);

        let result = match change.change_type {
            ChangeType::VersionChange => match local {
                Some((current, section))
                    if !version::same_version(current, &change.to_version) =>
                {
                    Some(RequirementResult::version_change(
                        name,
                        current,
                        &change.to_version,
                        section,
                    ))
                }
                Some(_) => None,
                None => {
                    debug!(package = name, "not declared locally, skipping version change");
                    None
                }
            },
            ChangeType::Addition => match local {
                None => Some(RequirementResult::addition(
                    name,
                    &change.to_version,
                    change.dependency_type,
                )),
                Some((current, section))
                    if !version::same_version(current, &change.to_version) =>
                {
                    Some(RequirementResult::version_change(
                        name,
                        current,
                        &change.to_version,
                        section,
                    ))
                }
                Some(_) => None,
            },
            ChangeType::Removal => local
                .map(|(current, section)| RequirementResult::removal(name, current, section)),
        };

        results.extend(result);
    }

    results.sort_by(|a, b| {
        a.dependency_type
            .cmp(&b.dependency_type)
            .then_with(|| a.package_name.cmp(&b.package_name))
    });
    results
}

/// The pair of reference releases a diff is fetched for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPair {
    /// Older reference release
    pub from: String,
    /// Newer reference release
    pub to: String,
    /// Whether `from` is a synthetic baseline below an identical target
    pub synthetic_baseline: bool,
}

/// Work out which diff to fetch for an upgrade from `current` to `target`.
///
/// Rejects downgrades, ordering pre-releases below their final release.
/// When both name the same release the `from` side
/// becomes `baseline` if given, or a release just below the target, so the
/// diff still surfaces packages that drifted from the template.
pub fn resolve_pair(
    current: &str,
    target: &str,
    baseline: Option<&str>,
) -> Result<VersionPair, ValidationError> {
    let target_release = version::parse_release(target)?;
    let current_release = version::parse_release(current)?;
    let to = target_release.to_string();
    let from = current_release.to_string();

    match target_release.cmp_precedence(&current_release) {
        Ordering::Less => return Err(ValidationError::downgrade(from, to)),
        Ordering::Greater => {
            return Ok(VersionPair {
                from,
                to,
                synthetic_baseline: false,
            })
        }
        Ordering::Equal => {}
    }

    let from = match baseline {
        Some(baseline) => version::parse_release(baseline)?.to_string(),
        None => version::baseline_below(&target_release)
            .ok_or_else(|| ValidationError::invalid_version(&to))?
            .to_string(),
    };
    debug!(%from, %to, "same-version upgrade, using baseline");

    Ok(VersionPair {
        from,
        to,
        synthetic_baseline: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn installed(deps: &[(&str, &str)], dev: &[(&str, &str)]) -> InstalledPackages {
        let map = |entries: &[(&str, &str)]| {
            entries
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect()
        };
        InstalledPackages::from_sections(map(deps), map(dev))
    }

    const DEPS: DependencyType = DependencyType::Dependencies;
    const DEV: DependencyType = DependencyType::DevDependencies;

    #[test]
    fn test_version_change_for_declared_package() {
        let installed = installed(&[("a", "1.0.0")], &[]);
        let changes = vec![PackageChange::version_change("a", "1.0.0", "1.1.0", DEPS)];

        let results = reconcile(&installed, &changes);
        assert_eq!(results, vec![RequirementResult::version_change("a", "1.0.0", "1.1.0", DEPS)]);
        assert!(results[0].has_mismatch);
    }

    #[test]
    fn test_version_change_already_at_target() {
        let installed = installed(&[("a", "^1.1.0")], &[]);
        let changes = vec![PackageChange::version_change("a", "1.0.0", "1.1.0", DEPS)];
        assert!(reconcile(&installed, &changes).is_empty());
    }

    #[test]
    fn test_version_change_for_absent_package_is_dropped() {
        let installed = installed(&[], &[]);
        let changes = vec![PackageChange::version_change("a", "1.0.0", "1.1.0", DEPS)];
        assert!(reconcile(&installed, &changes).is_empty());
    }

    #[test]
    fn test_version_change_reports_local_section() {
        let installed = installed(&[], &[("typescript", "5.0.4")]);
        let changes = vec![PackageChange::version_change("typescript", "5.0.4", "5.5.0", DEPS)];

        let results = reconcile(&installed, &changes);
        assert_eq!(results[0].dependency_type, DEV);
    }

    #[test]
    fn test_addition_for_absent_package() {
        let installed = installed(&[], &[]);
        let changes = vec![PackageChange::addition("a", "2.0.0", DEPS)];
        assert_eq!(
            reconcile(&installed, &changes),
            vec![RequirementResult::addition("a", "2.0.0", DEPS)]
        );
    }

    #[test]
    fn test_addition_demoted_to_version_change() {
        let installed = installed(&[], &[("cli", "13.0.0")]);
        let changes = vec![PackageChange::addition("cli", "14.0.0", DEV)];

        let results = reconcile(&installed, &changes);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].change_type, ChangeType::VersionChange);
        assert_eq!(results[0].current_version, "13.0.0");
        assert_eq!(results[0].required_version, "14.0.0");
    }

    #[test]
    fn test_addition_already_present() {
        let installed = installed(&[("a", "~2.0.0")], &[]);
        let changes = vec![PackageChange::addition("a", "2.0.0", DEPS)];
        assert!(reconcile(&installed, &changes).is_empty());
    }

    #[test]
    fn test_removal() {
        let installed = installed(&[], &[("old", "^0.77.0")]);
        let changes = vec![
            PackageChange::removal("old", "0.77.0", DEV),
            PackageChange::removal("never-installed", "1.0.0", DEV),
        ];
        assert_eq!(
            reconcile(&installed, &changes),
            vec![RequirementResult::removal("old", "^0.77.0", DEV)]
        );
    }

    #[test]
    fn test_ordering_groups_then_names() {
        let installed = installed(&[("b", "1.0.0"), ("z", "1.0.0")], &[("a", "1.0.0")]);
        let changes = vec![
            PackageChange::version_change("z", "1.0.0", "2.0.0", DEPS),
            PackageChange::version_change("a", "1.0.0", "2.0.0", DEV),
            PackageChange::addition("c", "1.0.0", DEV),
            PackageChange::version_change("b", "1.0.0", "2.0.0", DEPS),
        ];
        let order: Vec<_> = reconcile(&installed, &changes)
            .into_iter()
            .map(|r| (r.dependency_type, r.package_name))
            .collect();
        assert_eq!(
            order,
            vec![
                (DEPS, "b".to_string()),
                (DEPS, "z".to_string()),
                (DEV, "a".to_string()),
                (DEV, "c".to_string()),
            ]
        );
    }

    #[test]
    fn test_duplicate_changes_produce_one_result() {
        let installed = installed(&[("a", "1.0.0")], &[]);
        let changes = vec![
            PackageChange::version_change("a", "1.0.0", "1.1.0", DEPS),
            PackageChange::version_change("a", "1.0.0", "1.2.0", DEPS),
        ];
        assert_eq!(reconcile(&installed, &changes).len(), 1);
    }

    #[test]
    fn test_installed_prefers_dependencies() {
        let installed = installed(&[("a", "1.0.0")], &[("a", "2.0.0")]);
        assert_eq!(installed.get("a"), Some(("1.0.0", DEPS)));
        assert_eq!(installed.len(), 1);
    }

    #[test]
    fn test_installed_from_document() {
        let doc = ManifestDocument::parse(
            r#"{"dependencies": {"react": "18.2.0"}, "devDependencies": {"jest": "^29.0.0"}}"#,
        )
        .unwrap();
        let installed = InstalledPackages::from_document(&doc);
        assert_eq!(installed.get("jest"), Some(("^29.0.0", DEV)));
        assert!(installed.get("missing").is_none());
    }

    #[test]
    fn test_resolve_pair_upgrade() {
        let pair = resolve_pair("^0.74.0", "0.75.1", None).unwrap();
        assert_eq!(pair.from, "0.74.0");
        assert_eq!(pair.to, "0.75.1");
        assert!(!pair.synthetic_baseline);
    }

    #[test]
    fn test_resolve_pair_rejects_downgrade() {
        let err = resolve_pair("0.75.0", "0.74.0", None).unwrap_err();
        assert_eq!(err, ValidationError::downgrade("0.75.0", "0.74.0"));
    }

    #[test]
    fn test_resolve_pair_release_candidate_to_final() {
        let pair = resolve_pair("0.74.0-rc.3", "0.74.0", None).unwrap();
        assert_eq!(pair.from, "0.74.0-rc.3");
        assert_eq!(pair.to, "0.74.0");
        assert!(!pair.synthetic_baseline);

        let err = resolve_pair("0.74.0", "0.74.0-rc.3", None).unwrap_err();
        assert_eq!(err, ValidationError::downgrade("0.74.0", "0.74.0-rc.3"));
    }

    #[test]
    fn test_resolve_pair_same_version_uses_baseline() {
        let pair = resolve_pair("0.75.1", "0.75.1", None).unwrap();
        assert_eq!(pair.from, "0.75.0");
        assert!(pair.synthetic_baseline);

        let pair = resolve_pair("0.75.0", "0.75.0", None).unwrap();
        assert_eq!(pair.from, "0.74.0");
    }

    #[test]
    fn test_resolve_pair_configured_baseline_wins() {
        let pair = resolve_pair("0.75.1", "0.75.1", Some("0.74.3")).unwrap();
        assert_eq!(pair.from, "0.74.3");
    }

    #[test]
    fn test_resolve_pair_invalid_versions() {
        assert!(matches!(
            resolve_pair("0.74.0", "next", None),
            Err(ValidationError::InvalidVersion { .. })
        ));
        assert!(matches!(
            resolve_pair("0.0.0", "0.0.0", None),
            Err(ValidationError::InvalidVersion { .. })
        ));
    }
}
