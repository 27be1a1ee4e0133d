//! Dependency annotations
//!
//! Joins the declared dependencies of a manifest with their directory
//! metadata. Each annotation carries the line the package is declared on,
//! found only inside `dependencies`/`devDependencies`.

use crate::domain::{ArchStatus, DependencyType, PackageInfo};
use crate::manifest::{locate_dependencies, ManifestDocument};
use crate::version;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Metadata for one declared dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    /// Package name
    pub package_name: String,
    /// Declared version
    pub current_version: String,
    /// Section declaring the package
    pub dependency_type: DependencyType,
    /// 0-based line of the declaration
    pub line: Option<usize>,
    /// Directory metadata (unlisted if unknown)
    pub info: PackageInfo,
    /// Whether the directory knows a newer release
    pub has_update: bool,
}

impl Annotation {
    /// New Architecture status
    pub fn status(&self) -> ArchStatus {
        self.info.new_architecture
    }

    /// Returns true if the package needs attention before an upgrade
    pub fn needs_attention(&self) -> bool {
        self.info.unmaintained || self.status() == ArchStatus::Unsupported
    }
}

/// Annotate every declared dependency of the manifest text.
///
/// A manifest that does not parse yields no annotations. Packages are listed
/// `dependencies` first, then `devDependencies`, by name inside each.
pub fn annotate(
    text: &str,
    infos: &HashMap<String, PackageInfo>,
    include_dev: bool,
) -> Vec<Annotation> {
    let doc = match ManifestDocument::parse(text) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("cannot annotate unreadable manifest: {}", e);
            return Vec::new();
        }
    };

    let lines: HashMap<(DependencyType, String), usize> = locate_dependencies(text)
        .into_iter()
        .map(|declared| ((declared.dependency_type, declared.name), declared.line))
        .collect();

    let mut seen = HashSet::new();
    let mut annotations = Vec::new();
    for kind in DependencyType::ALL {
        if kind.is_dev() && !include_dev {
            continue;
        }
        for (name, current) in doc.section(kind) {
            if !seen.insert(name.clone()) {
                continue;
            }
            let info = infos.get(&name).cloned().unwrap_or_else(PackageInfo::unlisted);
            let has_update = info
                .latest_release
                .as_deref()
                .map(|latest| version::has_update(&current, latest))
                .unwrap_or(false);
            annotations.push(Annotation {
                line: lines.get(&(kind, name.clone())).copied(),
                package_name: name,
                current_version: current,
                dependency_type: kind,
                info,
                has_update,
            });
        }
    }
    annotations
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
  "name": "app",
  "scripts": {
    "react-native": "react-native start"
  },
  "dependencies": {
    "react-native": "0.74.0",
    "react-native-svg": "^15.2.0"
  },
  "devDependencies": {
    "jest": "^29.6.3",
    "react-native": "0.74.0"
  }
}
"#;

    fn infos() -> HashMap<String, PackageInfo> {
        let mut infos = HashMap::new();
        infos.insert(
            "react-native-svg".to_string(),
            PackageInfo {
                new_architecture: ArchStatus::Supported,
                latest_release: Some("15.8.0".to_string()),
                ..PackageInfo::default()
            },
        );
        infos.insert(
            "jest".to_string(),
            PackageInfo {
                new_architecture: ArchStatus::Untested,
                unmaintained: true,
                latest_release: Some("29.6.3".to_string()),
                ..PackageInfo::default()
            },
        );
        infos
    }

    #[test]
    fn test_lines_come_from_dependency_sections() {
        let annotations = annotate(MANIFEST, &infos(), false);
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].package_name, "react-native");
        assert_eq!(annotations[0].line, Some(6));
        assert_eq!(annotations[1].line, Some(7));
    }

    #[test]
    fn test_has_update_and_status() {
        let annotations = annotate(MANIFEST, &infos(), true);
        let svg = annotations
            .iter()
            .find(|a| a.package_name == "react-native-svg")
            .unwrap();
        assert!(svg.has_update);
        assert_eq!(svg.status(), ArchStatus::Supported);

        let jest = annotations.iter().find(|a| a.package_name == "jest").unwrap();
        assert!(!jest.has_update);
        assert!(jest.needs_attention());
        assert_eq!(jest.line, Some(10));
    }

    #[test]
    fn test_unknown_packages_are_unlisted() {
        let annotations = annotate(MANIFEST, &HashMap::new(), false);
        assert!(annotations.iter().all(|a| !a.info.is_listed()));
        assert!(annotations.iter().all(|a| !a.has_update));
    }

    #[test]
    fn test_duplicate_declaration_reported_once() {
        let annotations = annotate(MANIFEST, &infos(), true);
        let count = annotations
            .iter()
            .filter(|a| a.package_name == "react-native")
            .count();
        assert_eq!(count, 1);
        assert_eq!(annotations.len(), 3);
    }

    #[test]
    fn test_invalid_manifest() {
        assert!(annotate("{\"dependencies\": {", &infos(), true).is_empty());
    }
}
