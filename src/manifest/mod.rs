//! package.json model
//!
//! This module provides:
//! - `ManifestDocument`: structured parse/modify/serialize of the dependency sections
//! - Section classification of raw lines, so same-named keys outside
//!   `dependencies`/`devDependencies` are never mistaken for packages
//! - `ManifestStore`: per-file serialized read-modify-write cycles

mod document;
mod sections;
mod store;

pub use document::ManifestDocument;
pub use sections::{classify_section, find_package_line, locate_dependencies, DeclaredLine};
pub use store::{read_manifest, write_manifest, EditResult, ManifestStore};

use std::collections::BTreeMap;
use tracing::warn;

/// Declared packages of a manifest text, or none if it does not parse.
///
/// A manifest that is not valid JSON is treated as "no manifest available".
pub fn installed_packages(text: &str, include_dev: bool) -> BTreeMap<String, String> {
    match ManifestDocument::parse(text) {
        Ok(doc) => doc.extract_dependencies(include_dev),
        Err(e) => {
            warn!("ignoring unreadable manifest: {}", e);
            BTreeMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_installed_packages() {
        let text = r#"{"dependencies": {"a": "1.0.0"}, "devDependencies": {"b": "2.0.0"}}"#;
        assert_eq!(installed_packages(text, false).len(), 1);
        assert_eq!(installed_packages(text, true).len(), 2);
    }

    #[test]
    fn test_installed_packages_invalid_json_is_empty() {
        assert!(installed_packages("{ \"dependencies\": ", true).is_empty());
    }
}
