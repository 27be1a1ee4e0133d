//! In-memory package.json document
//!
//! Only the dependency sections are modeled as name→version maps; every other
//! top-level key is carried through untouched (key order preserved). An
//! unmodified document serializes back to its exact input text.

use crate::domain::DependencyType;
use crate::error::ManifestError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A parsed package.json, owned by a single read-modify-write cycle
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument {
    /// Full JSON object, top-level key order preserved
    root: Map<String, Value>,
    /// Text the document was parsed from
    raw: String,
    /// Whether the raw text ended with a newline
    trailing_newline: bool,
    /// Whether any mutation changed the document since parsing
    dirty: bool,
}

impl ManifestDocument {
    /// Parse manifest text.
    ///
    /// Fails on invalid JSON or when the top-level value is not an object.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ManifestError::parse(e.to_string()))?;

        let Value::Object(root) = value else {
            return Err(ManifestError::parse("top-level value is not an object"));
        };

        Ok(Self {
            root,
            raw: text.to_string(),
            trailing_newline: text.ends_with('\n'),
            dirty: false,
        })
    }

    /// Returns true if the document was changed since it was parsed
    pub fn is_modified(&self) -> bool {
        self.dirty
    }

    /// Returns the `name → version` entries of one section
    pub fn section(&self, kind: DependencyType) -> BTreeMap<String, String> {
        self.section_object(kind)
            .map(|deps| {
                deps.iter()
                    .filter_map(|(name, version)| {
                        version.as_str().map(|v| (name.clone(), v.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns all declared packages, optionally including devDependencies.
    ///
    /// A package declared in both sections reports its `dependencies` version.
    pub fn extract_dependencies(&self, include_dev: bool) -> BTreeMap<String, String> {
        let mut packages = self.section(DependencyType::Dependencies);
        if include_dev {
            for (name, version) in self.section(DependencyType::DevDependencies) {
                packages.entry(name).or_insert(version);
            }
        }
        packages
    }

    /// Returns the declared version and section of a package.
    ///
    /// `dependencies` wins over `devDependencies`.
    pub fn version_of(&self, name: &str) -> Option<(DependencyType, &str)> {
        DependencyType::ALL.into_iter().find_map(|kind| {
            self.section_object(kind)
                .and_then(|deps| deps.get(name))
                .and_then(Value::as_str)
                .map(|version| (kind, version))
        })
    }

    /// Returns true if the package is declared only in devDependencies
    pub fn is_dev_only(&self, name: &str) -> bool {
        let declared_in = |kind| {
            self.section_object(kind)
                .map(|deps| deps.contains_key(name))
                .unwrap_or(false)
        };
        declared_in(DependencyType::DevDependencies) && !declared_in(DependencyType::Dependencies)
    }

    /// Insert or overwrite a package in a section, then re-sort that section
    pub fn set_package(&mut self, kind: DependencyType, name: &str, version: &str) {
        let slot = self
            .root
            .entry(kind.key())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        if let Value::Object(deps) = slot {
            if deps.get(name).and_then(Value::as_str) != Some(version) {
                deps.insert(name.to_string(), Value::String(version.to_string()));
                self.dirty = true;
            }
        }
        self.sort_section(kind);
    }

    /// Overwrite the version of a package in every section that declares it.
    ///
    /// `version_for` receives the currently declared version and returns the
    /// replacement. Returns false if no section declares the package.
    pub fn update_version(&mut self, name: &str, version_for: impl Fn(&str) -> String) -> bool {
        let mut found = false;
        for kind in DependencyType::ALL {
            let Some(Value::Object(deps)) = self.root.get_mut(kind.key()) else {
                continue;
            };
            let Some(current) = deps.get(name).and_then(Value::as_str) else {
                continue;
            };
            found = true;
            let replacement = version_for(current);
            if replacement != current {
                deps.insert(name.to_string(), Value::String(replacement));
                self.dirty = true;
            }
        }
        found
    }

    /// Remove a package from whichever section(s) contain it
    pub fn remove_package(&mut self, name: &str) -> bool {
        let mut removed = false;
        for kind in DependencyType::ALL {
            if let Some(Value::Object(deps)) = self.root.get_mut(kind.key()) {
                if deps.shift_remove(name).is_some() {
                    removed = true;
                }
            }
        }
        if removed {
            self.dirty = true;
        }
        removed
    }

    /// Sort both dependency sections by package name
    pub fn sort_sections(&mut self) {
        for kind in DependencyType::ALL {
            self.sort_section(kind);
        }
    }

    /// Serialize the document.
    ///
    /// Unmodified documents return their original text; modified ones are
    /// re-emitted as two-space indented JSON, keeping the trailing newline
    /// convention of the input.
    pub fn serialize(&self) -> Result<String, ManifestError> {
        if !self.dirty {
            return Ok(self.raw.clone());
        }
        self.to_pretty_string()
    }

    /// Re-emit the document as two-space indented JSON regardless of changes
    pub fn to_pretty_string(&self) -> Result<String, ManifestError> {
        let mut text = serde_json::to_string_pretty(&self.root)
            .map_err(|e| ManifestError::parse(e.to_string()))?;
        if self.trailing_newline {
            text.push('\n');
        }
        Ok(text)
    }

    fn section_object(&self, kind: DependencyType) -> Option<&Map<String, Value>> {
        self.root.get(kind.key()).and_then(Value::as_object)
    }

    fn sort_section(&mut self, kind: DependencyType) {
        let Some(Value::Object(deps)) = self.root.get_mut(kind.key()) else {
            return;
        };
        let already_sorted = deps
            .keys()
            .zip(deps.keys().skip(1))
            .all(|(a, b)| a.as_str() <= b.as_str());
        if already_sorted {
            return;
        }

        let mut entries: Vec<(String, Value)> = std::mem::take(deps).into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        deps.extend(entries);
        self.dirty = true;
    }
}
