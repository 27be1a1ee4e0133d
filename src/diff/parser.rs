//! Unified diff parser for upstream package.json changes
//!
//! Turns the text of a release diff (as published for every pair of React
//! Native versions) into a list of [`PackageChange`]s. Only the hunks of the
//! manifest file are read; section tracking relies on literal key and brace
//! tokens because hunks restart indentation freely.

use crate::domain::{DependencyType, PackageChange};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

/// Added by the upstream template diffs but only meaningful to freshly
/// scaffolded apps, so it is never reported as an addition.
pub const SCAFFOLD_ONLY_PACKAGE: &str = "@react-native/new-app-screen";

/// Default manifest filename the parser looks for
pub const DEFAULT_MANIFEST_FILENAME: &str = "package.json";

static SECTION_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"([^"]+)"\s*:\s*\{"#).unwrap());
static PACKAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"([^"]+)"\s*:\s*"([^"]*)""#).unwrap());
static INLINE_PACKAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"\s*:\s*"([^"]*)""#).unwrap());

/// Kind of file header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Header {
    /// `diff --git a/... b/...`
    FileStart,
    /// `--- a/...` or `+++ b/...`
    Path,
}

/// A `"name": "version"` entry seen on one side of the diff
#[derive(Debug, Clone)]
struct Entry {
    version: String,
    section: DependencyType,
}

/// Parser for release diffs
#[derive(Debug, Clone)]
pub struct DiffParser {
    manifest_filename: String,
}

impl Default for DiffParser {
    fn default() -> Self {
        Self::new(DEFAULT_MANIFEST_FILENAME)
    }
}

impl DiffParser {
    /// Create a parser for the given manifest filename
    pub fn new(manifest_filename: impl Into<String>) -> Self {
        Self {
            manifest_filename: manifest_filename.into(),
        }
    }

    /// Parse diff text into package changes.
    ///
    /// Changes come out in the order their packages first appear in the diff.
    /// A package listed several times on one side keeps its last occurrence.
    pub fn parse(&self, diff: &str) -> Vec<PackageChange> {
        let mut removals: HashMap<String, Entry> = HashMap::new();
        let mut additions: HashMap<String, Entry> = HashMap::new();
        let mut order: Vec<String> = Vec::new();

        let mut record = |side: Side, name: String, version: String, section: DependencyType| {
            if !removals.contains_key(&name) && !additions.contains_key(&name) {
                order.push(name.clone());
            }
            let entry = Entry { version, section };
            match side {
                Side::Removed => removals.insert(name, entry),
                Side::Added => additions.insert(name, entry),
            };
        };

        let mut in_target = false;
        let mut in_hunk = false;
        let mut section: Option<DependencyType> = None;

        for line in diff.lines() {
            if let Some(header) = header_kind(line) {
                let references = self.references_manifest(line);
                match header {
                    Header::FileStart => {
                        if in_target && !references {
                            break;
                        }
                        in_target = references;
                    }
                    Header::Path => {
                        if references {
                            in_target = true;
                        } else if !line.contains("/dev/null") {
                            if in_target && in_hunk {
                                break;
                            }
                            in_target = false;
                        }
                    }
                }
                in_hunk = false;
                section = None;
                continue;
            }

            if !in_target {
                continue;
            }

            if line.starts_with("@@") {
                in_hunk = true;
                continue;
            }

            let (side, content) = match line.chars().next() {
                Some('-') => (Some(Side::Removed), &line[1..]),
                Some('+') => (Some(Side::Added), &line[1..]),
                Some(' ') => (None, &line[1..]),
                _ => continue,
            };
            let content = content.trim();

            if let Some(caps) = SECTION_OPEN_RE.captures(content) {
                let opened = DependencyType::from_key(&caps[1]);
                let rest = &content[caps.get(0).map_or(content.len(), |m| m.end())..];
                if !closes_on_line(rest) {
                    section = opened;
                    continue;
                }
                // one-line object: record its members without entering it
                section = None;
                if let (Some(side), Some(kind)) = (side, opened) {
                    for member in INLINE_PACKAGE_RE.captures_iter(rest) {
                        record(side, member[1].to_string(), member[2].to_string(), kind);
                    }
                }
                continue;
            }
            if content.starts_with('}') {
                section = None;
                continue;
            }

            let (Some(side), Some(current_section)) = (side, section) else {
                continue;
            };
            let Some(caps) = PACKAGE_RE.captures(content) else {
                continue;
            };

            record(side, caps[1].to_string(), caps[2].to_string(), current_section);
        }

        let mut changes = Vec::with_capacity(order.len());
        for name in order {
            match (removals.remove(&name), additions.remove(&name)) {
                (Some(old), Some(new)) => changes.push(PackageChange::version_change(
                    name,
                    old.version,
                    new.version,
                    new.section,
                )),
                (None, Some(new)) => {
                    if name == SCAFFOLD_ONLY_PACKAGE {
                        debug!("skipping scaffold-only addition {}", name);
                        continue;
                    }
                    changes.push(PackageChange::addition(name, new.version, new.section));
                }
                (Some(old), None) => {
                    changes.push(PackageChange::removal(name, old.version, old.section))
                }
                (None, None) => {}
            }
        }

        debug!(count = changes.len(), "parsed package changes from diff");
        changes
    }

    /// Returns true if a header line names the manifest file
    fn references_manifest(&self, line: &str) -> bool {
        let suffix = format!("/{}", self.manifest_filename);
        line.split_whitespace()
            .skip(1)
            .any(|token| token == self.manifest_filename || token.ends_with(&suffix))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Removed,
    Added,
}

fn header_kind(line: &str) -> Option<Header> {
    if line.starts_with("diff --git ") {
        return Some(Header::FileStart);
    }
    let path = line
        .strip_prefix("--- ")
        .or_else(|| line.strip_prefix("+++ "))?;
    if path.starts_with("a/") || path.starts_with("b/") || path.starts_with("/dev/null") {
        Some(Header::Path)
    } else {
        None
    }
}

/// Whether the object opened just before `rest` is closed again on the same line
fn closes_on_line(rest: &str) -> bool {
    let mut depth = 1usize;
    let mut in_string = false;
    let mut escaped = false;
    for c in rest.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}
