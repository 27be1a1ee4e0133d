//! Section classification of raw manifest lines
//!
//! Used to locate dependency declarations in the original text (for
//! annotations) without ever mistaking a same-named key in `scripts`,
//! `engines` or any other block for a dependency. Read-only: all mutation
//! goes through [`ManifestDocument`](super::ManifestDocument).

use crate::domain::{DependencyType, Section};

/// A dependency declaration found in the raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredLine {
    /// Package name
    pub name: String,
    /// 0-based line of the `"name": ...` key
    pub line: usize,
    /// Section declaring the package
    pub dependency_type: DependencyType,
}

/// Classify the section enclosing `lines[index]`.
///
/// The nesting is determined from the text preceding the line: the nearest
/// enclosing top-level key decides the section. Braces inside strings are
/// ignored, so values like `"npm run {x}"` cannot confuse the tracking.
/// Lines at the top level, nested deeper than a section member, or past the
/// end of `lines` classify as [`Section::Other`].
pub fn classify_section(lines: &[&str], index: usize) -> Section {
    if index >= lines.len() {
        return Section::Other;
    }

    let mut scanner = Scanner::default();
    for line in &lines[..index] {
        scanner.feed(line, |_, _, _| {});
        scanner.feed("\n", |_, _, _| {});
    }
    section_of(&scanner.stack)
}

/// Find every dependency declaration in the manifest text, in text order
pub fn locate_dependencies(text: &str) -> Vec<DeclaredLine> {
    let mut found = Vec::new();
    let mut scanner = Scanner::default();
    scanner.feed(text, |key, line, stack| {
        if let Section::Dependency(dependency_type) = section_of(stack) {
            found.push(DeclaredLine {
                name: key.to_string(),
                line,
                dependency_type,
            });
        }
    });
    found
}

/// Find the line declaring `name` inside a dependency section
pub fn find_package_line(text: &str, name: &str) -> Option<DeclaredLine> {
    locate_dependencies(text)
        .into_iter()
        .find(|declared| declared.name == name)
}

fn section_of(stack: &[Option<String>]) -> Section {
    // [root object, top-level section object]
    if stack.len() != 2 {
        return Section::Other;
    }
    stack[1]
        .as_deref()
        .and_then(DependencyType::from_key)
        .map(Section::Dependency)
        .unwrap_or(Section::Other)
}

/// Minimal JSON token walker tracking which key opened each nested container
#[derive(Default)]
struct Scanner {
    /// Key that opened each open container (`None` for the root and array items)
    stack: Vec<Option<String>>,
    in_string: bool,
    escaped: bool,
    buf: String,
    /// Last completed string, a key candidate until `:` or another token
    last_string: Option<String>,
    /// Key whose value is being parsed
    pending_key: Option<String>,
    line: usize,
}

impl Scanner {
    fn feed(&mut self, text: &str, mut on_key: impl FnMut(&str, usize, &[Option<String>])) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
            }

            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                    self.buf.push(c);
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == '"' {
                    self.in_string = false;
                    self.last_string = Some(std::mem::take(&mut self.buf));
                } else {
                    self.buf.push(c);
                }
                continue;
            }

            match c {
                '"' => {
                    self.in_string = true;
                    self.buf.clear();
                    self.last_string = None;
                }
                ':' => {
                    if let Some(key) = self.last_string.take() {
                        on_key(&key, self.line, &self.stack);
                        self.pending_key = Some(key);
                    }
                }
                '{' | '[' => {
                    self.stack.push(self.pending_key.take());
                    self.last_string = None;
                }
                '}' | ']' => {
                    self.stack.pop();
                    self.pending_key = None;
                    self.last_string = None;
                }
                ',' => {
                    self.pending_key = None;
                    self.last_string = None;
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
  "name": "app",
  "scripts": {
    "dependencies": "npm run dependencies",
    "react-native": "react-native start",
    "weird": "echo { not a brace"
  },
  "dependencies": {
    "react": "18.3.1",
    "react-native": "0.75.1"
  },
  "devDependencies": {
    "typescript": "5.0.4"
  },
  "engines": {
    "node": ">=18"
  }
}"#;

    fn lines() -> Vec<&'static str> {
        MANIFEST.lines().collect()
    }

    #[test]
    fn test_classify_dependency_members() {
        let lines = lines();
        assert_eq!(
            classify_section(&lines, 8),
            Section::Dependency(DependencyType::Dependencies)
        );
        assert_eq!(
            classify_section(&lines, 12),
            Section::Dependency(DependencyType::DevDependencies)
        );
    }

    #[test]
    fn test_classify_scripts_line_named_dependencies() {
        let lines = lines();
        assert!(lines[3].contains("\"dependencies\": \"npm run dependencies\""));
        assert_eq!(classify_section(&lines, 3), Section::Other);
        assert_eq!(classify_section(&lines, 4), Section::Other);
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let lines = lines();
        // the line after the unbalanced "{" in a script value
        assert_eq!(classify_section(&lines, 6), Section::Other);
        assert_eq!(
            classify_section(&lines, 9),
            Section::Dependency(DependencyType::Dependencies)
        );
    }

    #[test]
    fn test_classify_top_level_and_other_sections() {
        let lines = lines();
        assert_eq!(classify_section(&lines, 1), Section::Other);
        assert_eq!(classify_section(&lines, 7), Section::Other);
        assert_eq!(classify_section(&lines, 15), Section::Other);
        assert_eq!(classify_section(&lines, 100), Section::Other);
    }

    #[test]
    fn test_locate_dependencies() {
        let declared = locate_dependencies(MANIFEST);
        let names: Vec<_> = declared.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["react", "react-native", "typescript"]);
        assert_eq!(declared[1].line, 9);
        assert_eq!(declared[2].dependency_type, DependencyType::DevDependencies);
    }

    #[test]
    fn test_find_package_line_skips_scripts() {
        let declared = find_package_line(MANIFEST, "react-native").unwrap();
        assert_eq!(declared.line, 9);
        assert_eq!(declared.dependency_type, DependencyType::Dependencies);
        assert!(find_package_line(MANIFEST, "node").is_none());
    }

    #[test]
    fn test_locate_single_line_manifest() {
        let declared = locate_dependencies(r#"{"dependencies":{"a":"1.0.0"},"scripts":{"a":"x"}}"#);
        assert_eq!(declared.len(), 1);
        assert_eq!(declared[0].line, 0);
    }

    #[test]
    fn test_escaped_quotes_in_keys() {
        let text = "{\n  \"scripts\": {\n    \"say\": \"echo \\\"}\\\"\"\n  },\n  \"dependencies\": {\n    \"a\": \"1.0.0\"\n  }\n}";
        let declared = locate_dependencies(text);
        assert_eq!(declared.len(), 1);
        assert_eq!(declared[0].name, "a");
        assert_eq!(declared[0].line, 5);
    }
}
