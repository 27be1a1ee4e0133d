//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Requirement lists grouped by dependency section
//! - Semantic version change type indication (major/minor/patch)
//! - Apply summaries with per-package failures
//! - Dependency annotations with architecture and maintenance status

use crate::domain::{ArchStatus, ChangeType, DependencyType, RequirementResult};
use crate::output::{OutputFormatter, Verbosity};
use crate::version::BumpKind;
use crate::workflow::{Analysis, ApplyRun, InfoRun};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self::with_color(verbosity, true)
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn paint(&self, text: &str, style: fn(&str) -> colored::ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn bump_label(&self, old: &str, new: &str) -> String {
        let kind = BumpKind::between(old, new);
        let label = kind.label();
        if label.is_empty() {
            return String::new();
        }
        let painted = match kind {
            BumpKind::Major => self.paint(label, |s| s.red().bold()),
            BumpKind::Minor => self.paint(label, |s| s.yellow()),
            _ => self.paint(label, |s| s.green()),
        };
        format!(" [{}]", painted)
    }

    /// Format a single requirement line
    fn format_result_line(
        &self,
        result: &RequirementResult,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let name = format!("{:width$}", result.package_name, width = width);
        match result.change_type {
            ChangeType::VersionChange => writeln!(
                writer,
                "  {} {} {} {} {}{}",
                self.paint("~", |s| s.yellow()),
                name,
                self.paint(&result.current_version, |s| s.dimmed()),
                self.paint("→", |s| s.dimmed()),
                self.paint(&result.required_version, |s| s.bright_white().bold()),
                self.bump_label(&result.current_version, &result.required_version),
            ),
            ChangeType::Addition => writeln!(
                writer,
                "  {} {} {}",
                self.paint("+", |s| s.green()),
                name,
                self.paint(&result.required_version, |s| s.bright_white().bold()),
            ),
            ChangeType::Removal => writeln!(
                writer,
                "  {} {} {}",
                self.paint("-", |s| s.red()),
                name,
                self.paint(&result.current_version, |s| s.dimmed()),
            ),
        }
    }

    /// Write results grouped under section headers
    fn format_grouped(
        &self,
        results: &[RequirementResult],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let width = results
            .iter()
            .map(|r| r.package_name.len())
            .max()
            .unwrap_or(0);

        for kind in DependencyType::ALL {
            let group: Vec<_> = results.iter().filter(|r| r.dependency_type == kind).collect();
            if group.is_empty() {
                continue;
            }
            writeln!(writer, "{}:", self.paint(kind.key(), |s| s.bold()))?;
            for result in group {
                self.format_result_line(result, width, writer)?;
            }
        }
        Ok(())
    }

    fn status_label(&self, status: ArchStatus) -> String {
        match status {
            ArchStatus::Supported => self.paint(status.label(), |s| s.green()),
            ArchStatus::Unsupported => self.paint(status.label(), |s| s.red().bold()),
            ArchStatus::Untested => self.paint(status.label(), |s| s.yellow()),
            ArchStatus::Unlisted => self.paint(status.label(), |s| s.dimmed()),
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format_check(
        &self,
        analysis: &Analysis,
        results: &[RequirementResult],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let summary = if results.is_empty() {
            format!("No changes required for {}", analysis.pair.to)
        } else {
            format!(
                "{} change{} required for {}",
                results.len(),
                if results.len() == 1 { "" } else { "s" },
                analysis.pair.to
            )
        };

        if self.verbosity == Verbosity::Quiet {
            return writeln!(writer, "{}", summary);
        }

        let mut header = format!("Upgrade {} → {}", analysis.pair.from, analysis.pair.to);
        if analysis.pair.synthetic_baseline {
            header.push_str(&format!(" (already on {}, compared from baseline)", analysis.current_version));
        }
        writeln!(writer, "{}", self.paint(&header, |s| s.bold()))?;
        if self.verbosity == Verbosity::Verbose {
            writeln!(writer, "Manifest: {}", analysis.manifest_path.display())?;
            writeln!(writer, "Upstream changes: {}", analysis.changes.len())?;
        }
        writeln!(writer)?;

        self.format_grouped(results, writer)?;
        if !results.is_empty() {
            writeln!(writer)?;
        }
        writeln!(writer, "{}", summary)
    }

    fn format_apply(&self, run: &ApplyRun, writer: &mut dyn Write) -> std::io::Result<()> {
        let prefix = if run.dry_run {
            format!("{} ", self.paint("(dry-run)", |s| s.cyan()))
        } else {
            String::new()
        };

        if run.selected.is_empty() {
            return writeln!(writer, "{}No changes to apply for {}", prefix, run.analysis.pair.to);
        }

        let verb = if run.dry_run { "Would apply" } else { "Applied" };
        writeln!(
            writer,
            "{}{} {} of {} change{} to {}",
            prefix,
            verb,
            run.report.applied_count(),
            run.selected.len(),
            if run.selected.len() == 1 { "" } else { "s" },
            run.analysis.manifest_path.display()
        )?;

        if self.verbosity != Verbosity::Quiet {
            let applied: Vec<RequirementResult> = run
                .selected
                .iter()
                .filter(|r| run.report.applied.contains(&r.package_name))
                .cloned()
                .collect();
            self.format_grouped(&applied, writer)?;
        }

        if !run.report.failed.is_empty() {
            writeln!(writer, "{}", self.paint("Not applied:", |s| s.red().bold()))?;
            for failure in &run.report.failed {
                writeln!(
                    writer,
                    "  {} ({}): {}",
                    failure.package_name, failure.change_type, failure.reason
                )?;
            }
        }
        Ok(())
    }

    fn format_info(&self, run: &InfoRun, writer: &mut dyn Write) -> std::io::Result<()> {
        if let Some(error) = &run.error {
            writeln!(
                writer,
                "{} {}",
                self.paint("warning:", |s| s.yellow().bold()),
                error
            )?;
        }
        if run.annotations.is_empty() {
            return writeln!(writer, "No dependencies declared in {}", run.manifest_path.display());
        }

        let width = run
            .annotations
            .iter()
            .map(|a| a.package_name.len())
            .max()
            .unwrap_or(0);

        for annotation in &run.annotations {
            if self.verbosity == Verbosity::Quiet && !annotation.needs_attention() {
                continue;
            }

            let mut line = format!(
                "  {:width$} {} [{}]",
                annotation.package_name,
                annotation.current_version,
                self.status_label(annotation.status()),
                width = width
            );
            if annotation.info.unmaintained {
                line.push_str(&format!(" {}", self.paint("unmaintained", |s| s.red())));
            }
            if annotation.has_update {
                if let Some(latest) = &annotation.info.latest_release {
                    line.push_str(&format!(
                        " {} {}",
                        self.paint("update available:", |s| s.cyan()),
                        latest
                    ));
                }
            }
            if self.verbosity == Verbosity::Verbose {
                if let Some(number) = annotation.line {
                    line.push_str(&format!(" (line {})", number + 1));
                }
                let platforms = annotation.info.platforms.names();
                if !platforms.is_empty() {
                    line.push_str(&format!(" {}", platforms.join(",")));
                }
            }
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }
}
