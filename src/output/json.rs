//! JSON output formatter for machine processing

use crate::annotate::Annotation;
use crate::domain::RequirementResult;
use crate::output::{OutputFormatter, Verbosity};
use crate::reconcile::ApplyFailure;
use crate::workflow::{Analysis, ApplyRun, InfoRun};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    fn write_json<T: Serialize>(&self, value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

/// JSON representation of a check
#[derive(Serialize)]
struct JsonCheck<'a> {
    manifest: String,
    from: &'a str,
    to: &'a str,
    synthetic_baseline: bool,
    /// Upstream changes (verbose only)
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream_changes: Option<usize>,
    requirements: &'a [RequirementResult],
}

/// JSON representation of an apply run
#[derive(Serialize)]
struct JsonApply<'a> {
    manifest: String,
    dry_run: bool,
    file_modified: bool,
    selected: usize,
    applied: &'a [String],
    failed: &'a [ApplyFailure],
}

/// JSON representation of annotations
#[derive(Serialize)]
struct JsonInfo<'a> {
    manifest: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    packages: &'a [Annotation],
}

impl OutputFormatter for JsonFormatter {
    fn format_check(
        &self,
        analysis: &Analysis,
        results: &[RequirementResult],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write_json(
            &JsonCheck {
                manifest: analysis.manifest_path.display().to_string(),
                from: &analysis.pair.from,
                to: &analysis.pair.to,
                synthetic_baseline: analysis.pair.synthetic_baseline,
                upstream_changes: (self.verbosity == Verbosity::Verbose)
                    .then_some(analysis.changes.len()),
                requirements: results,
            },
            writer,
        )
    }

    fn format_apply(&self, run: &ApplyRun, writer: &mut dyn Write) -> std::io::Result<()> {
        self.write_json(
            &JsonApply {
                manifest: run.analysis.manifest_path.display().to_string(),
                dry_run: run.dry_run,
                file_modified: run.file_modified,
                selected: run.selected.len(),
                applied: &run.report.applied,
                failed: &run.report.failed,
            },
            writer,
        )
    }

    fn format_info(&self, run: &InfoRun, writer: &mut dyn Write) -> std::io::Result<()> {
        self.write_json(
            &JsonInfo {
                manifest: run.manifest_path.display().to_string(),
                error: run.error.as_deref(),
                packages: &run.annotations,
            },
            writer,
        )
    }
}
