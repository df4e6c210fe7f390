//! Diagnostic output for the `check` command
//!
//! Two formats are supported: one line per diagnostic on stderr (`text`), or
//! a JSON document on stdout (`json`). Both report the same exit code:
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | No warnings, or warnings without `--strict` |
//! | 1 | `--strict` and at least one warning |

use serde::Serialize;
use std::io::Write;
use svgantt_core::{Diagnostic, Severity};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    Failure = 1,
}

impl ExitCode {
    pub fn from_diagnostics(diagnostics: &[Diagnostic], strict: bool) -> Self {
        let warnings = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        if strict && warnings > 0 {
            ExitCode::Failure
        } else {
            ExitCode::Success
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    code: &'static str,
    severity: Severity,
    task: &'a str,
    message: &'a str,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    file: &'a str,
    tasks: usize,
    warnings: usize,
    diagnostics: Vec<JsonDiagnostic<'a>>,
}

/// Write diagnostics for `file` in the chosen format
pub fn emit(
    out: &mut impl Write,
    format: OutputFormat,
    file: &str,
    task_count: usize,
    diagnostics: &[Diagnostic],
) -> std::io::Result<()> {
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();

    match format {
        OutputFormat::Text => {
            for diagnostic in diagnostics {
                writeln!(out, "{}: {}", file, diagnostic)?;
            }
            writeln!(
                out,
                "{}: {} task(s), {} warning(s)",
                file, task_count, warnings
            )
        }
        OutputFormat::Json => {
            let report = JsonReport {
                file,
                tasks: task_count,
                warnings,
                diagnostics: diagnostics
                    .iter()
                    .map(|d| JsonDiagnostic {
                        code: d.code.code(),
                        severity: d.severity,
                        task: &d.task_id,
                        message: &d.message,
                    })
                    .collect(),
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use svgantt_core::DiagnosticCode;

    fn sample() -> Vec<Diagnostic> {
        vec![
            Diagnostic::new(DiagnosticCode::MissingPlannedDates, "a", "planned start or end is missing"),
            Diagnostic::new(DiagnosticCode::GeneratedTaskId, "x_1", "generated"),
        ]
    }

    #[test]
    fn strict_mode_fails_on_warnings() {
        assert_eq!(ExitCode::from_diagnostics(&sample(), false), ExitCode::Success);
        assert_eq!(ExitCode::from_diagnostics(&sample(), true), ExitCode::Failure);
        assert_eq!(ExitCode::from_diagnostics(&sample()[1..], true), ExitCode::Success);
    }

    #[test]
    fn text_output_lists_each_diagnostic() {
        let mut out = Vec::new();
        emit(&mut out, OutputFormat::Text, "tasks.json", 3, &sample()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "tasks.json: warning[W001] a: planned start or end is missing\n\
             tasks.json: info[I001] x_1: generated\n\
             tasks.json: 3 task(s), 1 warning(s)\n"
        );
    }

    #[test]
    fn json_output_uses_stable_codes() {
        let mut out = Vec::new();
        emit(&mut out, OutputFormat::Json, "tasks.json", 3, &sample()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["warnings"], 1);
        assert_eq!(value["diagnostics"][0]["code"], "W001");
        assert_eq!(value["diagnostics"][1]["severity"], "info");
    }
}
