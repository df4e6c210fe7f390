//! Data anomalies found while resolving tasks.
//!
//! None of these stop a render; they are collected on the schedule so hosts
//! (and the `check` command) can report them.

use serde::Serialize;
use std::fmt;

use crate::TaskId;

/// How serious a diagnostic is
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    MissingPlannedDates,
    SpanTooLarge,
    UnparsableDate,
    DuplicateTaskId,
    UnknownDependency,
    GeneratedTaskId,
}

impl DiagnosticCode {
    /// Stable short code
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticCode::MissingPlannedDates => "W001",
            DiagnosticCode::SpanTooLarge => "W002",
            DiagnosticCode::UnparsableDate => "W003",
            DiagnosticCode::DuplicateTaskId => "W004",
            DiagnosticCode::UnknownDependency => "W005",
            DiagnosticCode::GeneratedTaskId => "I001",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            DiagnosticCode::GeneratedTaskId => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub task_id: TaskId,
    pub message: String,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, task_id: impl Into<TaskId>, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            task_id: task_id.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] {}: {}",
            self.severity, self.code, self.task_id, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_task() {
        let d = Diagnostic::new(DiagnosticCode::SpanTooLarge, "t1", "span exceeds 10 years");
        assert_eq!(d.to_string(), "warning[W002] t1: span exceeds 10 years");
    }

    #[test]
    fn generated_id_is_informational() {
        let d = Diagnostic::new(DiagnosticCode::GeneratedTaskId, "x_abc", "generated");
        assert_eq!(d.severity, Severity::Info);
        assert!(Severity::Info < Severity::Warning);
    }
}
