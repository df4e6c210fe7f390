//! # svgantt-core
//!
//! Core schedule model for the svgantt Gantt chart engine.
//!
//! This crate provides:
//! - Date arithmetic over naive local date-times (`date` module)
//! - Domain types: `Task` (raw input), `ResolvedTask` (layout-ready)
//! - The task resolver, which fills defaults and flags invalid records
//! - The dependency index used to cascade edits through dependent tasks
//! - Chart options, view modes and error types
//!
//! ## Example
//!
//! ```rust
//! use svgantt_core::{Task, TaskResolver};
//!
//! let tasks = vec![
//!     Task::new("design").name("Design").planned("2024-01-01", "2024-01-03"),
//!     Task::new("build")
//!         .name("Build")
//!         .planned("2024-01-04", "2024-01-10")
//!         .depends_on("design"),
//! ];
//!
//! let schedule = TaskResolver::new().resolve(&tasks);
//! assert_eq!(schedule.tasks.len(), 2);
//! assert_eq!(schedule.dependencies.descendants("design"), vec!["build".to_string()]);
//! ```

pub mod date;
pub mod deps;
pub mod diagnostics;
pub mod options;
pub mod resolve;
pub mod task;

pub use date::{DateInput, Language, TimeUnit};
pub use deps::DependencyIndex;
pub use diagnostics::{Diagnostic, DiagnosticCode, Severity};
pub use options::{ColumnDef, ColumnKind, GanttOptions, MountTarget, SelectOption, ViewMode};
pub use resolve::{ResolvedSchedule, TaskResolver};
pub use task::{DependencySpec, GridRow, ResolvedTask, Task, TaskStyle};

use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Unique identifier for a task
pub type TaskId = String;

// ============================================================================
// Errors
// ============================================================================

/// Configuration error: fatal to the call that triggered it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Unknown view mode: {0}")]
    UnknownViewMode(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Invalid mount target: {0:?}")]
    InvalidMountTarget(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

/// Popup usage error (caller-contract violation)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PopupError {
    #[error("Popup requires an anchor element, but task '{0}' has no rendered bar")]
    MissingAnchor(TaskId),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Popup(#[from] PopupError),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),
}
