//! Task resolution: raw records into a consistent, layout-ready schedule

use chrono::NaiveDateTime;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::date::{self, DateInput, TimeUnit};
use crate::deps::DependencyIndex;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::task::{ResolvedTask, Task};
use crate::TaskId;

/// Spans longer than this many years are treated as data errors
pub const MAX_SPAN_YEARS: i64 = 10;

const DEFAULT_SPAN_DAYS: i64 = 2;
const ID_SUFFIX_LEN: usize = 10;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Output of [`TaskResolver::resolve`]
#[derive(Clone, Debug, Default)]
pub struct ResolvedSchedule {
    pub tasks: Vec<ResolvedTask>,
    pub dependencies: DependencyIndex,
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolvedSchedule {
    pub fn get_task(&self, id: &str) -> Option<&ResolvedTask> {
        self.tasks.iter().find(|t| t.id == id)
    }
}

/// Fills defaults, flags invalid records and assigns render indices
#[derive(Clone, Debug, Default)]
pub struct TaskResolver {
    today: Option<NaiveDateTime>,
}

impl TaskResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin "today" instead of reading the local clock
    pub fn with_today(mut self, today: NaiveDateTime) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDateTime {
        self.today.unwrap_or_else(date::today)
    }

    /// Resolve tasks in the given order; index `i` is the task's position.
    pub fn resolve(&self, tasks: &[Task]) -> ResolvedSchedule {
        let mut diagnostics = Vec::new();
        let mut seen: HashSet<TaskId> = HashSet::new();

        let resolved: Vec<ResolvedTask> = tasks
            .iter()
            .enumerate()
            .map(|(index, task)| {
                let mut resolved = self.resolve_one(task, index, &mut diagnostics);
                resolved.id = unique_id(resolved.id, &mut seen, &mut diagnostics);
                resolved
            })
            .collect();

        for task in &resolved {
            for dep in &task.dependencies {
                if !seen.contains(dep) {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticCode::UnknownDependency,
                        task.id.clone(),
                        format!("depends on unknown task '{}'", dep),
                    ));
                }
            }
        }

        let dependencies = DependencyIndex::build(&resolved);
        debug!(
            tasks = resolved.len(),
            diagnostics = diagnostics.len(),
            "resolved schedule"
        );

        ResolvedSchedule {
            tasks: resolved,
            dependencies,
            diagnostics,
        }
    }

    fn resolve_one(
        &self,
        task: &Task,
        index: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> ResolvedTask {
        let (id, generated) = match task.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => (id.to_string(), false),
            _ => (generate_id(&task.name), true),
        };
        if generated {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::GeneratedTaskId,
                id.clone(),
                format!("task '{}' has no id; generated one", task.name),
            ));
        }

        let mut parse = |field: &str, input: Option<&DateInput>| -> Option<NaiveDateTime> {
            let input = input?;
            let parsed = input.resolve();
            if parsed.is_none() {
                diagnostics.push(Diagnostic::new(
                    DiagnosticCode::UnparsableDate,
                    id.clone(),
                    format!("{} {:?} is not a valid date", field, input),
                ));
            }
            parsed
        };
        let planned_start = parse("plannedStart", task.planned_start.as_ref());
        let planned_end = parse("plannedEnd", task.planned_end.as_ref());
        let actual_start = parse("actualStart", task.actual_start.as_ref());
        let actual_end = parse("actualEnd", task.actual_end.as_ref());

        let (start, end) = match (actual_start.or(planned_start), actual_end.or(planned_end)) {
            (Some(start), Some(end)) => (start, end),
            (None, Some(end)) => (date::add(end, -DEFAULT_SPAN_DAYS, TimeUnit::Day), end),
            (Some(start), None) => (start, date::add(start, DEFAULT_SPAN_DAYS, TimeUnit::Day)),
            (None, None) => {
                let today = self.today();
                (today, date::add(today, DEFAULT_SPAN_DAYS, TimeUnit::Day))
            }
        };
        let end = end_of_day(end);

        let has_planned = task.planned_start.is_some() || task.planned_end.is_some();
        let mut invalid = planned_start.is_none() || planned_end.is_none();
        if invalid {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::MissingPlannedDates,
                id.clone(),
                "planned start or end is missing",
            ));
        }

        let mut actual_end = Some(end);
        if date::diff(end, start, TimeUnit::Year) > MAX_SPAN_YEARS {
            warn!(task = %id, "span exceeds {} years; task will not be laid out", MAX_SPAN_YEARS);
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::SpanTooLarge,
                id.clone(),
                format!("span exceeds {} years", MAX_SPAN_YEARS),
            ));
            invalid = true;
            actual_end = None;
        } else if invalid {
            warn!(task = %id, "task is missing planned dates");
        }

        let progress = if task.progress.is_finite() {
            task.progress.clamp(0.0, 100.0)
        } else {
            0.0
        };

        ResolvedTask {
            id,
            name: task.name.clone(),
            index,
            actual_start: start,
            actual_end,
            planned_start: planned_start.unwrap_or(start),
            planned_end: planned_end.map(end_of_day).unwrap_or(end),
            has_planned,
            invalid,
            dependencies: task
                .dependencies
                .as_ref()
                .map(|d| d.normalize())
                .unwrap_or_default(),
            progress,
            style: task.style.clone(),
            fields: task.fields.clone(),
            grid_row: None,
        }
    }
}

/// A bare date as an end means "through the end of that day"
fn end_of_day(end: NaiveDateTime) -> NaiveDateTime {
    if date::is_midnight(end) {
        date::add(end, 24, TimeUnit::Hour)
    } else {
        end
    }
}

fn unique_id(id: TaskId, seen: &mut HashSet<TaskId>, diagnostics: &mut Vec<Diagnostic>) -> TaskId {
    if seen.insert(id.clone()) {
        return id;
    }

    let mut n = 2;
    let renamed = loop {
        let candidate = format!("{}_{}", id, n);
        if !seen.contains(&candidate) {
            break candidate;
        }
        n += 1;
    };
    warn!(task = %id, renamed = %renamed, "duplicate task id");
    diagnostics.push(Diagnostic::new(
        DiagnosticCode::DuplicateTaskId,
        renamed.clone(),
        format!("duplicate id '{}' renamed to '{}'", id, renamed),
    ));
    seen.insert(renamed.clone());
    renamed
}

/// `{name}_{random base-36 suffix}`; not stable across reloads
fn generate_id(name: &str) -> TaskId {
    let mut bytes = [0u8; ID_SUFFIX_LEN];
    if getrandom::getrandom(&mut bytes).is_err() {
        let nanos = date::now().and_utc().timestamp_nanos_opt().unwrap_or_default();
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = (nanos >> (i * 6)) as u8;
        }
    }
    let suffix: String = bytes
        .iter()
        .map(|b| BASE36[usize::from(*b) % BASE36.len()] as char)
        .collect();
    format!("{}_{}", name, suffix)
}
