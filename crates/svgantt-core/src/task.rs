//! Task records: raw input and the resolved, layout-ready form

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::date::{self, DateInput};
use crate::TaskId;

// ============================================================================
// Input
// ============================================================================

/// Declared dependencies: either `"a, b"` or `["a", "b"]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    List(Vec<TaskId>),
    Text(String),
}

impl DependencySpec {
    /// Split on commas, trim, drop empty entries. Lists are used as-is.
    pub fn normalize(&self) -> Vec<TaskId> {
        match self {
            Self::List(ids) => ids.clone(),
            Self::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

/// Optional fill and class overrides for a bar
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskStyle {
    pub custom_class: Option<String>,
    pub color: Option<String>,
    pub planned_color: Option<String>,
    pub progress_color: Option<String>,
    pub label_color: Option<String>,
}

/// A raw schedule item as supplied by the host
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Task {
    /// Identifier; generated from the name when absent
    pub id: Option<TaskId>,
    pub name: String,
    pub planned_start: Option<DateInput>,
    pub planned_end: Option<DateInput>,
    pub actual_start: Option<DateInput>,
    pub actual_end: Option<DateInput>,
    /// Completion percentage, 0-100
    pub progress: f64,
    pub dependencies: Option<DependencySpec>,
    #[serde(flatten)]
    pub style: TaskStyle,
    /// Any other keys on the record, available to the column region
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl Task {
    /// Create a new task with the given ID
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id: Some(id),
            ..Self::default()
        }
    }

    /// Create a task without an identifier; one is generated on resolution
    pub fn unnamed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the task name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the planned range
    pub fn planned(mut self, start: impl Into<DateInput>, end: impl Into<DateInput>) -> Self {
        self.planned_start = Some(start.into());
        self.planned_end = Some(end.into());
        self
    }

    pub fn planned_start(mut self, start: impl Into<DateInput>) -> Self {
        self.planned_start = Some(start.into());
        self
    }

    pub fn planned_end(mut self, end: impl Into<DateInput>) -> Self {
        self.planned_end = Some(end.into());
        self
    }

    /// Set the actual range
    pub fn actual(mut self, start: impl Into<DateInput>, end: impl Into<DateInput>) -> Self {
        self.actual_start = Some(start.into());
        self.actual_end = Some(end.into());
        self
    }

    pub fn progress(mut self, progress: f64) -> Self {
        self.progress = progress;
        self
    }

    /// Add a dependency
    pub fn depends_on(mut self, dependency: impl Into<String>) -> Self {
        let dependency = dependency.into();
        let mut ids = self
            .dependencies
            .as_ref()
            .map(DependencySpec::normalize)
            .unwrap_or_default();
        ids.push(dependency);
        self.dependencies = Some(DependencySpec::List(ids));
        self
    }

    /// Set dependencies from a comma-separated list
    pub fn dependencies_text(mut self, text: impl Into<String>) -> Self {
        self.dependencies = Some(DependencySpec::Text(text.into()));
        self
    }

    pub fn custom_class(mut self, class: impl Into<String>) -> Self {
        self.style.custom_class = Some(class.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.style.color = Some(color.into());
        self
    }

    /// Attach an extra field shown in the column region
    pub fn field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// Resolved
// ============================================================================

/// Rectangle of the task's row in the grid, recorded during render
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridRow {
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl GridRow {
    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.y && y < self.y + self.height
    }
}

/// A task after defaults, validity and index have been assigned
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTask {
    pub id: TaskId,
    pub name: String,
    /// Row position for the current render generation
    pub index: usize,
    pub actual_start: NaiveDateTime,
    /// `None` when the span failed the sanity check; such tasks are not laid out
    pub actual_end: Option<NaiveDateTime>,
    pub planned_start: NaiveDateTime,
    pub planned_end: NaiveDateTime,
    pub has_planned: bool,
    pub invalid: bool,
    pub dependencies: Vec<TaskId>,
    pub progress: f64,
    pub style: TaskStyle,
    pub fields: BTreeMap<String, serde_json::Value>,
    pub grid_row: Option<GridRow>,
}

impl ResolvedTask {
    /// True when the task can be placed on the timeline
    pub fn is_laid_out(&self) -> bool {
        self.actual_end.is_some()
    }

    /// String value of a named field for the column region.
    ///
    /// Built-in keys resolve to the task's own data; other keys look in the
    /// extra fields carried over from the input record.
    pub fn field(&self, key: &str) -> Option<String> {
        match key {
            "id" => Some(self.id.clone()),
            "name" => Some(self.name.clone()),
            "progress" => Some(format!("{}", self.progress)),
            "actualStart" | "start" => Some(date::to_string(self.actual_start, false)),
            "actualEnd" | "end" => self.actual_end.map(|d| date::to_string(d, false)),
            "plannedStart" => Some(date::to_string(self.planned_start, false)),
            "plannedEnd" => Some(date::to_string(self.planned_end, false)),
            "dependencies" => Some(self.dependencies.join(", ")),
            _ => self.fields.get(key).and_then(|value| match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dependency_text_is_split_and_trimmed() {
        let spec = DependencySpec::Text(" a, b ,, c ".into());
        assert_eq!(spec.normalize(), vec!["a", "b", "c"]);
    }

    #[test]
    fn dependency_list_used_as_is() {
        let spec = DependencySpec::List(vec!["x".into(), " y".into()]);
        assert_eq!(spec.normalize(), vec!["x", " y"]);
    }

    #[test]
    fn builder_accumulates_dependencies() {
        let task = Task::new("c").depends_on("a").depends_on("b");
        assert_eq!(
            task.dependencies,
            Some(DependencySpec::List(vec!["a".into(), "b".into()]))
        );
        assert_eq!(task.name, "c");
    }

    #[test]
    fn deserialize_camel_case_record_with_extra_fields() {
        let json = r#"{
            "id": "t1",
            "name": "Design",
            "plannedStart": "2024-01-01",
            "plannedEnd": "2024-01-05",
            "progress": 40,
            "dependencies": "t0, t2",
            "customClass": "hot",
            "owner": "kim"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();

        assert_eq!(task.id.as_deref(), Some("t1"));
        assert_eq!(task.planned_start, Some(DateInput::Text("2024-01-01".into())));
        assert_eq!(task.actual_start, None);
        assert_eq!(task.progress, 40.0);
        assert_eq!(task.style.custom_class.as_deref(), Some("hot"));
        assert_eq!(task.fields.get("owner"), Some(&serde_json::json!("kim")));
        assert_eq!(
            task.dependencies.map(|d| d.normalize()),
            Some(vec!["t0".to_string(), "t2".to_string()])
        );
    }

    #[test]
    fn grid_row_contains() {
        let row = GridRow { y: 68.0, width: 500.0, height: 58.0 };
        assert!(row.contains_y(68.0));
        assert!(row.contains_y(125.9));
        assert!(!row.contains_y(126.0));
    }
}
