use chrono::NaiveDateTime;
use serde::Serialize;
use svgantt_core::{TaskId, ViewMode};

/// Change notification produced by the chart
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum GanttEvent {
    ViewChange {
        mode: ViewMode,
    },
    /// `end` is reported one second before the exclusive end of the bar
    DateChange {
        #[serde(rename = "taskId")]
        task_id: TaskId,
        start: NaiveDateTime,
        end: NaiveDateTime,
        planned: bool,
    },
    ProgressChange {
        #[serde(rename = "taskId")]
        task_id: TaskId,
        progress: f64,
    },
    /// Pointer released on a bar without dragging it
    Click {
        #[serde(rename = "taskId")]
        task_id: TaskId,
    },
}

impl GanttEvent {
    pub fn task_id(&self) -> Option<&str> {
        match self {
            GanttEvent::ViewChange { .. } => None,
            GanttEvent::DateChange { task_id, .. }
            | GanttEvent::ProgressChange { task_id, .. }
            | GanttEvent::Click { task_id } => Some(task_id),
        }
    }
}
