//! Left-hand column region

use serde::Serialize;
use svgantt_core::date::{self, Language};
use svgantt_core::{ColumnDef, ColumnKind, GanttOptions, ResolvedTask};

const HEADER_LABEL_Y: f64 = 50.0;
const VALUE_BASELINE: f64 = 15.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnHeader {
    pub key: String,
    pub label: String,
    pub kind: ColumnKind,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnCell {
    pub task_id: String,
    pub key: String,
    pub kind: ColumnKind,
    /// Stored field value, handed back to the host's editor
    pub value: String,
    /// What the cell shows
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Positions of the column table, aligned with the timeline rows
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ColumnLayout {
    pub width: f64,
    pub headers: Vec<ColumnHeader>,
    pub cells: Vec<ColumnCell>,
}

impl ColumnLayout {
    pub fn compute(options: &GanttOptions, tasks: &[ResolvedTask], language: Language) -> Self {
        let cw = options.column_width_for_columns;
        let column_x = |i: usize| i as f64 * cw + cw / 2.0;

        let headers = options
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| ColumnHeader {
                key: column.key.clone(),
                label: column.label.clone(),
                kind: column.kind,
                x: column_x(i),
                y: HEADER_LABEL_Y,
            })
            .collect();

        let row_top = options.header_height + options.padding;
        let cells = tasks
            .iter()
            .flat_map(|task| {
                let y = VALUE_BASELINE + row_top + task.index as f64 * options.row_pitch();
                options
                    .columns
                    .iter()
                    .enumerate()
                    .map(move |(i, column)| {
                        let value = task.field(&column.key).unwrap_or_default();
                        ColumnCell {
                            task_id: task.id.clone(),
                            key: column.key.clone(),
                            kind: column.kind,
                            text: cell_text(column, &value, &options.date_format, language),
                            value,
                            x: column_x(i),
                            y,
                        }
                    })
            })
            .collect();

        Self {
            width: options.columns.len() as f64 * cw,
            headers,
            cells,
        }
    }
}

fn cell_text(column: &ColumnDef, value: &str, date_format: &str, language: Language) -> String {
    match column.kind {
        ColumnKind::Calendar => date::parse(value)
            .map_or_else(|| value.to_string(), |d| date::format_with(d, date_format, language)),
        _ => column.display_value(value),
    }
}
