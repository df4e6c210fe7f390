//! # svgantt-render
//!
//! Timeline layout, pointer interaction and SVG output for svgantt charts.
//!
//! This crate provides:
//! - The view-scale policy (column width, step, visible window, ticks)
//! - Grid, date-axis and column-region layout
//! - Bar and dependency-arrow geometry
//! - The drag / resize / progress interaction controller
//! - [`Gantt`], the orchestrator that owns all of the above
//! - [`SvgRenderer`], which serializes a chart to an SVG document
//!
//! ## Example
//!
//! ```rust
//! use svgantt_core::{GanttOptions, Task};
//! use svgantt_render::{Gantt, Renderer, SvgRenderer};
//!
//! let tasks = vec![
//!     Task::new("design").name("Design").planned("2024-01-01", "2024-01-03"),
//!     Task::new("build").name("Build").planned("2024-01-04", "2024-01-09").depends_on("design"),
//! ];
//! let mut gantt = Gantt::new("#chart", &tasks, GanttOptions::default()).unwrap();
//! gantt.change_view_mode("Week").unwrap();
//!
//! let svg = SvgRenderer::default().render(&gantt).unwrap();
//! assert!(svg.contains("bar-wrapper"));
//! ```

pub mod arrow;
pub mod axis;
pub mod bar;
pub mod columns;
pub mod events;
pub mod gantt;
pub mod geometry;
pub mod grid;
pub mod interaction;
pub mod popup;
pub mod scale;

pub use arrow::{Arrow, PathCommand};
pub use axis::DateLabel;
pub use bar::{Bar, BarTarget};
pub use columns::ColumnLayout;
pub use events::GanttEvent;
pub use gantt::{Gantt, Hover, SortKey};
pub use geometry::Rect;
pub use grid::GridLayout;
pub use interaction::{InteractionController, InteractionState, PointerTarget, SessionMode};
pub use popup::{PopupContent, PopupView};
pub use scale::{Scale, ViewState};

use svg::node::element::{Group, Line, Path, Polygon, Rectangle, Text};
use svg::Document;
use svgantt_core::RenderError;

use svgantt_core::ColumnKind;

use crate::columns::ColumnCell;
use crate::geometry::points_attr;

const CELL_INSET: f64 = 4.0;
const CELL_BASELINE: f64 = 15.0;

/// Output backend for a laid-out chart
pub trait Renderer {
    type Output;

    fn render(&self, gantt: &Gantt) -> Result<Self::Output, RenderError>;
}

/// SVG renderer configuration
#[derive(Clone, Debug)]
pub struct SvgRenderer {
    /// Draw the left-hand column table
    pub include_columns: bool,
    /// Draw the timeline grid, bars and arrows
    pub include_timeline: bool,
    pub background_color: String,
    pub row_color: String,
    pub row_line_color: String,
    pub tick_color: String,
    pub thick_tick_color: String,
    pub header_color: String,
    pub today_color: String,
    pub bar_color: String,
    pub planned_color: String,
    pub progress_color: String,
    pub invalid_color: String,
    pub handle_color: String,
    pub arrow_color: String,
    pub label_color: String,
    pub text_color: String,
    pub font_family: String,
    /// Font size in pixels
    pub font_size: u32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            include_columns: true,
            include_timeline: true,
            background_color: "#ffffff".into(),
            row_color: "#ffffff".into(),
            row_line_color: "#ebeff2".into(),
            tick_color: "#e0e0e0".into(),
            thick_tick_color: "#c0c0c0".into(),
            header_color: "#ffffff".into(),
            today_color: "#fcf8e3".into(),
            bar_color: "#b8c2cc".into(),
            planned_color: "#dfe4e8".into(),
            progress_color: "#a3a3ff".into(),
            invalid_color: "#f2dede".into(),
            handle_color: "#ddd".into(),
            arrow_color: "#666".into(),
            label_color: "#fff".into(),
            text_color: "#555".into(),
            font_family: "system-ui, -apple-system, sans-serif".into(),
            font_size: 12,
        }
    }
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render only the column table
    pub fn columns_only(mut self) -> Self {
        self.include_columns = true;
        self.include_timeline = false;
        self
    }

    /// Render only the timeline
    pub fn timeline_only(mut self) -> Self {
        self.include_columns = false;
        self.include_timeline = true;
        self
    }

    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    fn text(&self, content: &str, x: f64, y: f64) -> Text {
        Text::new(content)
            .set("x", x)
            .set("y", y)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size)
    }

    /// Background, rows, header band, ticks and today highlight
    fn render_grid(&self, gantt: &Gantt) -> Group {
        let grid = gantt.grid();
        let mut group = Group::new().set("class", "grid");

        group = group.add(
            Rectangle::new()
                .set("class", "grid-background")
                .set("x", 0)
                .set("y", 0)
                .set("width", grid.width)
                .set("height", grid.height)
                .set("fill", self.background_color.as_str()),
        );

        for row in &grid.rows {
            group = group.add(
                Rectangle::new()
                    .set("class", "grid-row")
                    .set("x", 0)
                    .set("y", row.y)
                    .set("width", row.width)
                    .set("height", row.height)
                    .set("fill", self.row_color.as_str()),
            );
            group = group.add(
                Line::new()
                    .set("class", "row-line")
                    .set("x1", 0)
                    .set("y1", row.y + row.height)
                    .set("x2", row.width)
                    .set("y2", row.y + row.height)
                    .set("stroke", self.row_line_color.as_str()),
            );
        }

        let header = grid.header;
        group = group.add(
            Rectangle::new()
                .set("class", "grid-header")
                .set("x", header.x)
                .set("y", header.y)
                .set("width", header.width)
                .set("height", header.height)
                .set("fill", self.header_color.as_str()),
        );

        for tick in &grid.ticks {
            let (class, color) = if tick.thick {
                ("tick thick", self.thick_tick_color.as_str())
            } else {
                ("tick", self.tick_color.as_str())
            };
            group = group.add(
                Path::new()
                    .set("class", class)
                    .set("d", tick.path())
                    .set("stroke", color),
            );
        }

        if let Some(today) = grid.today {
            group = group.add(
                Rectangle::new()
                    .set("class", "today-highlight")
                    .set("x", today.x)
                    .set("y", today.y)
                    .set("width", today.width)
                    .set("height", today.height)
                    .set("fill", self.today_color.as_str()),
            );
        }

        group
    }

    /// Lower and upper axis labels; upper labels past the grid are dropped
    fn render_dates(&self, gantt: &Gantt) -> Group {
        let width = gantt.grid().width;
        let mut group = Group::new().set("class", "date");

        for label in gantt.date_labels() {
            if !label.lower_text.is_empty() {
                group = group.add(
                    self.text(&label.lower_text, label.lower_x, label.lower_y)
                        .set("class", "lower-text")
                        .set("text-anchor", "middle")
                        .set("fill", self.text_color.as_str()),
                );
            }
            if !label.upper_text.is_empty() && label.upper_x <= width {
                group = group.add(
                    self.text(&label.upper_text, label.upper_x, label.upper_y)
                        .set("class", "upper-text")
                        .set("fill", self.text_color.as_str()),
                );
            }
        }

        group
    }

    fn render_arrows(&self, gantt: &Gantt) -> Group {
        gantt.arrows().iter().fold(Group::new().set("class", "arrow"), |group, arrow| {
            group.add(
                Path::new()
                    .set("d", arrow.d())
                    .set("data-from", arrow.from.as_str())
                    .set("data-to", arrow.to.as_str())
                    .set("fill", "none")
                    .set("stroke", self.arrow_color.as_str())
                    .set("stroke-width", 1.4),
            )
        })
    }

    fn render_bar(&self, bar: &Bar) -> Group {
        let style = &bar.style;
        let bar_fill = if bar.invalid {
            self.invalid_color.as_str()
        } else {
            style.color.as_deref().unwrap_or(&self.bar_color)
        };

        let mut bar_group = Group::new().set("class", "bar-group");
        if bar.has_planned {
            bar_group = bar_group.add(
                rounded(&bar.planned, bar.corner_radius)
                    .set("class", "bar-planned")
                    .set("fill", style.planned_color.as_deref().unwrap_or(&self.planned_color)),
            );
        }
        bar_group = bar_group
            .add(
                rounded(&bar.actual, bar.corner_radius)
                    .set("class", "bar")
                    .set("fill", bar_fill),
            )
            .add(
                rounded(&bar.progress_bar, bar.corner_radius)
                    .set("class", "bar-progress")
                    .set("fill", style.progress_color.as_deref().unwrap_or(&self.progress_color)),
            );

        let (label_class, label_fill) = if bar.label.big {
            ("bar-label big", self.text_color.as_str())
        } else {
            ("bar-label", style.label_color.as_deref().unwrap_or(&self.label_color))
        };
        let mut label = self
            .text(&bar.label.text, bar.label.x, bar.label.y)
            .set("class", label_class)
            .set("dominant-baseline", "central")
            .set("fill", label_fill);
        if !bar.label.big {
            label = label.set("text-anchor", "middle");
        }
        bar_group = bar_group.add(label);

        let mut handle_group = Group::new().set("class", "handle-group");
        let handle_sets = [(bar.handles, "handle"), (bar.planned_handles, "handle planned")];
        for (handles, class) in handle_sets {
            let Some(handles) = handles else { continue };
            for (rect, side) in [(handles.left, "left"), (handles.right, "right")] {
                handle_group = handle_group.add(
                    rounded(&rect, bar.corner_radius)
                        .set("class", format!("{} {}", class, side))
                        .set("fill", self.handle_color.as_str()),
                );
            }
        }
        if let Some(triangle) = bar.progress_handle {
            handle_group = handle_group.add(
                Polygon::new()
                    .set("class", "handle progress")
                    .set("points", points_attr(&triangle))
                    .set("fill", self.handle_color.as_str()),
            );
        }

        Group::new()
            .set("class", bar.wrapper_class())
            .set("data-id", bar.task_id.as_str())
            .add(bar_group)
            .add(handle_group)
    }

    fn render_columns(&self, gantt: &Gantt) -> Group {
        let layout = gantt.column_layout();
        let mut group = Group::new().set("class", "columns");

        for header in &layout.headers {
            group = group.add(
                self.text(&header.label, header.x, header.y)
                    .set("class", "column-header")
                    .set("data-key", header.key.as_str())
                    .set("text-anchor", "middle")
                    .set("font-weight", "bold")
                    .set("fill", self.text_color.as_str()),
            );
        }
        for cell in &layout.cells {
            let text = self
                .text(&cell.text, cell.x, cell.y)
                .set("class", "column-value")
                .set("data-id", cell.task_id.as_str())
                .set("data-key", cell.key.as_str())
                .set("text-anchor", "middle")
                .set("fill", self.text_color.as_str());
            if cell.kind.is_editable() {
                group = group.add(self.render_input_cell(gantt, cell, text));
            } else {
                group = group.add(text);
            }
        }

        group
    }

    /// Boxed cell the host turns into an editor (select, text or date input)
    fn render_input_cell(&self, gantt: &Gantt, cell: &ColumnCell, text: Text) -> Group {
        let options = gantt.options();
        let cw = options.column_width_for_columns;
        let frame = Rect::new(
            cell.x - cw / 2.0 + CELL_INSET,
            cell.y - CELL_BASELINE,
            cw - 2.0 * CELL_INSET,
            options.bar_height,
        );

        let mut group = Group::new()
            .set("class", format!("column-input {}", cell.kind.name()))
            .set("data-id", cell.task_id.as_str())
            .set("data-key", cell.key.as_str())
            .set("data-value", cell.value.as_str());

        if cell.kind == ColumnKind::Select {
            let choices = options
                .columns
                .iter()
                .find(|c| c.key == cell.key)
                .map(|c| {
                    c.options
                        .iter()
                        .map(|o| o.value.as_str())
                        .collect::<Vec<_>>()
                        .join(",")
                })
                .unwrap_or_default();
            group = group.set("data-options", choices);
        }

        group
            .add(
                rounded(&frame, 2.0)
                    .set("class", "column-input-frame")
                    .set("fill", self.background_color.as_str())
                    .set("stroke", self.tick_color.as_str()),
            )
            .add(text)
    }
}

fn rounded(rect: &Rect, radius: f64) -> Rectangle {
    Rectangle::new()
        .set("x", rect.x)
        .set("y", rect.y)
        .set("width", rect.width)
        .set("height", rect.height)
        .set("rx", radius)
        .set("ry", radius)
}

impl Renderer for SvgRenderer {
    type Output = String;

    fn render(&self, gantt: &Gantt) -> Result<String, RenderError> {
        if !self.include_columns && !self.include_timeline {
            return Err(RenderError::InvalidData("Nothing to render".into()));
        }

        let columns_width = if self.include_columns {
            gantt.column_layout().width
        } else {
            0.0
        };
        let timeline_width = if self.include_timeline {
            gantt.grid().width
        } else {
            0.0
        };
        let width = columns_width + timeline_width;
        let height = gantt.grid().height;

        let mut document = Document::new()
            .set("id", gantt.mount().id())
            .set("class", "gantt")
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0.0, 0.0, width, height))
            .set("xmlns", "http://www.w3.org/2000/svg");

        if self.include_columns && columns_width > 0.0 {
            document = document.add(self.render_columns(gantt));
        }

        if self.include_timeline {
            let bars = gantt
                .bars()
                .iter()
                .fold(Group::new().set("class", "bar"), |group, bar| {
                    group.add(self.render_bar(bar))
                });

            let timeline = Group::new()
                .set("class", "timeline")
                .set("transform", format!("translate({},0)", columns_width))
                .add(self.render_grid(gantt))
                .add(self.render_dates(gantt))
                .add(self.render_arrows(gantt))
                .add(bars);
            document = document.add(timeline);
        }

        let mut output = Vec::new();
        svg::write(&mut output, &document)
            .map_err(|e| RenderError::Format(format!("Failed to write SVG: {}", e)))?;

        String::from_utf8(output).map_err(|e| RenderError::Format(format!("Invalid UTF-8: {}", e)))
    }
}
