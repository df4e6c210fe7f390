//! Bar geometry: actual and planned bars, progress, label and handles

use serde::Serialize;
use svgantt_core::{GanttOptions, ResolvedTask, TaskId, TaskStyle};

use crate::geometry::Rect;
use crate::scale::ViewState;

/// Estimated glyph width used to decide whether a label fits in its bar
pub const LABEL_CHAR_WIDTH: f64 = 7.0;
pub const HANDLE_WIDTH: f64 = 8.0;

/// Which of a task's two bars an interaction targets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BarTarget {
    Actual,
    Planned,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BarLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
    /// Label is wider than the bar and sits to its right
    pub big: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ResizeHandles {
    pub left: Rect,
    pub right: Rect,
}

impl ResizeHandles {
    fn around(bar: &Rect) -> Self {
        Self {
            left: Rect::new(bar.x + 1.0, bar.y + 1.0, HANDLE_WIDTH, bar.height - 2.0),
            right: Rect::new(bar.end_x() - 9.0, bar.y + 1.0, HANDLE_WIDTH, bar.height - 2.0),
        }
    }
}

/// Rendered geometry for one task
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bar {
    pub task_id: TaskId,
    pub index: usize,
    pub invalid: bool,
    pub has_planned: bool,
    /// Percentage the progress overlay was laid out from
    pub progress: f64,
    pub actual: Rect,
    pub planned: Rect,
    pub progress_bar: Rect,
    pub corner_radius: f64,
    pub label: BarLabel,
    pub handles: Option<ResizeHandles>,
    pub planned_handles: Option<ResizeHandles>,
    /// Triangle at the end of the progress overlay
    pub progress_handle: Option<[(f64, f64); 3]>,
    pub style: TaskStyle,
}

impl Bar {
    /// Lay out a task; `None` when the task has no usable end date
    pub fn layout(task: &ResolvedTask, view: &ViewState, options: &GanttOptions) -> Option<Self> {
        let actual_end = task.actual_end?;
        let height = options.bar_height;
        let row_y = options.header_height + options.padding + task.index as f64 * options.row_pitch();

        let planned = Rect::new(
            view.x_for(task.planned_start),
            row_y,
            view.span_width(task.planned_start, task.planned_end),
            height,
        );
        let actual = Rect::new(
            view.x_for(task.actual_start),
            row_y + height,
            view.span_width(task.actual_start, actual_end),
            height,
        );

        let mut bar = Self {
            task_id: task.id.clone(),
            index: task.index,
            invalid: task.invalid,
            has_planned: task.has_planned,
            progress: task.progress,
            actual,
            planned,
            progress_bar: actual,
            corner_radius: options.bar_corner_radius,
            label: BarLabel {
                text: task.name.clone(),
                x: 0.0,
                y: actual.center_y(),
                big: false,
            },
            handles: None,
            planned_handles: None,
            progress_handle: None,
            style: task.style.clone(),
        };
        bar.refresh();
        Some(bar)
    }

    pub fn rect(&self, target: BarTarget) -> &Rect {
        match target {
            BarTarget::Actual => &self.actual,
            BarTarget::Planned => &self.planned,
        }
    }

    pub fn rect_mut(&mut self, target: BarTarget) -> &mut Rect {
        match target {
            BarTarget::Actual => &mut self.actual,
            BarTarget::Planned => &mut self.planned,
        }
    }

    /// Move a bar's left edge
    pub fn set_x(&mut self, target: BarTarget, x: f64) {
        self.rect_mut(target).x = x;
        self.refresh();
    }

    /// Change a bar's width
    pub fn set_width(&mut self, target: BarTarget, width: f64) {
        self.rect_mut(target).width = width;
        self.refresh();
    }

    /// Change the progress overlay width directly (progress drag)
    pub fn set_progress_width(&mut self, width: f64) {
        self.progress_bar.width = width.clamp(0.0, self.actual.width);
        self.place_progress_handle();
    }

    /// Progress percentage shown by the overlay, truncated to an integer
    pub fn progress_percent(&self) -> f64 {
        if self.actual.width <= 0.0 {
            return self.progress;
        }
        (self.progress_bar.width / self.actual.width * 100.0).trunc()
    }

    /// Recompute everything derived from the two bar rectangles
    fn refresh(&mut self) {
        self.progress_bar = Rect {
            width: self.actual.width * (self.progress / 100.0),
            ..self.actual
        };

        let label_width = self.label.text.chars().count() as f64 * LABEL_CHAR_WIDTH;
        self.label.big = label_width > self.actual.width;
        self.label.x = if self.label.big {
            self.actual.end_x() + 5.0
        } else {
            self.actual.center_x()
        };
        self.label.y = self.actual.center_y();

        if self.invalid {
            self.handles = None;
            self.planned_handles = None;
            self.progress_handle = None;
            return;
        }

        self.handles = Some(ResizeHandles::around(&self.actual));
        self.planned_handles = self
            .has_planned
            .then(|| ResizeHandles::around(&self.planned));
        self.place_progress_handle();
    }

    fn place_progress_handle(&mut self) {
        if self.invalid || self.progress <= 0.0 || self.progress >= 100.0 {
            self.progress_handle = None;
            return;
        }
        let end = self.progress_bar.end_x();
        let bottom = self.actual.bottom();
        self.progress_handle = Some([(end - 5.0, bottom), (end + 5.0, bottom), (end, bottom - 8.66)]);
    }

    /// Bounding box of the progress handle triangle
    pub fn progress_handle_rect(&self) -> Option<Rect> {
        self.progress_handle.map(|[(x0, y0), (x1, _), (_, y2)]| Rect::new(x0, y2, x1 - x0, y0 - y2))
    }

    /// CSS classes of the wrapper group
    pub fn wrapper_class(&self) -> String {
        let mut class = String::from("bar-wrapper");
        if let Some(custom) = &self.style.custom_class {
            class.push(' ');
            class.push_str(custom);
        }
        if self.invalid {
            class.push_str(" bar-invalid");
        }
        class
    }
}
