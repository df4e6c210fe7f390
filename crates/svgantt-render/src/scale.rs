//! View-scale policy: column sizes, the visible window and axis ticks

use chrono::NaiveDateTime;
use serde::Serialize;
use svgantt_core::date::{self, TimeUnit};
use svgantt_core::{ResolvedTask, ViewMode};

/// Pixel width and hours per column for a view mode
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Scale {
    pub step: f64,
    pub column_width: f64,
}

impl Scale {
    pub fn for_mode(mode: ViewMode) -> Self {
        let (step, column_width) = match mode {
            ViewMode::QuarterDay => (6.0, 38.0),
            ViewMode::HalfDay => (12.0, 38.0),
            ViewMode::Day => (24.0, 38.0),
            ViewMode::Week => (168.0, 140.0),
            ViewMode::Month => (720.0, 120.0),
            ViewMode::Year => (8760.0, 120.0),
        };
        Self { step, column_width }
    }
}

/// Everything derived from the active view mode and task set.
///
/// Built in one step so the column width, step, window and ticks are
/// always from the same computation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViewState {
    pub mode: ViewMode,
    pub column_width: f64,
    pub step: f64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub ticks: Vec<NaiveDateTime>,
}

impl ViewState {
    /// `today` anchors the window when no task can be laid out
    pub fn compute(mode: ViewMode, tasks: &[ResolvedTask], today: NaiveDateTime) -> Self {
        let scale = Scale::for_mode(mode);
        let (start, end) = window(mode, tasks, today);
        let ticks = ticks(mode, start, end);
        Self {
            mode,
            column_width: scale.column_width,
            step: scale.step,
            start,
            end,
            ticks,
        }
    }

    /// Total width of the timeline grid
    pub fn grid_width(&self) -> f64 {
        self.ticks.len() as f64 * self.column_width
    }

    /// Horizontal offset of a date from the window start.
    ///
    /// Month uses whole days over a 30-day column; other scales use whole
    /// hours over the step.
    pub fn x_for(&self, date: NaiveDateTime) -> f64 {
        match self.mode {
            ViewMode::Month => {
                date::diff(date, self.start, TimeUnit::Day) as f64 * self.column_width / 30.0
            }
            _ => {
                date::diff(date, self.start, TimeUnit::Hour) as f64 / self.step * self.column_width
            }
        }
    }

    /// Pixel width of a date span
    pub fn span_width(&self, start: NaiveDateTime, end: NaiveDateTime) -> f64 {
        match self.mode {
            ViewMode::Month => {
                date::diff(end, start, TimeUnit::Day) as f64 * self.column_width / 30.0
            }
            _ => date::diff(end, start, TimeUnit::Hour) as f64 / self.step * self.column_width,
        }
    }

    /// Start date for a bar at `x`, rounded to whole columns
    pub fn date_at(&self, x: f64) -> NaiveDateTime {
        let columns = (x / self.column_width).round() as i64;
        date::add(self.start, columns * self.step as i64, TimeUnit::Hour)
    }

    /// End date for a bar of `width` pixels starting at `start`
    pub fn end_for(&self, start: NaiveDateTime, width: f64) -> NaiveDateTime {
        let hours = width / self.column_width * self.step;
        let ms = (hours * 3_600_000.0).round() as i64;
        date::add(start, ms, TimeUnit::Millisecond)
    }

    /// Smallest meaningful drag distance for the scale
    pub fn snap_unit(&self) -> f64 {
        match self.mode {
            ViewMode::Week => self.column_width / 7.0,
            ViewMode::Month => self.column_width / 30.0,
            _ => self.column_width,
        }
    }

    /// Round a raw pixel delta to the scale's snap unit.
    ///
    /// The remainder keeps the sign of `dx`, so negative deltas always round
    /// toward zero unless they pass the half-unit mark.
    pub fn snap(&self, dx: f64) -> f64 {
        let unit = self.snap_unit();
        let rem = dx % unit;
        dx - rem + if rem < unit / 2.0 { 0.0 } else { unit }
    }
}

/// Padded visible window for the task set.
///
/// A planned start only replaces the running start when it is *later*; this
/// asymmetry is kept deliberately. Tasks without an end are skipped.
pub fn window(
    mode: ViewMode,
    tasks: &[ResolvedTask],
    today: NaiveDateTime,
) -> (NaiveDateTime, NaiveDateTime) {
    let mut start: Option<NaiveDateTime> = None;
    let mut end: Option<NaiveDateTime> = None;

    for task in tasks {
        let Some(actual_end) = task.actual_end else {
            continue;
        };

        if start.map_or(true, |s| task.actual_start < s) {
            start = Some(task.actual_start);
        }
        if task.has_planned && start.map_or(true, |s| task.planned_start > s) {
            start = Some(task.planned_start);
        }
        if end.map_or(true, |e| actual_end > e) {
            end = Some(actual_end);
        }
        if task.has_planned && end.map_or(true, |e| task.planned_end > e) {
            end = Some(task.planned_end);
        }
    }

    let start = date::start_of(start.unwrap_or(today), TimeUnit::Day);
    let end = date::start_of(end.unwrap_or(today), TimeUnit::Day);

    match mode {
        ViewMode::QuarterDay | ViewMode::HalfDay => (
            date::add(start, -7, TimeUnit::Day),
            date::add(end, 7, TimeUnit::Day),
        ),
        ViewMode::Month => (
            date::start_of(start, TimeUnit::Year),
            date::add(end, 1, TimeUnit::Year),
        ),
        ViewMode::Year => (
            date::add(start, -2, TimeUnit::Year),
            date::add(end, 2, TimeUnit::Year),
        ),
        ViewMode::Day | ViewMode::Week => (
            date::add(start, -1, TimeUnit::Month),
            date::add(end, 1, TimeUnit::Month),
        ),
    }
}

/// Tick dates from `start`, stepping until one reaches `end`.
///
/// The start is always emitted and the last tick is the first one at or
/// past `end`.
pub fn ticks(mode: ViewMode, start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDateTime> {
    let step_hours = Scale::for_mode(mode).step as i64;
    let mut current = start;
    let mut out = vec![current];

    while current < end {
        current = match mode {
            ViewMode::Year => date::add(current, 1, TimeUnit::Year),
            ViewMode::Month => date::add(current, 1, TimeUnit::Month),
            _ => date::add(current, step_hours, TimeUnit::Hour),
        };
        out.push(current);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use svgantt_core::date::parse;
    use svgantt_core::{Task, TaskResolver};

    fn d(s: &str) -> NaiveDateTime {
        parse(s).unwrap()
    }

    fn resolve(tasks: &[Task]) -> Vec<ResolvedTask> {
        TaskResolver::new()
            .with_today(d("2024-06-01"))
            .resolve(tasks)
            .tasks
    }

    #[test]
    fn scale_table() {
        assert_eq!(Scale::for_mode(ViewMode::Day).column_width, 38.0);
        assert_eq!(Scale::for_mode(ViewMode::Week).step, 168.0);
        assert_eq!(Scale::for_mode(ViewMode::Year).step, 8760.0);
    }

    #[test]
    fn day_window_is_padded_by_a_month() {
        let tasks = resolve(&[Task::new("a").planned("2024-03-10", "2024-03-12")]);
        let (start, end) = window(ViewMode::Day, &tasks, d("2000-01-01"));
        assert_eq!(start, d("2024-02-10"));
        assert_eq!(end, d("2024-04-13"));
    }

    #[test]
    fn quarter_day_window_is_padded_by_a_week() {
        let tasks = resolve(&[Task::new("a").planned("2024-03-10", "2024-03-12 15:00")]);
        let (start, end) = window(ViewMode::QuarterDay, &tasks, d("2000-01-01"));
        assert_eq!(start, d("2024-03-03"));
        assert_eq!(end, d("2024-03-19"));
    }

    #[test]
    fn later_planned_start_replaces_window_start() {
        let tasks = resolve(&[Task::new("a")
            .planned("2024-03-20", "2024-03-25")
            .actual("2024-03-10", "2024-03-25")]);
        let (start, _) = window(ViewMode::Week, &tasks, d("2000-01-01"));
        assert_eq!(start, d("2024-02-20"));
    }

    #[test]
    fn empty_task_list_anchors_on_today() {
        let (start, end) = window(ViewMode::Year, &[], d("2024-06-01 13:00"));
        assert_eq!(start, d("2022-06-01"));
        assert_eq!(end, d("2026-06-01"));
    }

    #[test]
    fn month_view_of_a_calendar_year() {
        let tasks = resolve(&[Task::new("a").planned("2024-01-01", "2024-12-31")]);
        let view = ViewState::compute(ViewMode::Month, &tasks, d("2000-01-01"));
        assert_eq!(view.start, d("2024-01-01"));
        // end pushed to 2025-01-01, then padded by a year
        assert_eq!(view.end, d("2026-01-01"));
        assert_eq!(view.ticks.len(), 25);
        assert_eq!(view.ticks[12], d("2025-01-01"));
        assert_eq!(view.ticks.last().copied(), Some(view.end));
    }

    #[test]
    fn tick_loop_always_emits_start() {
        let t = d("2024-01-01");
        assert_eq!(ticks(ViewMode::Day, t, t), vec![t]);
        assert_eq!(ticks(ViewMode::Day, t, d("2024-01-02 01:00")).len(), 3);
    }

    #[test]
    fn month_x_uses_days_over_thirty() {
        let tasks = resolve(&[Task::new("a").planned("2024-01-01", "2024-01-30")]);
        let view = ViewState::compute(ViewMode::Month, &tasks, d("2000-01-01"));
        assert_eq!(view.x_for(d("2024-01-16")), 15.0 * 120.0 / 30.0);
        assert_eq!(view.span_width(d("2024-01-01"), d("2024-01-31")), 120.0);
    }

    #[test]
    fn snapping_per_scale() {
        let tasks = resolve(&[Task::new("a").planned("2024-01-01", "2024-01-03")]);
        let day = ViewState::compute(ViewMode::Day, &tasks, d("2000-01-01"));
        assert_eq!(day.snap(18.0), 0.0);
        assert_eq!(day.snap(19.0), 38.0);
        assert_eq!(day.snap(80.0), 76.0);
        assert_eq!(day.snap(-10.0), 0.0);

        let week = ViewState::compute(ViewMode::Week, &tasks, d("2000-01-01"));
        assert_eq!(week.snap(25.0), 20.0);
        assert_eq!(week.snap(31.0), 40.0);
    }

    #[test]
    fn x_to_date_rounds_to_columns() {
        let tasks = resolve(&[Task::new("a").planned("2024-01-01", "2024-01-03")]);
        let view = ViewState::compute(ViewMode::Day, &tasks, d("2000-01-01"));
        assert_eq!(view.start, d("2023-12-01"));
        assert_eq!(view.date_at(38.0 * 2.0 + 10.0), d("2023-12-03"));
        assert_eq!(view.end_for(d("2023-12-03"), 114.0), d("2023-12-06"));
    }
}
