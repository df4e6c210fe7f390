//! Pointer-driven drag, resize and progress editing
//!
//! A session starts on pointer-down over a bar, a handle or the progress
//! handle and snapshots every bar that has to move with it: the grabbed task
//! plus its full dependent closure. Moves are applied from those snapshots,
//! never incrementally, so a rejected move simply leaves a bar where the
//! previous accepted move put it.
//!
//! Pointer-up always ends the session and converts pixels back to dates or a
//! progress percentage. Dependents are settled so none ends up starting
//! before one of its dependencies.

use chrono::NaiveDateTime;
use serde::Serialize;
use svgantt_core::date::{self, TimeUnit};
use svgantt_core::{DependencyIndex, ResolvedTask, TaskId};
use tracing::debug;

use crate::bar::{Bar, BarTarget};
use crate::events::GanttEvent;
use crate::scale::ViewState;

/// Pointer travel, in pixels, below which a press and release is a click
pub const CLICK_TOLERANCE: f64 = 3.0;

/// What the pointer is over
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PointerTarget {
    Body(BarTarget),
    ResizeLeft(BarTarget),
    ResizeRight(BarTarget),
    Progress,
}

impl PointerTarget {
    pub fn mode(self) -> SessionMode {
        match self {
            PointerTarget::Body(_) => SessionMode::Dragging,
            PointerTarget::ResizeLeft(_) => SessionMode::ResizingLeft,
            PointerTarget::ResizeRight(_) => SessionMode::ResizingRight,
            PointerTarget::Progress => SessionMode::ResizingProgress,
        }
    }

    pub fn bar_target(self) -> BarTarget {
        match self {
            PointerTarget::Body(t) | PointerTarget::ResizeLeft(t) | PointerTarget::ResizeRight(t) => t,
            PointerTarget::Progress => BarTarget::Actual,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SessionMode {
    Dragging,
    ResizingLeft,
    ResizingRight,
    ResizingProgress,
}

/// Per-bar scratch state, alive only for the session
#[derive(Clone, Debug, PartialEq)]
struct Entry {
    task_id: TaskId,
    dependencies: Vec<TaskId>,
    origin_x: f64,
    origin_y: f64,
    origin_width: f64,
    origin_progress_width: f64,
    final_dx: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    mode: SessionMode,
    target: BarTarget,
    grabbed: TaskId,
    x_on_start: f64,
    /// Largest horizontal distance from the press point seen so far
    travel: f64,
    entries: Vec<Entry>,
}

impl Session {
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn target(&self) -> BarTarget {
        self.target
    }

    pub fn grabbed(&self) -> &str {
        &self.grabbed
    }

    /// Ids of every bar the session may move, grabbed task first
    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.task_id.as_str())
    }

    pub fn is_click(&self) -> bool {
        self.travel < CLICK_TOLERANCE
    }

    /// Put every snapshotted bar back where the session found it
    fn restore(&self, bars: &mut [Bar]) -> Vec<TaskId> {
        let mut restored = Vec::new();
        for entry in &self.entries {
            if let Some(i) = position(bars, &entry.task_id) {
                let bar = &mut bars[i];
                bar.set_x(self.target, entry.origin_x);
                bar.set_width(self.target, entry.origin_width);
                if self.mode == SessionMode::ResizingProgress {
                    bar.set_progress_width(entry.origin_progress_width);
                }
                restored.push(entry.task_id.clone());
            }
        }
        restored
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    Active(Session),
}

#[derive(Clone, Debug, Default)]
pub struct InteractionController {
    state: InteractionState,
}

fn position(bars: &[Bar], id: &str) -> Option<usize> {
    bars.iter().position(|b| b.task_id == id)
}

fn find(tasks: &[ResolvedTask], id: &str) -> Option<usize> {
    tasks.iter().position(|t| t.id == id)
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            InteractionState::Active(session) => Some(session),
            InteractionState::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session().is_some()
    }

    /// Start a session on `grabbed`.
    ///
    /// Returns false when it has no bar or another session is still running;
    /// [`cancel`](Self::cancel) that one first.
    pub fn begin(
        &mut self,
        grabbed: &str,
        pointer: PointerTarget,
        x: f64,
        bars: &[Bar],
        tasks: &[ResolvedTask],
        dependencies: &DependencyIndex,
    ) -> bool {
        if self.is_active() {
            return false;
        }
        let Some(grabbed_bar) = position(bars, grabbed).map(|i| &bars[i]) else {
            return false;
        };

        let mode = pointer.mode();
        let target = if grabbed_bar.has_planned {
            pointer.bar_target()
        } else {
            BarTarget::Actual
        };

        let ids: Vec<TaskId> = if mode == SessionMode::ResizingProgress {
            vec![grabbed.to_string()]
        } else {
            std::iter::once(grabbed.to_string())
                .chain(dependencies.descendants(grabbed))
                .collect()
        };

        let entries = ids
            .into_iter()
            .filter_map(|id| {
                let bar = &bars[position(bars, &id)?];
                let rect = bar.rect(target);
                let deps = tasks
                    .iter()
                    .find(|t| t.id == id)
                    .map(|t| t.dependencies.clone())
                    .unwrap_or_default();
                Some(Entry {
                    origin_x: rect.x,
                    origin_y: rect.y,
                    origin_width: rect.width,
                    origin_progress_width: bar.progress_bar.width,
                    final_dx: 0.0,
                    dependencies: deps,
                    task_id: id,
                })
            })
            .collect::<Vec<_>>();

        debug!(task = grabbed, ?mode, ?target, bars = entries.len(), "interaction started");
        self.state = InteractionState::Active(Session {
            mode,
            target,
            grabbed: grabbed.to_string(),
            x_on_start: x,
            travel: 0.0,
            entries,
        });
        true
    }

    /// Apply a pointer move. Returns the ids of bars that may have moved.
    ///
    /// A move with no button held aborts the session and restores every
    /// snapshotted bar.
    pub fn pointer_move(
        &mut self,
        x: f64,
        buttons_held: bool,
        bars: &mut [Bar],
        view: &ViewState,
    ) -> Vec<TaskId> {
        if !buttons_held {
            return self.cancel(bars);
        }
        let InteractionState::Active(session) = &mut self.state else {
            return Vec::new();
        };

        let raw_dx = x - session.x_on_start;
        session.travel = session.travel.max(raw_dx.abs());

        if session.mode == SessionMode::ResizingProgress {
            let Some(entry) = session.entries.first_mut() else {
                return Vec::new();
            };
            let Some(i) = position(bars, &entry.task_id) else {
                return Vec::new();
            };
            let max_dx = bars[i].actual.width - entry.origin_progress_width;
            let dx = raw_dx.clamp(-entry.origin_progress_width, max_dx.max(-entry.origin_progress_width));
            bars[i].set_progress_width(entry.origin_progress_width + dx);
            entry.final_dx = dx;
            return vec![entry.task_id.clone()];
        }

        let dx = view.snap(raw_dx);
        let target = session.target;
        let mut moved = Vec::with_capacity(session.entries.len());

        for entry in &mut session.entries {
            entry.final_dx = dx;
            let is_grabbed = entry.task_id == session.grabbed;
            let (new_x, new_width) = match session.mode {
                SessionMode::Dragging => (Some(entry.origin_x + dx), None),
                SessionMode::ResizingLeft if is_grabbed => {
                    (Some(entry.origin_x + dx), Some(entry.origin_width - dx))
                }
                SessionMode::ResizingLeft => (Some(entry.origin_x + dx), None),
                SessionMode::ResizingRight if is_grabbed => {
                    (None, Some(entry.origin_width + dx))
                }
                SessionMode::ResizingRight | SessionMode::ResizingProgress => continue,
            };

            if let Some(new_x) = new_x {
                // a bar may not start before any of its dependencies
                let blocked = entry.dependencies.iter().any(|dep| {
                    position(bars, dep).is_some_and(|d| new_x < bars[d].rect(target).x)
                });
                if blocked {
                    continue;
                }
            }

            let Some(i) = position(bars, &entry.task_id) else {
                continue;
            };
            if let Some(new_x) = new_x {
                bars[i].set_x(target, new_x);
            }
            if let Some(width) = new_width {
                if width >= view.column_width {
                    bars[i].set_width(target, width);
                }
            }
            moved.push(entry.task_id.clone());
        }

        moved
    }

    /// Abort the session and put every bar back where it started
    pub fn cancel(&mut self, bars: &mut [Bar]) -> Vec<TaskId> {
        let InteractionState::Active(session) = std::mem::take(&mut self.state) else {
            return Vec::new();
        };
        debug!(task = %session.grabbed, "interaction aborted");
        session.restore(bars)
    }

    /// End the session, write changed values back and report them.
    ///
    /// Always returns to idle. A session whose pointer never left the click
    /// tolerance restores its bars and reports a single click instead.
    pub fn end(
        &mut self,
        bars: &mut [Bar],
        tasks: &mut [ResolvedTask],
        view: &ViewState,
    ) -> Vec<GanttEvent> {
        let InteractionState::Active(session) = std::mem::take(&mut self.state) else {
            return Vec::new();
        };

        if session.is_click() {
            session.restore(bars);
            debug!(task = %session.grabbed, "click");
            return vec![GanttEvent::Click {
                task_id: session.grabbed,
            }];
        }

        let events = if session.mode == SessionMode::ResizingProgress {
            commit_progress(&session, bars, tasks)
        } else {
            commit_dates(&session, bars, tasks, view)
        };

        debug!(
            task = %session.grabbed,
            events = events.len(),
            "interaction finished"
        );
        events
    }
}

fn commit_progress(session: &Session, bars: &mut [Bar], tasks: &mut [ResolvedTask]) -> Vec<GanttEvent> {
    let Some(entry) = session.entries.first() else {
        return Vec::new();
    };
    if entry.final_dx == 0.0 {
        return Vec::new();
    }
    let (Some(b), Some(task)) = (
        position(bars, &entry.task_id),
        tasks.iter_mut().find(|t| t.id == entry.task_id),
    ) else {
        return Vec::new();
    };

    let progress = bars[b].progress_percent();
    bars[b].progress = progress;
    if task.progress == progress {
        return Vec::new();
    }
    task.progress = progress;
    vec![GanttEvent::ProgressChange {
        task_id: task.id.clone(),
        progress,
    }]
}

fn range_of(task: &ResolvedTask, target: BarTarget) -> (NaiveDateTime, Option<NaiveDateTime>) {
    match target {
        BarTarget::Actual => (task.actual_start, task.actual_end),
        BarTarget::Planned => (task.planned_start, Some(task.planned_end)),
    }
}

fn write_range(task: &mut ResolvedTask, target: BarTarget, start: NaiveDateTime, end: NaiveDateTime) {
    match target {
        BarTarget::Actual => {
            task.actual_start = start;
            task.actual_end = Some(end);
        }
        BarTarget::Planned => {
            task.planned_start = start;
            task.planned_end = end;
        }
    }
}

fn commit_dates(
    session: &Session,
    bars: &mut [Bar],
    tasks: &mut [ResolvedTask],
    view: &ViewState,
) -> Vec<GanttEvent> {
    let target = session.target;

    let before: Vec<Option<(NaiveDateTime, Option<NaiveDateTime>)>> = session
        .entries
        .iter()
        .map(|e| find(tasks, &e.task_id).map(|t| range_of(&tasks[t], target)))
        .collect();

    // pixels back to dates, for bars that actually moved
    for entry in &session.entries {
        let (Some(b), Some(t)) = (position(bars, &entry.task_id), find(tasks, &entry.task_id)) else {
            continue;
        };
        let rect = *bars[b].rect(target);
        if entry.final_dx == 0.0 || (rect.x == entry.origin_x && rect.width == entry.origin_width) {
            continue;
        }
        let start = view.date_at(rect.x);
        let end = view.end_for(start, rect.width);
        write_range(&mut tasks[t], target, start, end);
    }

    // settle: nothing starts before one of its dependencies
    for _ in 0..=session.entries.len() {
        let mut changed = false;
        for entry in &session.entries {
            let Some(t) = find(tasks, &entry.task_id) else {
                continue;
            };
            let floor = entry
                .dependencies
                .iter()
                .filter_map(|dep| find(tasks, dep))
                .map(|d| range_of(&tasks[d], target).0)
                .max();
            let (start, end) = range_of(&tasks[t], target);
            let (Some(floor), Some(end)) = (floor, end) else {
                continue;
            };
            if start < floor {
                let shift = date::diff(floor, start, TimeUnit::Millisecond);
                write_range(
                    &mut tasks[t],
                    target,
                    floor,
                    date::add(end, shift, TimeUnit::Millisecond),
                );
                if let Some(b) = position(bars, &entry.task_id) {
                    bars[b].set_x(target, view.x_for(floor));
                }
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let mut events = Vec::new();
    for (entry, before) in session.entries.iter().zip(before) {
        let (Some(t), Some(before)) = (find(tasks, &entry.task_id), before) else {
            continue;
        };
        let after = range_of(&tasks[t], target);
        if after == before {
            continue;
        }
        let (start, Some(end)) = after else {
            continue;
        };
        events.push(GanttEvent::DateChange {
            task_id: entry.task_id.clone(),
            start,
            end: date::add(end, -1, TimeUnit::Second),
            planned: target == BarTarget::Planned,
        });
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use svgantt_core::date::parse;
    use svgantt_core::{GanttOptions, Task, TaskResolver, ViewMode};

    struct Fixture {
        tasks: Vec<ResolvedTask>,
        deps: DependencyIndex,
        view: ViewState,
        bars: Vec<Bar>,
    }

    fn fixture(tasks: &[Task]) -> Fixture {
        let schedule = TaskResolver::new().resolve(tasks);
        let view = ViewState::compute(ViewMode::Day, &schedule.tasks, parse("2024-01-01").unwrap());
        let options = GanttOptions::default();
        let bars = schedule
            .tasks
            .iter()
            .filter_map(|t| Bar::layout(t, &view, &options))
            .collect();
        Fixture {
            tasks: schedule.tasks,
            deps: schedule.dependencies,
            view,
            bars,
        }
    }

    fn two_tasks() -> Fixture {
        fixture(&[
            Task::new("a").planned("2024-01-01", "2024-01-03"),
            Task::new("b").planned("2024-01-02", "2024-01-04").depends_on("a"),
        ])
    }

    fn d(s: &str) -> NaiveDateTime {
        parse(s).unwrap()
    }

    #[test]
    fn drag_moves_closure_and_commits_dates() {
        let mut f = two_tasks();
        let mut ctl = InteractionController::new();
        let ax = f.bars[0].actual.x;

        assert!(ctl.begin("a", PointerTarget::Body(BarTarget::Actual), 500.0, &f.bars, &f.tasks, &f.deps));
        let moved = ctl.pointer_move(500.0 + 76.0, true, &mut f.bars, &f.view);
        assert_eq!(moved, vec!["a", "b"]);
        assert_eq!(f.bars[0].actual.x, ax + 76.0);

        let events = ctl.end(&mut f.bars, &mut f.tasks, &f.view);
        assert!(!ctl.is_active());
        assert_eq!(f.tasks[0].actual_start, d("2024-01-03"));
        assert_eq!(f.tasks[0].actual_end, Some(d("2024-01-06")));
        assert_eq!(f.tasks[1].actual_start, d("2024-01-04"));
        assert!(f.tasks[1].actual_start >= f.tasks[0].actual_start);

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            GanttEvent::DateChange {
                task_id: "a".into(),
                start: d("2024-01-03"),
                end: d("2024-01-05 23:59:59"),
                planned: false,
            }
        );
    }

    #[test]
    fn dependent_cannot_be_dragged_before_dependency() {
        let mut f = two_tasks();
        let mut ctl = InteractionController::new();
        let bx = f.bars[1].actual.x;
        let ax = f.bars[0].actual.x;

        ctl.begin("b", PointerTarget::Body(BarTarget::Actual), 500.0, &f.bars, &f.tasks, &f.deps);
        ctl.pointer_move(500.0 - 38.0, true, &mut f.bars, &f.view);
        assert_eq!(f.bars[1].actual.x, ax);

        // two columns left would cross a: rejected, stays at previous position
        ctl.pointer_move(500.0 - 76.0, true, &mut f.bars, &f.view);
        assert_eq!(f.bars[1].actual.x, bx - 38.0);

        ctl.end(&mut f.bars, &mut f.tasks, &f.view);
        assert_eq!(f.tasks[1].actual_start, f.tasks[0].actual_start);
    }

    #[test]
    fn snapping_ignores_small_moves() {
        let mut f = two_tasks();
        let mut ctl = InteractionController::new();
        ctl.begin("a", PointerTarget::Body(BarTarget::Actual), 500.0, &f.bars, &f.tasks, &f.deps);
        ctl.pointer_move(510.0, true, &mut f.bars, &f.view);
        let events = ctl.end(&mut f.bars, &mut f.tasks, &f.view);
        assert!(events.is_empty());
        assert_eq!(f.tasks[0].actual_start, d("2024-01-01"));
    }

    #[test]
    fn resize_right_only_extends_grabbed() {
        let mut f = two_tasks();
        let mut ctl = InteractionController::new();
        let bx = f.bars[1].actual.x;
        ctl.begin("a", PointerTarget::ResizeRight(BarTarget::Actual), 0.0, &f.bars, &f.tasks, &f.deps);
        ctl.pointer_move(38.0, true, &mut f.bars, &f.view);
        assert_eq!(f.bars[0].actual.width, 152.0);
        assert_eq!(f.bars[1].actual.x, bx);

        let events = ctl.end(&mut f.bars, &mut f.tasks, &f.view);
        assert_eq!(events.len(), 1);
        assert_eq!(f.tasks[0].actual_end, Some(d("2024-01-05")));
    }

    #[test]
    fn resize_left_ignores_widths_below_one_column() {
        let mut f = fixture(&[Task::new("a").planned("2024-01-01", "2024-01-01")]);
        let mut ctl = InteractionController::new();
        let x = f.bars[0].actual.x;
        ctl.begin("a", PointerTarget::ResizeLeft(BarTarget::Actual), 0.0, &f.bars, &f.tasks, &f.deps);
        ctl.pointer_move(38.0, true, &mut f.bars, &f.view);
        assert_eq!(f.bars[0].actual.x, x + 38.0);
        assert_eq!(f.bars[0].actual.width, 38.0);
    }

    #[test]
    fn progress_drag_is_clamped_and_truncated() {
        let mut f = fixture(&[Task::new("a").planned("2024-01-01", "2024-01-03").progress(50.0)]);
        let mut ctl = InteractionController::new();
        ctl.begin("a", PointerTarget::Progress, 0.0, &f.bars, &f.tasks, &f.deps);

        ctl.pointer_move(500.0, true, &mut f.bars, &f.view);
        assert_eq!(f.bars[0].progress_bar.width, 114.0);

        ctl.pointer_move(-10.0, true, &mut f.bars, &f.view);
        assert_eq!(f.bars[0].progress_bar.width, 47.0);

        let events = ctl.end(&mut f.bars, &mut f.tasks, &f.view);
        assert_eq!(f.tasks[0].progress, 41.0);
        assert_eq!(
            events,
            vec![GanttEvent::ProgressChange {
                task_id: "a".into(),
                progress: 41.0
            }]
        );
    }

    #[test]
    fn buttonless_move_aborts_and_restores() {
        let mut f = two_tasks();
        let mut ctl = InteractionController::new();
        let original = f.bars.clone();
        ctl.begin("a", PointerTarget::Body(BarTarget::Actual), 0.0, &f.bars, &f.tasks, &f.deps);
        ctl.pointer_move(76.0, true, &mut f.bars, &f.view);
        let restored = ctl.pointer_move(90.0, false, &mut f.bars, &f.view);

        assert_eq!(restored, vec!["a", "b"]);
        assert!(!ctl.is_active());
        assert_eq!(f.bars, original);
        assert!(ctl.end(&mut f.bars, &mut f.tasks, &f.view).is_empty());
    }

    #[test]
    fn release_without_travel_is_a_click() {
        let mut f = two_tasks();
        let mut ctl = InteractionController::new();
        let before = f.bars.clone();
        ctl.begin("a", PointerTarget::Body(BarTarget::Actual), 500.0, &f.bars, &f.tasks, &f.deps);
        ctl.pointer_move(502.0, true, &mut f.bars, &f.view);

        let events = ctl.end(&mut f.bars, &mut f.tasks, &f.view);
        assert_eq!(events, vec![GanttEvent::Click { task_id: "a".into() }]);
        assert_eq!(f.bars, before);
        assert_eq!(f.tasks[0].actual_start, d("2024-01-01"));
    }

    #[test]
    fn progress_nudge_within_tolerance_is_a_click() {
        let mut f = fixture(&[Task::new("a").planned("2024-01-01", "2024-01-03").progress(50.0)]);
        let mut ctl = InteractionController::new();
        ctl.begin("a", PointerTarget::Progress, 0.0, &f.bars, &f.tasks, &f.deps);
        ctl.pointer_move(2.0, true, &mut f.bars, &f.view);
        assert_eq!(f.bars[0].progress_bar.width, 59.0);

        let events = ctl.end(&mut f.bars, &mut f.tasks, &f.view);
        assert!(matches!(events[0], GanttEvent::Click { .. }));
        assert_eq!(f.bars[0].progress_bar.width, 57.0);
        assert_eq!(f.tasks[0].progress, 50.0);
    }

    #[test]
    fn begin_refuses_while_a_session_is_active() {
        let mut f = two_tasks();
        let mut ctl = InteractionController::new();
        assert!(ctl.begin("a", PointerTarget::Body(BarTarget::Actual), 0.0, &f.bars, &f.tasks, &f.deps));
        ctl.pointer_move(76.0, true, &mut f.bars, &f.view);

        assert!(!ctl.begin("b", PointerTarget::Body(BarTarget::Actual), 0.0, &f.bars, &f.tasks, &f.deps));
        assert_eq!(ctl.session().map(Session::grabbed), Some("a"));

        let ax = f.bars[0].actual.x;
        ctl.cancel(&mut f.bars);
        assert_eq!(f.bars[0].actual.x, ax - 76.0);
        assert!(ctl.begin("b", PointerTarget::Body(BarTarget::Actual), 0.0, &f.bars, &f.tasks, &f.deps));
    }

    #[test]
    fn planned_drag_targets_planned_bar() {
        let mut f = fixture(&[Task::new("a")
            .planned("2024-01-01", "2024-01-03")
            .actual("2024-01-02", "2024-01-04")]);
        let mut ctl = InteractionController::new();
        let actual_x = f.bars[0].actual.x;
        ctl.begin("a", PointerTarget::Body(BarTarget::Planned), 0.0, &f.bars, &f.tasks, &f.deps);
        ctl.pointer_move(38.0, true, &mut f.bars, &f.view);
        assert_eq!(f.bars[0].actual.x, actual_x);

        let events = ctl.end(&mut f.bars, &mut f.tasks, &f.view);
        assert_eq!(f.tasks[0].planned_start, d("2024-01-02"));
        assert_eq!(f.tasks[0].actual_start, d("2024-01-02"));
        assert!(matches!(events[0], GanttEvent::DateChange { planned: true, .. }));
    }

    #[test]
    fn settle_keeps_dependents_after_unaligned_dependency() {
        let mut f = fixture(&[
            Task::new("a").planned("2024-01-01 09:00", "2024-01-03"),
            Task::new("b").planned("2024-01-05 09:00", "2024-01-06").depends_on("a"),
        ]);
        let mut ctl = InteractionController::new();
        let ax = f.bars[0].actual.x;
        let bx = f.bars[1].actual.x;
        ctl.begin("b", PointerTarget::Body(BarTarget::Actual), 0.0, &f.bars, &f.tasks, &f.deps);
        // lands exactly on a's x; rounding to whole columns alone would start b at midnight
        ctl.pointer_move(ax - bx, true, &mut f.bars, &f.view);
        assert_eq!(f.bars[1].actual.x, ax);

        let events = ctl.end(&mut f.bars, &mut f.tasks, &f.view);
        assert_eq!(f.tasks[1].actual_start, d("2024-01-01 09:00"));
        assert_eq!(f.tasks[1].actual_end, Some(d("2024-01-03")));
        assert_eq!(f.bars[1].actual.x, ax);
        assert_eq!(events.len(), 1);
    }
}
