//! Render orchestrator: owns the resolved schedule and every derived layout

use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::fmt;
use svgantt_core::date::{self, Language, TimeUnit};
use svgantt_core::{
    ConfigError, DependencyIndex, Diagnostic, GanttOptions, MountTarget, PopupError, ResolvedTask,
    Task, TaskId, TaskResolver, ViewMode,
};
use tracing::{debug, error};

use crate::arrow::Arrow;
use crate::axis::{date_labels, DateLabel};
use crate::bar::{Bar, BarTarget};
use crate::columns::ColumnLayout;
use crate::events::GanttEvent;
use crate::grid::GridLayout;
use crate::interaction::{InteractionController, PointerTarget};
use crate::popup::{self, PopupContent, PopupView};
use crate::scale::ViewState;

/// Comparison used to order task rows
pub type SortKey = Box<dyn Fn(&ResolvedTask, &ResolvedTask) -> Ordering>;

type ViewChangeHandler = Box<dyn FnMut(ViewMode)>;
type DateChangeHandler = Box<dyn FnMut(&ResolvedTask, NaiveDateTime, NaiveDateTime, bool)>;
type ProgressChangeHandler = Box<dyn FnMut(&ResolvedTask, f64)>;
type ClickHandler = Box<dyn FnMut(&ResolvedTask)>;

#[derive(Default)]
struct Handlers {
    view_change: Option<ViewChangeHandler>,
    date_change: Option<DateChangeHandler>,
    progress_change: Option<ProgressChangeHandler>,
    click: Option<ClickHandler>,
}

/// Which of a row's handle groups is currently shown
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hover {
    pub task_id: TaskId,
    pub target: BarTarget,
}

/// An interactive Gantt chart mounted on one element.
///
/// Every mutation (refresh, view change, sort, pointer session end) relays
/// out synchronously, so the accessors always describe a consistent frame.
pub struct Gantt {
    mount: MountTarget,
    options: GanttOptions,
    language: Language,
    today: NaiveDateTime,
    tasks: Vec<ResolvedTask>,
    dependencies: DependencyIndex,
    diagnostics: Vec<Diagnostic>,
    view: ViewState,
    grid: GridLayout,
    labels: Vec<DateLabel>,
    columns: ColumnLayout,
    bars: Vec<Bar>,
    arrows: Vec<Arrow>,
    interaction: InteractionController,
    hover: Option<Hover>,
    sort_key: Option<SortKey>,
    popup_content: Option<PopupContent>,
    handlers: Handlers,
}

impl fmt::Debug for Gantt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gantt")
            .field("mount", &self.mount)
            .field("view_mode", &self.view.mode)
            .field("tasks", &self.tasks.len())
            .field("bars", &self.bars.len())
            .field("arrows", &self.arrows.len())
            .finish_non_exhaustive()
    }
}

fn by_id(a: &ResolvedTask, b: &ResolvedTask) -> Ordering {
    a.id.cmp(&b.id)
}

impl Gantt {
    /// Mount a chart on `mount` (`#id` or a bare id).
    ///
    /// Tasks are ordered by id until a custom sort key is set.
    pub fn new(mount: &str, tasks: &[Task], options: GanttOptions) -> Result<Self, ConfigError> {
        Self::new_at(mount, tasks, options, date::today())
    }

    /// Like [`Gantt::new`] with a fixed "today"
    pub fn new_at(
        mount: &str,
        tasks: &[Task],
        options: GanttOptions,
        today: NaiveDateTime,
    ) -> Result<Self, ConfigError> {
        options.validate()?;
        let language = options.language()?;
        let mount = MountTarget::parse(mount)?;

        let schedule = TaskResolver::new().with_today(today).resolve(tasks);
        let view = ViewState::compute(options.view_mode, &[], today);

        let mut gantt = Self {
            mount,
            grid: GridLayout::compute(&view, &options, 0, today),
            options,
            language,
            today,
            tasks: schedule.tasks,
            dependencies: schedule.dependencies,
            diagnostics: schedule.diagnostics,
            view,
            labels: Vec::new(),
            columns: ColumnLayout::default(),
            bars: Vec::new(),
            arrows: Vec::new(),
            interaction: InteractionController::new(),
            hover: None,
            sort_key: None,
            popup_content: None,
            handlers: Handlers::default(),
        };
        gantt.sort_tasks();
        gantt.layout();
        Ok(gantt)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Replace the task collection and lay out again in the given order
    pub fn refresh(&mut self, tasks: &[Task]) -> Vec<GanttEvent> {
        let schedule = TaskResolver::new().with_today(self.today).resolve(tasks);
        self.tasks = schedule.tasks;
        self.dependencies = schedule.dependencies;
        self.diagnostics = schedule.diagnostics;
        self.reset_interaction();
        self.set_view_mode(self.view.mode)
    }

    /// Switch the time scale by name.
    ///
    /// An unknown name, or one not listed in the `viewModes` option, leaves
    /// the chart untouched.
    pub fn change_view_mode(&mut self, name: &str) -> Result<Vec<GanttEvent>, ConfigError> {
        let mode = match name.parse::<ViewMode>() {
            Ok(mode) if self.options.view_modes.contains(&mode) => mode,
            _ => {
                error!(view_mode = name, "rejected view mode change");
                return Err(ConfigError::UnknownViewMode(name.to_string()));
            }
        };
        Ok(self.set_view_mode(mode))
    }

    fn set_view_mode(&mut self, mode: ViewMode) -> Vec<GanttEvent> {
        self.view.mode = mode;
        self.options.view_mode = mode;
        self.layout();
        let events = vec![GanttEvent::ViewChange { mode }];
        self.dispatch(&events);
        events
    }

    /// Order rows with `key`, or by id when `None`, then lay out again
    pub fn set_sort_key(&mut self, key: Option<SortKey>) {
        self.sort_key = key;
        self.reset_interaction();
        self.sort_tasks();
        self.layout();
    }

    /// Clear every derived layout and rebuild it from the current tasks
    pub fn redraw(&mut self) {
        self.reset_interaction();
        self.bars.clear();
        self.arrows.clear();
        self.layout();
    }

    /// Per-task popup body, taking precedence over `customPopupHtml`
    pub fn set_popup_content(&mut self, content: Option<PopupContent>) {
        self.popup_content = content;
    }

    fn sort_tasks(&mut self) {
        match &self.sort_key {
            Some(key) => self.tasks.sort_by(|a, b| key(a, b)),
            None => self.tasks.sort_by(by_id),
        }
        for (index, task) in self.tasks.iter_mut().enumerate() {
            task.index = index;
        }
        self.dependencies = DependencyIndex::build(&self.tasks);
    }

    fn reset_interaction(&mut self) {
        self.interaction = InteractionController::new();
        self.hover = None;
    }

    fn layout(&mut self) {
        self.view = ViewState::compute(self.view.mode, &self.tasks, self.today);
        self.options.column_width = self.view.column_width;
        self.options.step = self.view.step;

        self.grid = GridLayout::compute(&self.view, &self.options, self.tasks.len(), self.today);
        for task in &mut self.tasks {
            task.grid_row = self.grid.rows.get(task.index).copied();
        }
        self.labels = date_labels(&self.view, self.options.header_height, self.language);
        self.columns = ColumnLayout::compute(&self.options, &self.tasks, self.language);

        self.bars = self
            .tasks
            .iter()
            .filter_map(|task| Bar::layout(task, &self.view, &self.options))
            .collect();

        self.arrows = self
            .tasks
            .iter()
            .flat_map(|task| task.dependencies.iter().map(move |dep| (dep, &task.id)))
            .filter_map(|(from, to)| {
                let from = self.get_bar(from)?;
                let to = self.get_bar(to)?;
                Some(Arrow::new(from, to, &self.options))
            })
            .collect();

        debug!(
            view_mode = %self.view.mode,
            tasks = self.tasks.len(),
            bars = self.bars.len(),
            arrows = self.arrows.len(),
            ticks = self.view.ticks.len(),
            "layout computed"
        );
    }

    fn update_arrows(&mut self, moved: &[TaskId]) {
        if moved.is_empty() {
            return;
        }
        let bars = &self.bars;
        let find = |id: &str| bars.iter().find(|b| b.task_id == id);
        for arrow in &mut self.arrows {
            if !moved.iter().any(|id| arrow.touches(id)) {
                continue;
            }
            if let (Some(from), Some(to)) = (find(arrow.from.as_str()), find(arrow.to.as_str())) {
                arrow.update(from, to, &self.options);
            }
        }
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub fn on_view_change(&mut self, handler: impl FnMut(ViewMode) + 'static) {
        self.handlers.view_change = Some(Box::new(handler));
    }

    /// `handler(task, start, end, planned)`; `end` is inclusive
    pub fn on_date_change(
        &mut self,
        handler: impl FnMut(&ResolvedTask, NaiveDateTime, NaiveDateTime, bool) + 'static,
    ) {
        self.handlers.date_change = Some(Box::new(handler));
    }

    pub fn on_progress_change(&mut self, handler: impl FnMut(&ResolvedTask, f64) + 'static) {
        self.handlers.progress_change = Some(Box::new(handler));
    }

    pub fn on_click(&mut self, handler: impl FnMut(&ResolvedTask) + 'static) {
        self.handlers.click = Some(Box::new(handler));
    }

    fn dispatch(&mut self, events: &[GanttEvent]) {
        let Self { handlers, tasks, .. } = self;
        for event in events {
            match event {
                GanttEvent::ViewChange { mode } => {
                    if let Some(handler) = handlers.view_change.as_mut() {
                        handler(*mode);
                    }
                }
                GanttEvent::DateChange {
                    task_id,
                    start,
                    end,
                    planned,
                } => {
                    let task = tasks.iter().find(|t| &t.id == task_id);
                    if let (Some(handler), Some(task)) = (handlers.date_change.as_mut(), task) {
                        handler(task, *start, *end, *planned);
                    }
                }
                GanttEvent::ProgressChange { task_id, progress } => {
                    let task = tasks.iter().find(|t| &t.id == task_id);
                    if let (Some(handler), Some(task)) = (handlers.progress_change.as_mut(), task) {
                        handler(task, *progress);
                    }
                }
                GanttEvent::Click { task_id } => {
                    let task = tasks.iter().find(|t| &t.id == task_id);
                    if let (Some(handler), Some(task)) = (handlers.click.as_mut(), task) {
                        handler(task);
                    }
                }
            }
        }
    }

    // ========================================================================
    // Pointer input
    // ========================================================================

    /// What is under the pointer, in priority order: progress handle, resize
    /// handles, then bar bodies (planned before actual).
    pub fn hit_test(&self, x: f64, y: f64) -> Option<(TaskId, PointerTarget)> {
        self.bars.iter().find_map(|bar| {
            let hit = |target| Some((bar.task_id.clone(), target));

            if bar.progress_handle_rect().is_some_and(|r| r.contains(x, y)) {
                return hit(PointerTarget::Progress);
            }
            let handle_groups = [
                (bar.handles, BarTarget::Actual),
                (bar.planned_handles, BarTarget::Planned),
            ];
            for (handles, target) in handle_groups {
                let Some(handles) = handles else { continue };
                if handles.left.contains(x, y) {
                    return hit(PointerTarget::ResizeLeft(target));
                }
                if handles.right.contains(x, y) {
                    return hit(PointerTarget::ResizeRight(target));
                }
            }
            if bar.has_planned && bar.planned.contains(x, y) {
                return hit(PointerTarget::Body(BarTarget::Planned));
            }
            if bar.actual.contains(x, y) {
                return hit(PointerTarget::Body(BarTarget::Actual));
            }
            None
        })
    }

    /// Track which handle group should be visible for a pointer position.
    ///
    /// The row is found from the grid row recorded on each task; within it
    /// the actual bar wins over the planned one. Holding a button hides both.
    pub fn hover(&mut self, x: f64, y: f64, buttons_held: bool) -> Option<&Hover> {
        self.hover = if buttons_held {
            None
        } else {
            self.tasks
                .iter()
                .find(|t| t.grid_row.is_some_and(|row| row.contains_y(y)))
                .and_then(|task| self.get_bar(&task.id))
                .and_then(|bar| {
                    let target = if bar.actual.contains_x(x) {
                        BarTarget::Actual
                    } else if bar.has_planned && bar.planned.contains_x(x) {
                        BarTarget::Planned
                    } else {
                        return None;
                    };
                    Some(Hover {
                        task_id: bar.task_id.clone(),
                        target,
                    })
                })
        };
        self.hover.as_ref()
    }

    pub fn hovered(&self) -> Option<&Hover> {
        self.hover.as_ref()
    }

    /// Start a session if the pointer is over something editable
    ///
    /// A session left open by a lost pointer-up is aborted first.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Option<PointerTarget> {
        let stale = self.interaction.cancel(&mut self.bars);
        self.update_arrows(&stale);

        let (task_id, target) = self.hit_test(x, y)?;
        self.interaction
            .begin(&task_id, target, x, &self.bars, &self.tasks, &self.dependencies)
            .then_some(target)
    }

    /// Returns the ids of bars that moved (or were restored on abort)
    pub fn pointer_move(&mut self, x: f64, buttons_held: bool) -> Vec<TaskId> {
        if !self.interaction.is_active() {
            return Vec::new();
        }
        let moved = self
            .interaction
            .pointer_move(x, buttons_held, &mut self.bars, &self.view);
        self.update_arrows(&moved);
        moved
    }

    /// End the session, commit and fire change events
    pub fn pointer_up(&mut self) -> Vec<GanttEvent> {
        let ids: Vec<TaskId> = self
            .interaction
            .session()
            .map(|s| s.task_ids().map(str::to_string).collect())
            .unwrap_or_default();

        let events = self
            .interaction
            .end(&mut self.bars, &mut self.tasks, &self.view);
        self.update_arrows(&ids);
        self.dispatch(&events);
        events
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn mount(&self) -> &MountTarget {
        &self.mount
    }

    pub fn options(&self) -> &GanttOptions {
        &self.options
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn today(&self) -> NaiveDateTime {
        self.today
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn tasks(&self) -> &[ResolvedTask] {
        &self.tasks
    }

    pub fn get_task(&self, id: &str) -> Option<&ResolvedTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn get_bar(&self, id: &str) -> Option<&Bar> {
        self.bars.iter().find(|b| b.task_id == id)
    }

    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    pub fn grid(&self) -> &GridLayout {
        &self.grid
    }

    pub fn date_labels(&self) -> &[DateLabel] {
        &self.labels
    }

    pub fn column_layout(&self) -> &ColumnLayout {
        &self.columns
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn dependencies(&self) -> &DependencyIndex {
        &self.dependencies
    }

    /// Every task that transitively depends on `id`
    pub fn dependents_of(&self, id: &str) -> Vec<TaskId> {
        self.dependencies.descendants(id)
    }

    /// Earliest actual start across all tasks
    pub fn oldest_start(&self) -> Option<NaiveDateTime> {
        self.tasks.iter().map(|t| t.actual_start).min()
    }

    /// Horizontal scroll that brings the earliest task into view, one column in
    pub fn scroll_offset(&self) -> f64 {
        let Some(oldest) = self.oldest_start() else {
            return 0.0;
        };
        let hours = date::diff(oldest, self.view.start, TimeUnit::Hour) as f64;
        hours / self.view.step * self.view.column_width - self.view.column_width
    }

    pub fn popup(&self, task_id: &str) -> Result<PopupView, PopupError> {
        let Some(task) = self.get_task(task_id) else {
            return Err(PopupError::MissingAnchor(task_id.to_string()));
        };
        popup::build(
            task,
            self.get_bar(task_id),
            &self.options,
            self.language,
            self.popup_content.as_ref(),
        )
    }
}
