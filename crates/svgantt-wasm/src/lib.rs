//! WebAssembly bindings for the svgantt chart engine
//!
//! The host page owns the DOM: it hands task and option JSON to a
//! [`GanttChart`], inserts the returned SVG, and forwards pointer events back
//! in chart coordinates. Change notifications come back as JSON arrays of
//! events for the host to dispatch.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use svgantt_core::{GanttOptions, Task};
use svgantt_render::{Gantt, GanttEvent, PointerTarget, Renderer, SvgRenderer};

/// Initialize panic hook for better error messages in console
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Render a chart in one call and return the SVG markup
#[wasm_bindgen]
pub fn render_chart(mount: &str, tasks_json: &str, options_json: &str) -> Result<String, JsValue> {
    let chart = GanttChart::create(mount, tasks_json, options_json).map_err(to_js)?;
    chart.svg().map_err(to_js)
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js(message: String) -> JsValue {
    JsValue::from_str(&message)
}

// ============================================================================
// GanttChart Class
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HitResult<'a> {
    task_id: &'a str,
    target: PointerTarget,
}

/// A live chart that keeps layout and drag state between calls
#[wasm_bindgen]
pub struct GanttChart {
    gantt: Gantt,
    renderer: SvgRenderer,
}

#[wasm_bindgen]
impl GanttChart {
    /// Build a chart from a JSON task array and an optional JSON options
    /// object (an empty string means defaults)
    #[wasm_bindgen(constructor)]
    pub fn new(mount: &str, tasks_json: &str, options_json: &str) -> Result<GanttChart, JsValue> {
        Self::create(mount, tasks_json, options_json).map_err(to_js)
    }

    /// Current chart as SVG markup
    pub fn render_svg(&self) -> Result<String, JsValue> {
        self.svg().map_err(to_js)
    }

    /// Switch the time scale; returns the emitted events as JSON
    pub fn change_view_mode(&mut self, mode: &str) -> Result<String, JsValue> {
        self.view_mode_events(mode).map_err(to_js)
    }

    /// Replace the task list; returns the emitted events as JSON
    pub fn refresh(&mut self, tasks_json: &str) -> Result<String, JsValue> {
        self.refresh_events(tasks_json).map_err(to_js)
    }

    /// Horizontal scroll position that brings the earliest task into view
    pub fn scroll_offset(&self) -> f64 {
        self.gantt.scroll_offset()
    }

    pub fn width(&self) -> f64 {
        self.gantt.column_layout().width + self.gantt.grid().width
    }

    pub fn height(&self) -> f64 {
        self.gantt.grid().height
    }

    pub fn view_mode(&self) -> String {
        self.gantt.view().mode.to_string()
    }

    /// Element under the pointer as `{taskId, target}`, or `null`
    pub fn hit_test(&self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        match self.gantt.hit_test(x, y) {
            Some((task_id, target)) => serde_wasm_bindgen::to_value(&HitResult {
                task_id: &task_id,
                target,
            })
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e))),
            None => Ok(JsValue::NULL),
        }
    }

    /// Id of the bar whose handles should be shown, if any
    pub fn hover(&mut self, x: f64, y: f64, buttons_held: bool) -> Option<String> {
        self.gantt
            .hover(x, y, buttons_held)
            .map(|hover| hover.task_id.clone())
    }

    /// Returns true if a drag session started
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.gantt.pointer_down(x, y).is_some()
    }

    /// Returns the ids of bars whose geometry changed
    pub fn pointer_move(&mut self, x: f64, buttons_held: bool) -> Vec<String> {
        self.gantt.pointer_move(x, buttons_held)
    }

    /// Finish the drag; returns the emitted events as JSON (a `Click` when
    /// the pointer never travelled)
    pub fn pointer_up(&mut self) -> Result<String, JsValue> {
        let events = self.gantt.pointer_up();
        events_json(&events).map_err(to_js)
    }

    /// Every task that transitively depends on `task_id`
    pub fn dependents_of(&self, task_id: &str) -> Vec<String> {
        self.gantt.dependents_of(task_id)
    }

    /// Popup for a task as `{task_id, html, x, y}` JSON
    pub fn popup(&self, task_id: &str) -> Result<String, JsValue> {
        self.popup_json(task_id).map_err(to_js)
    }

    /// Popup markup only, for hosts that place it themselves
    pub fn popup_html(&self, task_id: &str) -> Result<String, JsValue> {
        self.gantt
            .popup(task_id)
            .map(|popup| popup.html)
            .map_err(|e| JsValue::from_str(&format!("Popup error: {}", e)))
    }

    /// Data problems found while resolving the tasks, as JSON
    pub fn diagnostics(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.gantt.diagnostics())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}

impl GanttChart {
    fn create(mount: &str, tasks_json: &str, options_json: &str) -> Result<Self, String> {
        let tasks: Vec<Task> =
            serde_json::from_str(tasks_json).map_err(|e| format!("Invalid tasks: {}", e))?;
        let options: GanttOptions = if options_json.trim().is_empty() {
            GanttOptions::default()
        } else {
            serde_json::from_str(options_json).map_err(|e| format!("Invalid options: {}", e))?
        };
        let gantt = Gantt::new(mount, &tasks, options)
            .map_err(|e| format!("Configuration error: {}", e))?;
        Ok(Self {
            gantt,
            renderer: SvgRenderer::default(),
        })
    }

    fn svg(&self) -> Result<String, String> {
        self.renderer
            .render(&self.gantt)
            .map_err(|e| format!("Render error: {}", e))
    }

    fn view_mode_events(&mut self, mode: &str) -> Result<String, String> {
        let events = self
            .gantt
            .change_view_mode(mode)
            .map_err(|e| format!("Configuration error: {}", e))?;
        events_json(&events)
    }

    fn refresh_events(&mut self, tasks_json: &str) -> Result<String, String> {
        let tasks: Vec<Task> =
            serde_json::from_str(tasks_json).map_err(|e| format!("Invalid tasks: {}", e))?;
        let events = self.gantt.refresh(&tasks);
        events_json(&events)
    }

    fn popup_json(&self, task_id: &str) -> Result<String, String> {
        let popup = self
            .gantt
            .popup(task_id)
            .map_err(|e| format!("Popup error: {}", e))?;
        serde_json::to_string(&popup).map_err(|e| format!("Serialization error: {}", e))
    }
}

fn events_json(events: &[GanttEvent]) -> Result<String, String> {
    serde_json::to_string(events).map_err(|e| format!("Serialization error: {}", e))
}
