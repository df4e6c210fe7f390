//! Timeline grid decoration: background, rows, header band, ticks, today

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;
use svgantt_core::date::{self, TimeUnit};
use svgantt_core::{GanttOptions, GridRow, ViewMode};

use crate::geometry::Rect;
use crate::scale::ViewState;

/// Vertical rule at a tick
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GridTick {
    pub x: f64,
    pub y: f64,
    pub height: f64,
    pub thick: bool,
}

impl GridTick {
    pub fn path(&self) -> String {
        format!("M {} {} v {}", self.x, self.y, self.height)
    }
}

/// Static grid geometry for one layout
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GridLayout {
    pub width: f64,
    pub height: f64,
    pub header: Rect,
    pub rows: Vec<GridRow>,
    pub ticks: Vec<GridTick>,
    pub today: Option<Rect>,
}

impl GridLayout {
    pub fn compute(
        view: &ViewState,
        options: &GanttOptions,
        row_count: usize,
        today: NaiveDateTime,
    ) -> Self {
        let width = view.grid_width();
        let pitch = options.row_pitch();
        let body_height = pitch * row_count as f64;
        let top = options.header_height + options.padding / 2.0;

        let rows = (0..row_count)
            .map(|i| GridRow {
                y: top + i as f64 * pitch,
                width,
                height: pitch,
            })
            .collect();

        Self {
            width,
            height: grid_height(options, row_count),
            header: Rect::new(0.0, 0.0, width, options.header_height + 10.0),
            rows,
            ticks: grid_ticks(view, top, body_height),
            today: today_highlight(view, today, top + body_height),
        }
    }
}

/// Height of the grid: header, top padding and one pitch per row
pub fn grid_height(options: &GanttOptions, row_count: usize) -> f64 {
    options.header_height + options.padding + options.row_pitch() * row_count as f64
}

fn grid_ticks(view: &ViewState, y: f64, height: f64) -> Vec<GridTick> {
    let mut x = 0.0;
    view.ticks
        .iter()
        .map(|&date| {
            let thick = match view.mode {
                ViewMode::Day => date.day() == 1,
                ViewMode::Week => (1..8).contains(&date.day()),
                ViewMode::Month => (date.month0() + 1) % 3 == 0,
                _ => false,
            };
            let tick = GridTick {
                x,
                y,
                height,
                thick,
            };
            x += match view.mode {
                ViewMode::Month => {
                    f64::from(date::days_in_month(date)) * view.column_width / 30.0
                }
                _ => view.column_width,
            };
            tick
        })
        .collect()
}

/// Column highlighting today; Day scale only
fn today_highlight(view: &ViewState, today: NaiveDateTime, height: f64) -> Option<Rect> {
    if view.mode != ViewMode::Day {
        return None;
    }
    let x = date::diff(today, view.start, TimeUnit::Hour) as f64 / view.step * view.column_width;
    Some(Rect::new(x, 0.0, view.column_width, height))
}
