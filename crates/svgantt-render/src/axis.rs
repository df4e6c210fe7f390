//! Date-axis labels

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;
use svgantt_core::date::{self, Language};
use svgantt_core::ViewMode;

use crate::scale::ViewState;

/// Upper (coarse) and lower (fine) label for one tick
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DateLabel {
    pub date: NaiveDateTime,
    pub lower_text: String,
    pub lower_x: f64,
    pub lower_y: f64,
    pub upper_text: String,
    pub upper_x: f64,
    pub upper_y: f64,
}

/// Which calendar components differ from the previous tick
#[derive(Clone, Copy, Debug)]
struct Changed {
    day: bool,
    month: bool,
    year: bool,
}

impl Changed {
    fn between(date: NaiveDateTime, previous: Option<NaiveDateTime>) -> Self {
        match previous {
            // the first tick counts as a change in every component
            None => Self {
                day: true,
                month: true,
                year: true,
            },
            Some(prev) => Self {
                day: date.day() != prev.day(),
                month: date.month() != prev.month(),
                year: date.year() != prev.year(),
            },
        }
    }
}

/// Labels for every tick of the view.
///
/// Empty texts are kept so label `i` always belongs to tick `i`.
pub fn date_labels(view: &ViewState, header_height: f64, language: Language) -> Vec<DateLabel> {
    let mut previous = None;
    view.ticks
        .iter()
        .enumerate()
        .map(|(i, &tick)| {
            let label = date_label(view, tick, previous, i, header_height, language);
            previous = Some(tick);
            label
        })
        .collect()
}

fn date_label(
    view: &ViewState,
    date: NaiveDateTime,
    previous: Option<NaiveDateTime>,
    index: usize,
    header_height: f64,
    language: Language,
) -> DateLabel {
    let changed = Changed::between(date, previous);
    let fmt = |pattern: &str| date::format_with(date, pattern, language);
    let when = |cond: bool, pattern: &str| if cond { fmt(pattern) } else { String::new() };

    let (lower_text, upper_text) = match view.mode {
        ViewMode::QuarterDay => (fmt("HH"), when(changed.day, "D MMM")),
        ViewMode::HalfDay => {
            let upper = if !changed.day {
                String::new()
            } else if changed.month {
                fmt("D MMM")
            } else {
                fmt("D")
            };
            (fmt("HH"), upper)
        }
        ViewMode::Day => (when(changed.day, "D"), when(changed.month, "MMMM")),
        ViewMode::Week => {
            let lower = if changed.month { fmt("D MMM") } else { fmt("D") };
            (lower, when(changed.month, "MMMM"))
        }
        ViewMode::Month => (fmt("MMMM"), when(changed.year, "YYYY")),
        ViewMode::Year => (fmt("YYYY"), when(changed.year, "YYYY")),
    };

    let cw = view.column_width;
    let (lower_offset, upper_offset) = match view.mode {
        ViewMode::QuarterDay => (cw * 4.0 / 2.0, 0.0),
        ViewMode::HalfDay => (cw * 2.0 / 2.0, 0.0),
        ViewMode::Day => (cw / 2.0, cw * 30.0 / 2.0),
        ViewMode::Week => (0.0, cw * 4.0 / 2.0),
        ViewMode::Month => (cw / 2.0, cw * 12.0 / 2.0),
        ViewMode::Year => (cw / 2.0, cw * 30.0 / 2.0),
    };

    let base_x = index as f64 * cw;
    DateLabel {
        date,
        lower_text,
        lower_x: base_x + lower_offset,
        lower_y: header_height,
        upper_text,
        upper_x: base_x + upper_offset,
        upper_y: header_height - 25.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use svgantt_core::date::parse;
    use svgantt_core::{Task, TaskResolver};

    fn view(mode: ViewMode, start: &str, end: &str) -> ViewState {
        let tasks = TaskResolver::new().resolve(&[Task::new("a").planned(start, end)]);
        ViewState::compute(mode, &tasks.tasks, parse("2000-01-01").unwrap())
    }

    #[test]
    fn day_labels_show_month_on_change() {
        let v = view(ViewMode::Day, "2024-01-10", "2024-01-12");
        let labels = date_labels(&v, 50.0, Language::En);

        // window starts 2023-12-10
        assert_eq!(labels[0].lower_text, "10");
        assert_eq!(labels[0].upper_text, "December");
        assert_eq!(labels[1].lower_text, "11");
        assert_eq!(labels[1].upper_text, "");

        let jan = labels
            .iter()
            .position(|l| l.upper_text == "January")
            .unwrap();
        assert_eq!(labels[jan].lower_text, "01");
        assert_eq!(labels[jan].lower_x, jan as f64 * 38.0 + 19.0);
        assert_eq!(labels[jan].upper_x, jan as f64 * 38.0 + 570.0);
        assert_eq!(labels[jan].upper_y, 25.0);
    }

    #[test]
    fn japanese_month_names() {
        let v = view(ViewMode::Month, "2024-01-01", "2024-02-01");
        let labels = date_labels(&v, 50.0, Language::Ja);
        assert_eq!(labels[0].lower_text, "1月");
        assert_eq!(labels[0].upper_text, "2024");
        assert_eq!(labels[1].lower_text, "2月");
        assert_eq!(labels[1].upper_text, "");
        assert_eq!(labels[12].upper_text, "2025");
    }

    #[test]
    fn week_lower_label_includes_month_on_change() {
        let v = view(ViewMode::Week, "2024-01-10", "2024-03-01");
        let labels = date_labels(&v, 50.0, Language::En);
        assert_eq!(labels[0].lower_text, "10 Dec");
        assert_eq!(labels[1].lower_text, "17");
        assert_eq!(labels[0].lower_x, 0.0);
    }

    #[test]
    fn quarter_day_labels_hours() {
        let v = view(ViewMode::QuarterDay, "2024-01-10", "2024-01-11");
        let labels = date_labels(&v, 50.0, Language::En);
        assert_eq!(labels[0].lower_text, "00");
        assert_eq!(labels[0].upper_text, "03 Jan");
        assert_eq!(labels[1].lower_text, "06");
        assert_eq!(labels[1].upper_text, "");
        assert_eq!(labels[4].upper_text, "04 Jan");
        assert_eq!(labels.len(), v.ticks.len());
    }
}
