//! Detail popup content and placement

use serde::Serialize;
use svgantt_core::date::{self, TimeUnit};
use svgantt_core::{GanttOptions, Language, PopupError, ResolvedTask, TaskId};

use crate::bar::Bar;

/// Caller-supplied popup body, evaluated per task
pub type PopupContent = Box<dyn Fn(&ResolvedTask) -> String>;

/// Gap between the bar's right edge and the popup
const POPUP_OFFSET: f64 = 10.0;

const POINTER: &str = r#"<div class="pointer"></div>"#;

/// A popup ready to be placed by the host, in chart coordinates
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PopupView {
    pub task_id: TaskId,
    pub html: String,
    pub x: f64,
    pub y: f64,
}

/// Build the popup for `task`, anchored on its rendered bar.
///
/// Content precedence: the per-task closure, then the `customPopupHtml`
/// option, then a title/subtitle pair built from the task.
pub fn build(
    task: &ResolvedTask,
    bar: Option<&Bar>,
    options: &GanttOptions,
    language: Language,
    custom: Option<&PopupContent>,
) -> Result<PopupView, PopupError> {
    let bar = bar.ok_or_else(|| PopupError::MissingAnchor(task.id.clone()))?;

    let html = match (custom, options.custom_popup_html.as_deref()) {
        (Some(content), _) => format!("{}{}", content(task), POINTER),
        (None, Some(html)) => format!("{}{}", html, POINTER),
        (None, None) => default_html(task, &options.date_format, language),
    };

    let anchor = bar.actual;
    Ok(PopupView {
        task_id: task.id.clone(),
        html,
        x: anchor.x + anchor.width + POPUP_OFFSET,
        y: anchor.y,
    })
}

fn default_html(task: &ResolvedTask, pattern: &str, language: Language) -> String {
    let start = date::format_with(task.actual_start, pattern, language);
    let subtitle = match task.actual_end {
        Some(end) => {
            let end = date::format_with(date::add(end, -1, TimeUnit::Second), pattern, language);
            format!("{} - {}", start, end)
        }
        None => start,
    };
    format!(
        r#"<div class="title">{}</div><div class="subtitle">{}</div>{}"#,
        escape(&task.name),
        escape(&subtitle),
        POINTER
    )
}

/// Minimal HTML escaping for text content
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::ViewState;
    use pretty_assertions::assert_eq;
    use svgantt_core::date::parse;
    use svgantt_core::{Task, TaskResolver, ViewMode};

    fn laid_out(task: Task) -> (ResolvedTask, Bar) {
        let schedule = TaskResolver::new().resolve(&[task]);
        let view = ViewState::compute(ViewMode::Day, &schedule.tasks, parse("2024-01-01").unwrap());
        let bar = Bar::layout(&schedule.tasks[0], &view, &GanttOptions::default()).unwrap();
        (schedule.tasks[0].clone(), bar)
    }

    #[test]
    fn default_popup_shows_name_and_range() {
        let (task, bar) = laid_out(Task::new("a").name("Design <v2>").planned("2024-01-01", "2024-01-03"));
        let popup = build(&task, Some(&bar), &GanttOptions::default(), Language::En, None).unwrap();

        assert_eq!(
            popup.html,
            r#"<div class="title">Design &lt;v2&gt;</div><div class="subtitle">2024-01-01 - 2024-01-03</div><div class="pointer"></div>"#
        );
        assert_eq!(popup.x, bar.actual.end_x() + 10.0);
        assert_eq!(popup.y, bar.actual.y);
    }

    #[test]
    fn closure_wins_over_option() {
        let (task, bar) = laid_out(Task::new("a").planned("2024-01-01", "2024-01-03"));
        let options = GanttOptions {
            custom_popup_html: Some("<b>static</b>".into()),
            ..GanttOptions::default()
        };

        let popup = build(&task, Some(&bar), &options, Language::Ja, None).unwrap();
        assert_eq!(popup.html, r#"<b>static</b><div class="pointer"></div>"#);

        let content: PopupContent = Box::new(|t: &ResolvedTask| format!("<i>{}</i>", t.id));
        let popup = build(&task, Some(&bar), &options, Language::Ja, Some(&content)).unwrap();
        assert_eq!(popup.html, r#"<i>a</i><div class="pointer"></div>"#);
    }

    #[test]
    fn missing_bar_is_an_error() {
        let (task, _) = laid_out(Task::new("a").planned("2024-01-01", "2024-01-03"));
        let err = build(&task, None, &GanttOptions::default(), Language::Ja, None).unwrap_err();
        assert_eq!(err, PopupError::MissingAnchor("a".into()));
    }
}
