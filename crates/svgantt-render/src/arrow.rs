//! Dependency connectors between bars

use serde::Serialize;
use std::fmt;
use svgantt_core::{GanttOptions, TaskId};

use crate::bar::Bar;

/// Anchor nudge applied while the source anchor crowds the target
const ANCHOR_STEP: f64 = 10.0;

/// One SVG path command. Lowercase variants in SVG terms are the `*By` ones.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum PathCommand {
    MoveTo(f64, f64),
    MoveBy(f64, f64),
    LineTo(f64, f64),
    LineBy(f64, f64),
    HorizontalTo(f64),
    VerticalTo(f64),
    VerticalBy(f64),
    /// Relative quarter arc of radius `r` ending at `(dx, dy)`
    ArcBy {
        r: f64,
        sweep: bool,
        dx: f64,
        dy: f64,
    },
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PathCommand::MoveTo(x, y) => write!(f, "M {} {}", x, y),
            PathCommand::MoveBy(x, y) => write!(f, "m {} {}", x, y),
            PathCommand::LineTo(x, y) => write!(f, "L {} {}", x, y),
            PathCommand::LineBy(x, y) => write!(f, "l {} {}", x, y),
            PathCommand::HorizontalTo(x) => write!(f, "H {}", x),
            PathCommand::VerticalTo(y) => write!(f, "V {}", y),
            PathCommand::VerticalBy(y) => write!(f, "v {}", y),
            PathCommand::ArcBy { r, sweep, dx, dy } => {
                write!(f, "a {} {} 0 0 {} {} {}", r, r, u8::from(sweep), dx, dy)
            }
        }
    }
}

/// Connector from a dependency bar to its dependent
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Arrow {
    pub from: TaskId,
    pub to: TaskId,
    pub path: Vec<PathCommand>,
}

impl Arrow {
    pub fn new(from: &Bar, to: &Bar, options: &GanttOptions) -> Self {
        Self {
            from: from.task_id.clone(),
            to: to.task_id.clone(),
            path: route(from, to, options),
        }
    }

    /// Recompute the path after either endpoint moved
    pub fn update(&mut self, from: &Bar, to: &Bar, options: &GanttOptions) {
        self.path = route(from, to, options);
    }

    pub fn touches(&self, id: &str) -> bool {
        self.from == id || self.to == id
    }

    /// Path data for the `d` attribute
    pub fn d(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Route between the actual bars of `from` and `to`.
///
/// The direct template drops from the source anchor and curves into the
/// target's left edge. When the target starts before the source (within one
/// padding), the path wraps around: down, left past the target, then in.
pub fn route(from: &Bar, to: &Bar, options: &GanttOptions) -> Vec<PathCommand> {
    let padding = options.padding;
    let curve = options.arrow_curve;
    let source = from.actual;
    let target = to.actual;

    let mut start_x = source.center_x();
    while target.x < start_x + padding && start_x > source.x + padding {
        start_x -= ANCHOR_STEP;
    }

    let start_y = source.bottom();
    let end_x = target.x - padding / 2.0;
    let end_y = target.center_y();

    let from_below = from.index > to.index;
    let clockwise = from_below;
    let curve_y = if from_below { -curve } else { curve };

    let arrowhead = [
        PathCommand::LineTo(end_x, end_y),
        PathCommand::MoveBy(-5.0, -5.0),
        PathCommand::LineBy(5.0, 5.0),
        PathCommand::LineBy(-5.0, 5.0),
    ];

    let mut path = if target.x < source.x + padding {
        let down1 = padding / 2.0 - curve;
        let down2 = target.center_y() - curve_y;
        let left = target.x - padding;
        vec![
            PathCommand::MoveTo(start_x, start_y),
            PathCommand::VerticalBy(down1),
            PathCommand::ArcBy {
                r: curve,
                sweep: true,
                dx: -curve,
                dy: curve,
            },
            PathCommand::HorizontalTo(left),
            PathCommand::ArcBy {
                r: curve,
                sweep: clockwise,
                dx: -curve,
                dy: curve_y,
            },
            PathCommand::VerticalTo(down2),
            PathCommand::ArcBy {
                r: curve,
                sweep: clockwise,
                dx: curve,
                dy: curve_y,
            },
        ]
    } else {
        let offset = if from_below { end_y + curve } else { end_y - curve };
        vec![
            PathCommand::MoveTo(start_x, start_y),
            PathCommand::VerticalTo(offset),
            PathCommand::ArcBy {
                r: curve,
                sweep: clockwise,
                dx: curve,
                dy: curve_y,
            },
        ]
    };
    path.extend(arrowhead);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use pretty_assertions::assert_eq;
    use svgantt_core::TaskStyle;

    fn bar(id: &str, index: usize, x: f64, width: f64) -> Bar {
        let options = GanttOptions::default();
        let y = options.header_height + options.padding + index as f64 * options.row_pitch();
        let actual = Rect::new(x, y + options.bar_height, width, options.bar_height);
        Bar {
            task_id: id.into(),
            index,
            invalid: false,
            has_planned: false,
            progress: 0.0,
            actual,
            planned: Rect::new(x, y, width, options.bar_height),
            progress_bar: Rect { width: 0.0, ..actual },
            corner_radius: 3.0,
            label: crate::bar::BarLabel {
                text: String::new(),
                x: 0.0,
                y: 0.0,
                big: false,
            },
            handles: None,
            planned_handles: None,
            progress_handle: None,
            style: TaskStyle::default(),
        }
    }

    #[test]
    fn direct_route_downwards() {
        let options = GanttOptions::default();
        let from = bar("a", 0, 100.0, 76.0);
        let to = bar("b", 1, 200.0, 76.0);
        let arrow = Arrow::new(&from, &to, &options);

        // from bottom = 68 + 20 + 20 = 108; to middle = 126 + 20 + 10 = 156
        assert_eq!(
            arrow.d(),
            "M 138 108 V 151 a 5 5 0 0 0 5 5 L 191 156 m -5 -5 l 5 5 l -5 5"
        );
    }

    #[test]
    fn direct_route_upwards_flips_sweep() {
        let options = GanttOptions::default();
        let from = bar("a", 1, 100.0, 76.0);
        let to = bar("b", 0, 200.0, 76.0);
        let path = route(&from, &to, &options);
        assert_eq!(path[1], PathCommand::VerticalTo(98.0 + 5.0));
        assert_eq!(
            path[2],
            PathCommand::ArcBy {
                r: 5.0,
                sweep: true,
                dx: 5.0,
                dy: -5.0
            }
        );
    }

    #[test]
    fn anchor_is_nudged_left_when_crowded() {
        let options = GanttOptions::default();
        let from = bar("a", 0, 100.0, 200.0);
        let to = bar("b", 1, 215.0, 76.0);
        let path = route(&from, &to, &options);
        // centre 200 is pulled back until 215 >= x + 18 or x <= 118
        assert_eq!(path[0], PathCommand::MoveTo(190.0, 108.0));
    }

    #[test]
    fn wrap_around_when_target_starts_first() {
        let options = GanttOptions::default();
        let from = bar("a", 0, 200.0, 76.0);
        let to = bar("b", 1, 100.0, 76.0);
        let path = route(&from, &to, &options);

        assert_eq!(path[1], PathCommand::VerticalBy(4.0));
        assert_eq!(path[3], PathCommand::HorizontalTo(82.0));
        assert_eq!(path[5], PathCommand::VerticalTo(151.0));
        assert_eq!(path.last(), Some(&PathCommand::LineBy(-5.0, 5.0)));
        assert_eq!(path[path.len() - 4], PathCommand::LineTo(91.0, 156.0));
    }

    #[test]
    fn touches_either_end() {
        let options = GanttOptions::default();
        let arrow = Arrow::new(&bar("a", 0, 0.0, 38.0), &bar("b", 1, 100.0, 38.0), &options);
        assert!(arrow.touches("a"));
        assert!(arrow.touches("b"));
        assert!(!arrow.touches("c"));
    }
}
