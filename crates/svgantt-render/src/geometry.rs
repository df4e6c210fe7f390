//! Plain pixel geometry shared by bars, arrows and hit-testing

use serde::Serialize;

/// Axis-aligned rectangle in timeline coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn end_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Inclusive on all edges
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.end_x() && y >= self.y && y <= self.bottom()
    }

    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.x && x <= self.end_x()
    }
}

/// Format a list of points as an SVG `points` attribute
pub fn points_attr(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{},{}", x, y))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.end_x(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center_x(), 25.0);
        assert_eq!(r.center_y(), 40.0);
        assert!(r.contains(10.0, 60.0));
        assert!(!r.contains(9.9, 30.0));
    }

    #[test]
    fn points_are_space_separated_pairs() {
        assert_eq!(points_attr(&[(1.0, 2.5), (3.0, 4.0)]), "1,2.5 3,4");
    }
}
