use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Distance, Pt2D, EPSILON_DIST};

/// A line segment.
#[derive(PartialEq, Serialize, Deserialize, Clone, Copy, Debug)]
pub struct Line(Pt2D, Pt2D);

impl Line {
    /// None if the points are the same.
    pub fn new(pt1: Pt2D, pt2: Pt2D) -> Option<Line> {
        if pt1.dist_to(pt2) < EPSILON_DIST {
            return None;
        }
        Some(Line(pt1, pt2))
    }

    /// Callers must guarantee the points differ.
    pub(crate) fn unchecked_new(pt1: Pt2D, pt2: Pt2D) -> Line {
        Line(pt1, pt2)
    }

    pub fn pt1(&self) -> Pt2D {
        self.0
    }

    pub fn pt2(&self) -> Pt2D {
        self.1
    }

    pub fn length(&self) -> Distance {
        self.pt1().dist_to(self.pt2())
    }

    /// Interpolates along the line. `dist` is clamped to the line's extent.
    pub fn dist_along(&self, dist: Distance) -> Pt2D {
        let percent = (dist / self.length()).max(0.0).min(1.0);
        self.percent_along(percent)
    }

    pub fn percent_along(&self, percent: f64) -> Pt2D {
        Pt2D::new(
            self.pt1().x() + percent * (self.pt2().x() - self.pt1().x()),
            self.pt1().y() + percent * (self.pt2().y() - self.pt1().y()),
        )
    }

    /// The fraction along the line of the point closest to `pt`, in [0, 1].
    pub fn project_percent(&self, pt: Pt2D) -> f64 {
        let dx = self.pt2().x() - self.pt1().x();
        let dy = self.pt2().y() - self.pt1().y();
        let t = ((pt.x() - self.pt1().x()) * dx + (pt.y() - self.pt1().y()) * dy)
            / (dx * dx + dy * dy);
        t.max(0.0).min(1.0)
    }

    /// The point on this segment closest to `pt`.
    pub fn project_pt(&self, pt: Pt2D) -> Pt2D {
        self.percent_along(self.project_percent(pt))
    }

    /// Where does this segment cross the boundary of a circle? Returns fractions along the line
    /// in increasing order. Tangent touches don't count as crossings.
    pub fn circle_crossings(&self, center: Pt2D, radius: Distance) -> Vec<f64> {
        let dx = self.pt2().x() - self.pt1().x();
        let dy = self.pt2().y() - self.pt1().y();
        let fx = self.pt1().x() - center.x();
        let fy = self.pt1().y() - center.y();

        let a = dx * dx + dy * dy;
        let b = 2.0 * (fx * dx + fy * dy);
        let c = fx * fx + fy * fy - radius.inner_meters().powi(2);
        let discriminant = b * b - 4.0 * a * c;
        if discriminant <= 0.0 {
            return Vec::new();
        }

        let root = discriminant.sqrt();
        vec![(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)]
            .into_iter()
            .filter(|t| (0.0..=1.0).contains(t))
            .collect()
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Line::new(")?;
        writeln!(f, "  Pt2D::new({}, {}),", self.0.x(), self.0.y())?;
        writeln!(f, "  Pt2D::new({}, {}),", self.1.x(), self.1.y())?;
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection() {
        let l = Line::new(Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 0.0)).unwrap();
        assert_eq!(l.project_pt(Pt2D::new(4.0, 3.0)), Pt2D::new(4.0, 0.0));
        // Clamped to the endpoints
        assert_eq!(l.project_pt(Pt2D::new(-5.0, 1.0)), Pt2D::new(0.0, 0.0));
        assert_eq!(l.project_pt(Pt2D::new(15.0, -1.0)), Pt2D::new(10.0, 0.0));
    }

    #[test]
    fn test_circle_crossings() {
        let l = Line::new(Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 0.0)).unwrap();
        assert_eq!(
            l.circle_crossings(Pt2D::new(5.0, 0.0), Distance::meters(1.0)),
            vec![0.4, 0.6]
        );
        // Tangent
        assert!(l
            .circle_crossings(Pt2D::new(5.0, 1.0), Distance::meters(1.0))
            .is_empty());
        // Only one crossing within the segment
        assert_eq!(
            l.circle_crossings(Pt2D::new(10.0, 0.0), Distance::meters(2.0)),
            vec![0.8]
        );
    }

    #[test]
    fn test_degenerate() {
        assert!(Line::new(Pt2D::new(1.0, 1.0), Pt2D::new(1.0, 1.0)).is_none());
    }
}
