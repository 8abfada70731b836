use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{trim_f64, Distance, EPSILON_DIST};

/// This represents world space, NOT LonLat.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pt2D {
    x: f64,
    y: f64,
}

impl Pt2D {
    pub fn new(x: f64, y: f64) -> Pt2D {
        if !x.is_finite() || !y.is_finite() {
            panic!("Bad Pt2D {}, {}", x, y);
        }

        Pt2D {
            x: trim_f64(x),
            y: trim_f64(y),
        }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    pub fn dist_to(self, to: Pt2D) -> Distance {
        Distance::meters(((self.x - to.x).powi(2) + (self.y - to.y).powi(2)).sqrt())
    }

    /// True if the points are within `threshold` of each other.
    pub fn approx_eq(self, other: Pt2D, threshold: Distance) -> bool {
        self.dist_to(other) <= threshold
    }

    /// Two points closer than EPSILON_DIST are treated as the same point.
    pub fn same_as(self, other: Pt2D) -> bool {
        self.dist_to(other) < EPSILON_DIST
    }

    pub fn offset(self, dx: f64, dy: f64) -> Pt2D {
        Pt2D::new(self.x + dx, self.y + dy)
    }

}

pub(crate) fn to_linestring(pts: &[Pt2D]) -> geo::LineString<f64> {
    pts.iter().map(|pt| (pt.x, pt.y)).collect()
}

impl fmt::Display for Pt2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pt2D({0}, {1})", self.x(), self.y())
    }
}

impl From<Pt2D> for geo::Point<f64> {
    fn from(pt: Pt2D) -> Self {
        geo::Point::new(pt.x, pt.y)
    }
}

impl From<geo::Point<f64>> for Pt2D {
    fn from(pt: geo::Point<f64>) -> Self {
        Pt2D::new(pt.x(), pt.y())
    }
}
