use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Distance, Polygon, Pt2D};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Pt2D,
    pub radius: Distance,
}

impl Circle {
    pub fn new(center: Pt2D, radius: Distance) -> Circle {
        Circle { center, radius }
    }

    /// Approximates the circle as a regular polygon. None if the radius is too small to produce
    /// distinct points.
    pub fn to_polygon(&self, num_segments: usize) -> Option<Polygon> {
        let num_segments = num_segments.max(3);
        let mut pts = Vec::with_capacity(num_segments + 1);
        for i in 0..num_segments {
            let theta = (i as f64) / (num_segments as f64) * std::f64::consts::TAU;
            let (sin, cos) = theta.sin_cos();
            pts.push(self.center.offset(
                self.radius.inner_meters() * cos,
                self.radius.inner_meters() * sin,
            ));
        }
        pts.push(pts[0]);
        Polygon::new(pts).ok()
    }
}

impl fmt::Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Circle({}, {})", self.center, self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_polygon() {
        let circle = Circle::new(Pt2D::new(10.0, 10.0), Distance::meters(5.0));
        let polygon = circle.to_polygon(16).unwrap();
        assert!(polygon.contains_pt(Pt2D::new(12.0, 11.0)));
        assert!(!polygon.contains_pt(Pt2D::new(16.0, 10.0)));
        let center = polygon.centroid().unwrap();
        assert!(center.approx_eq(circle.center, Distance::meters(0.01)));

        assert!(Circle::new(Pt2D::new(0.0, 0.0), Distance::ZERO)
            .to_polygon(16)
            .is_none());
    }
}
