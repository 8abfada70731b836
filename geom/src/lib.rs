//! Geometry primitives in a planar, meter-based coordinate space. Boolean operations and spatial
//! predicates are delegated to the `geo` crate.

pub use crate::circle::Circle;
pub use crate::distance::Distance;
pub use crate::line::Line;
pub use crate::polygon::Polygon;
pub use crate::polyline::PolyLine;
pub use crate::pt::Pt2D;

mod circle;
mod distance;
mod line;
mod polygon;
mod polyline;
mod pt;

/// About 1cm. Points closer than this are considered the same.
pub const EPSILON_DIST: Distance = Distance::const_meters(0.01);

/// Reduce the precision of an f64. This helps ensure serialization is idempotent (everything is
/// exactly the same before and after saving/loading). Ideally we'd use some kind of proper
/// fixed-precision type instead of f64.
pub(crate) fn trim_f64(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
