use std::fmt;

use anyhow::{bail, Result};
use geo::{Area, BooleanOps, Centroid, Contains, Intersects};
use serde::{Deserialize, Serialize};

use crate::pt::to_linestring;
use crate::{PolyLine, Pt2D};

/// A simple polygon, possibly with holes. Stored as its `geo` representation, since that's where
/// all of the interesting operations live.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct Polygon {
    exterior: Vec<Pt2D>,
    holes: Vec<Vec<Pt2D>>,
}

impl Polygon {
    /// The ring must be closed (first point equals last) and have at least 3 distinct points.
    pub fn new(ring: Vec<Pt2D>) -> Result<Polygon> {
        Polygon::with_holes(ring, Vec::new())
    }

    pub fn with_holes(exterior: Vec<Pt2D>, holes: Vec<Vec<Pt2D>>) -> Result<Polygon> {
        for ring in std::iter::once(&exterior).chain(holes.iter()) {
            if ring.len() < 4 {
                bail!("Polygon ring needs at least 3 distinct points, got {:?}", ring);
            }
            if ring[0] != ring[ring.len() - 1] {
                bail!("Polygon ring isn't closed: {:?}", ring);
            }
            if ring.windows(2).any(|pair| pair[0].same_as(pair[1])) {
                bail!("Polygon ring has ~dupe adjacent pts: {:?}", ring);
            }
        }
        Ok(Polygon { exterior, holes })
    }

    fn from_geo(polygon: &geo::Polygon<f64>) -> Result<Polygon> {
        let ring = |ls: &geo::LineString<f64>| -> Vec<Pt2D> {
            let mut pts: Vec<Pt2D> = ls.0.iter().map(|c| Pt2D::new(c.x, c.y)).collect();
            // Trimming precision might collapse some points together
            pts.dedup_by(|a, b| a.same_as(*b));
            pts
        };
        Polygon::with_holes(
            ring(polygon.exterior()),
            polygon.interiors().iter().map(ring).collect(),
        )
    }

    pub fn to_geo(&self) -> geo::Polygon<f64> {
        let ring = |pts: &Vec<Pt2D>| to_linestring(pts);
        geo::Polygon::new(ring(&self.exterior), self.holes.iter().map(ring).collect())
    }

    /// The outer ring. First and last point match.
    pub fn points(&self) -> &Vec<Pt2D> {
        &self.exterior
    }

    pub fn area(&self) -> f64 {
        self.to_geo().unsigned_area()
    }

    /// The center of mass. None for degenerate polygons with no area.
    pub fn centroid(&self) -> Option<Pt2D> {
        if self.area() == 0.0 {
            return None;
        }
        let pt = self.to_geo().centroid()?;
        if !pt.x().is_finite() || !pt.y().is_finite() {
            return None;
        }
        Some(Pt2D::new(pt.x(), pt.y()))
    }

    /// Is the point strictly inside the polygon? Points on the boundary don't count.
    pub fn contains_pt(&self, pt: Pt2D) -> bool {
        self.to_geo().contains(&geo::Point::from(pt))
    }

    /// Is the point inside or on the boundary of the polygon?
    pub fn intersects_pt(&self, pt: Pt2D) -> bool {
        self.to_geo().intersects(&geo::Point::from(pt).0)
    }

    pub fn intersects_polyline(&self, pl: &PolyLine) -> bool {
        pl.to_geo().intersects(&self.to_geo())
    }

    /// Merges overlapping polygons. Disjoint pieces of the result are returned separately.
    pub fn union_all(polygons: Vec<Polygon>) -> Vec<Polygon> {
        let mut iter = polygons.into_iter();
        let mut result = match iter.next() {
            Some(first) => geo::MultiPolygon(vec![first.to_geo()]),
            None => return Vec::new(),
        };
        for p in iter {
            result = result.union(&geo::MultiPolygon(vec![p.to_geo()]));
        }
        result
            .0
            .iter()
            .filter_map(|p| Polygon::from_geo(p).ok())
            .collect()
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Polygon with {} holes:", self.holes.len())?;
        for pt in &self.exterior {
            writeln!(f, "  Pt2D::new({}, {}),", pt.x(), pt.y())?;
        }
        Ok(())
    }
}
