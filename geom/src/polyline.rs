use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::pt::to_linestring;
use crate::{Distance, Line, Pt2D, EPSILON_DIST};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolyLine {
    pts: Vec<Pt2D>,
    length: Distance,
}

impl PolyLine {
    /// Fails for fewer than two points or for consecutive points that are (nearly) the same.
    pub fn new(pts: Vec<Pt2D>) -> Result<PolyLine> {
        if pts.len() < 2 {
            bail!("Need at least two points for a PolyLine");
        }
        if pts.windows(2).any(|pair| pair[0].same_as(pair[1])) {
            bail!("PolyLine has ~dupe adjacent pts");
        }

        let length: Distance = pts
            .windows(2)
            .map(|pair| pair[0].dist_to(pair[1]))
            .sum();
        Ok(PolyLine { pts, length })
    }

    pub fn must_new(pts: Vec<Pt2D>) -> PolyLine {
        match PolyLine::new(pts) {
            Ok(pl) => pl,
            Err(err) => panic!("{}", err),
        }
    }

    /// Like new, but first removes consecutive duplicate points.
    pub fn deduping_new(mut pts: Vec<Pt2D>) -> Result<PolyLine> {
        pts.dedup_by(|a, b| a.same_as(*b));
        PolyLine::new(pts)
    }

    pub fn points(&self) -> &Vec<Pt2D> {
        &self.pts
    }

    pub fn into_points(self) -> Vec<Pt2D> {
        self.pts
    }

    pub fn first_pt(&self) -> Pt2D {
        self.pts[0]
    }

    pub fn last_pt(&self) -> Pt2D {
        self.pts[self.pts.len() - 1]
    }

    pub fn length(&self) -> Distance {
        self.length
    }

    pub fn lines(&self) -> impl Iterator<Item = Line> + '_ {
        self.pts
            .windows(2)
            .map(|pair| Line::unchecked_new(pair[0], pair[1]))
    }

    pub fn reversed(&self) -> PolyLine {
        let mut pts = self.pts.clone();
        pts.reverse();
        PolyLine {
            pts,
            length: self.length,
        }
    }

    /// The point on this PolyLine closest to `pt`.
    pub fn project_pt(&self, pt: Pt2D) -> Pt2D {
        let mut best = self.first_pt();
        let mut best_dist = best.dist_to(pt);
        for line in self.lines() {
            let candidate = line.project_pt(pt);
            let dist = candidate.dist_to(pt);
            if dist < best_dist {
                best = candidate;
                best_dist = dist;
            }
        }
        best
    }

    /// Returns the slice of this line between two distances along it.
    pub fn exact_slice(&self, start: Distance, end: Distance) -> Result<PolyLine> {
        if start < Distance::ZERO || end > self.length + EPSILON_DIST || start >= end {
            bail!(
                "Can't get a slice [{}, {}] of a PolyLine with length {}",
                start,
                end,
                self.length
            );
        }

        let mut result: Vec<Pt2D> = Vec::new();
        let mut dist_so_far = Distance::ZERO;

        for line in self.lines() {
            let length = line.length();

            // Does this line contain the first point of the slice?
            if result.is_empty() && dist_so_far + length >= start {
                result.push(line.dist_along(start - dist_so_far));
            }

            // Does this line contain the last point of the slice?
            if dist_so_far + length >= end {
                result.push(line.dist_along(end - dist_so_far));
                return PolyLine::deduping_new(result);
            }

            // If we're in the middle, just collect the endpoint.
            if !result.is_empty() {
                result.push(line.pt2());
            }

            dist_so_far += length;
        }

        // Rounding put `end` just past the last point
        PolyLine::deduping_new(result)
    }

    /// Cut this line everywhere it crosses the boundary of a circle, returning the pieces in
    /// order. A circle in the middle of the line produces 3 pieces: before, inside, and after.
    pub fn split_at_circle(&self, center: Pt2D, radius: Distance) -> Vec<PolyLine> {
        let mut cuts: Vec<Distance> = Vec::new();
        let mut dist_so_far = Distance::ZERO;
        for line in self.lines() {
            for percent in line.circle_crossings(center, radius) {
                cuts.push(dist_so_far + line.length() * percent);
            }
            dist_so_far += line.length();
        }
        cuts.retain(|d| *d > EPSILON_DIST && *d < self.length - EPSILON_DIST);
        cuts.sort();
        cuts.dedup_by(|a, b| (*a - *b).abs() < EPSILON_DIST);

        let mut bounds = vec![Distance::ZERO];
        bounds.extend(cuts);
        bounds.push(self.length);

        bounds
            .windows(2)
            .filter_map(|pair| self.exact_slice(pair[0], pair[1]).ok())
            .collect()
    }

    pub fn to_geo(&self) -> geo::LineString<f64> {
        to_linestring(&self.pts)
    }
}

impl fmt::Display for PolyLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "PolyLine::new(vec![")?;
        for pt in &self.pts {
            writeln!(f, "  Pt2D::new({}, {}),", pt.x(), pt.y())?;
        }
        write!(f, "])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> PolyLine {
        PolyLine::must_new(vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(50.0, 0.0),
            Pt2D::new(50.0, 50.0),
        ])
    }

    #[test]
    fn test_new_rejects_degenerate() {
        assert!(PolyLine::new(vec![Pt2D::new(0.0, 0.0)]).is_err());
        assert!(PolyLine::new(vec![Pt2D::new(0.0, 0.0), Pt2D::new(0.0, 0.0)]).is_err());
        assert!(PolyLine::deduping_new(vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(0.0, 0.0),
            Pt2D::new(1.0, 0.0)
        ])
        .is_ok());
    }

    #[test]
    fn test_reversed_twice() {
        let pl = l_shape();
        assert_eq!(pl.reversed().first_pt(), Pt2D::new(50.0, 50.0));
        assert_eq!(pl.reversed().reversed(), pl);
    }

    #[test]
    fn test_project_pt() {
        let pl = l_shape();
        assert_eq!(pl.project_pt(Pt2D::new(20.0, 5.0)), Pt2D::new(20.0, 0.0));
        assert_eq!(pl.project_pt(Pt2D::new(60.0, 30.0)), Pt2D::new(50.0, 30.0));
        assert_eq!(pl.project_pt(Pt2D::new(70.0, -10.0)), Pt2D::new(50.0, 0.0));
    }

    #[test]
    fn test_exact_slice() {
        let pl = l_shape();
        let slice = pl
            .exact_slice(Distance::meters(40.0), Distance::meters(60.0))
            .unwrap();
        assert_eq!(
            slice.points(),
            &vec![
                Pt2D::new(40.0, 0.0),
                Pt2D::new(50.0, 0.0),
                Pt2D::new(50.0, 10.0)
            ]
        );
        assert_eq!(slice.length(), Distance::meters(20.0));

        // Starting exactly on a vertex doesn't repeat it
        let slice = pl
            .exact_slice(Distance::meters(50.0), Distance::meters(100.0))
            .unwrap();
        assert_eq!(
            slice.points(),
            &vec![Pt2D::new(50.0, 0.0), Pt2D::new(50.0, 50.0)]
        );

        assert!(pl
            .exact_slice(Distance::meters(30.0), Distance::meters(10.0))
            .is_err());
        assert!(pl
            .exact_slice(Distance::meters(30.0), Distance::meters(200.0))
            .is_err());
    }

    #[test]
    fn test_split_at_circle() {
        let pl = l_shape();

        // Around the corner
        let pieces = pl.split_at_circle(Pt2D::new(50.0, 0.0), Distance::meters(1.0));
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].last_pt(), Pt2D::new(49.0, 0.0));
        assert_eq!(pieces[1].points().len(), 3);
        assert_eq!(pieces[2].first_pt(), Pt2D::new(50.0, 1.0));
        let total: Distance = pieces.iter().map(|pl| pl.length()).sum();
        assert_eq!(total, pl.length());

        // Too close to an endpoint, so only 2 pieces
        let pieces = pl.split_at_circle(Pt2D::new(0.5, 0.0), Distance::meters(1.0));
        assert_eq!(pieces.len(), 2);

        // Nowhere near the line
        let pieces = pl.split_at_circle(Pt2D::new(-100.0, -100.0), Distance::meters(1.0));
        assert_eq!(pieces, vec![pl]);
    }
}
