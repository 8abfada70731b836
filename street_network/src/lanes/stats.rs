use std::collections::BTreeMap;

use geom::Distance;

use crate::{Direction, LaneSpec, LaneType};

/// Lane counts per type and direction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LaneStats {
    counts: BTreeMap<(LaneType, Direction), usize>,
}

impl LaneStats {
    pub fn new(lanes: &[LaneSpec]) -> LaneStats {
        let mut counts = BTreeMap::new();
        for lane in lanes {
            *counts.entry((lane.lt, lane.dir)).or_insert(0) += 1;
        }
        LaneStats { counts }
    }

    pub fn count(&self, lt: LaneType, dir: Direction) -> usize {
        self.counts.get(&(lt, dir)).cloned().unwrap_or(0)
    }

    fn count_matching<F: Fn(LaneType) -> bool>(&self, dir: Direction, pred: F) -> usize {
        self.counts
            .iter()
            .filter(|((lt, d), _)| *d == dir && pred(*lt))
            .map(|(_, n)| *n)
            .sum()
    }

    /// Private cars and public transport together
    pub fn motorized(&self, dir: Direction) -> usize {
        self.count_matching(dir, LaneType::is_motorized)
    }

    pub fn private_cars(&self, dir: Direction) -> usize {
        self.count_matching(dir, LaneType::is_private_cars)
    }

    pub fn dedicated_pt(&self, dir: Direction) -> usize {
        self.count_matching(dir, LaneType::is_dedicated_pt)
    }

    pub fn cycling_lanes(&self, dir: Direction) -> usize {
        self.count_matching(dir, LaneType::is_cycling_lane)
    }

    pub fn cycling_tracks(&self, dir: Direction) -> usize {
        self.count_matching(dir, LaneType::is_cycling_track)
    }

    /// Motorized lanes in every direction, including undecided ones.
    pub fn total_motorized(&self) -> usize {
        [
            Direction::Fwd,
            Direction::Back,
            Direction::Both,
            Direction::Tbd,
        ]
        .into_iter()
        .map(|dir| self.motorized(dir))
        .sum()
    }
}

/// How the width of a street is divided up, using default lane widths.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneWidths {
    /// Painted cycling lanes only; separated tracks don't take space from the carriageway
    pub cycling: Distance,
    pub motorized: Distance,
    pub total: Distance,
    /// None for a street without any width
    pub proportion_cycling: Option<f64>,
}

impl LaneWidths {
    pub fn new(lanes: &[LaneSpec]) -> LaneWidths {
        let sum = |pred: &dyn Fn(LaneType) -> bool| -> Distance {
            lanes
                .iter()
                .filter(|lane| pred(lane.lt))
                .map(|lane| lane.default_width())
                .sum()
        };
        let cycling = sum(&LaneType::is_cycling_lane);
        let motorized = sum(&LaneType::is_motorized);
        let total = sum(&|_| true);
        LaneWidths {
            cycling,
            motorized,
            total,
            proportion_cycling: cycling.checked_ratio(total),
        }
    }
}
