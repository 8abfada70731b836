//! Converting between raw OSM tags and a left-to-right list of lanes.

use abstutil::{prettyprint_usize, Tags, Timer};

use crate::{osm, Direction, LaneSpec, LaneType, StreetGraph};

pub use self::encode::update_osm_tags;
pub use self::stats::{LaneStats, LaneWidths};

mod encode;
mod stats;

/// More lanes than this in one street are treated as a tagging mistake.
const MAX_LANES: usize = 20;

/// How many lanes of one kind go each way.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct LaneCounts {
    fwd: usize,
    back: usize,
    both: usize,
}

impl LaneCounts {
    fn from_tags(tags: &Tags, oneway: bool) -> LaneCounts {
        let total = tags.get_usize(osm::LANES).unwrap_or(1).min(MAX_LANES);
        let fwd = tags.get_usize(osm::LANES_FORWARD).unwrap_or(0);
        let back = tags.get_usize(osm::LANES_BACKWARD).unwrap_or(0);

        if fwd.checked_add(back) == Some(total) && total > 0 {
            // An explicit split wins, even on oneways with a contraflow lane
            LaneCounts { fwd, back, both: 0 }
        } else if oneway {
            LaneCounts {
                fwd: total,
                back: 0,
                both: 0,
            }
        } else if total > 1 {
            LaneCounts {
                fwd: total / 2,
                back: total - total / 2,
                both: 0,
            }
        } else {
            LaneCounts {
                fwd: 0,
                back: 0,
                both: total,
            }
        }
    }
}

fn is_oneway(tags: &Tags) -> bool {
    tags.is_any(osm::ONEWAY, &["yes", "true", "1"])
}

/// Roads closed to general traffic but open to buses or taxis.
fn is_dedicated_pt_road(tags: &Tags) -> bool {
    (tags.is(osm::HIGHWAY, "service") || tags.is(osm::ACCESS, "no"))
        && (tags.is(osm::PSV, "yes") || tags.is(osm::BUS, "yes"))
}

/// Derive the lanes of an edge from its tags, ordered left-to-right looking along the stored
/// direction of the edge. Tags describe the original way, so for a reversed edge this is the
/// way's lanes seen from the other end.
pub fn get_lane_specs_ltr(tags: &Tags, reversed: bool) -> Vec<LaneSpec> {
    let lanes = lanes_along_way(tags);
    if reversed {
        reverse_lanes(&lanes)
    } else {
        lanes
    }
}

fn lanes_along_way(tags: &Tags) -> Vec<LaneSpec> {
    let oneway = is_oneway(tags);

    if tags.is_any(osm::HIGHWAY, &osm::PATH_HIGHWAYS) {
        let lane = if tags.is_any(osm::BICYCLE, &["yes", "designated"])
            || tags.is(osm::HIGHWAY, "cycleway")
        {
            LaneSpec::new(
                LaneType::CyclingTrack,
                if oneway { Direction::Fwd } else { Direction::Both },
            )
        } else {
            LaneSpec::new(LaneType::Foot, Direction::Both)
        };
        return vec![lane];
    }

    let counts = LaneCounts::from_tags(tags, oneway);
    let (motorized, pt) = if is_dedicated_pt_road(tags) {
        // Buses need room to pass each other
        (
            LaneCounts::default(),
            LaneCounts {
                fwd: counts.fwd.max(1),
                back: counts.back.max(1),
                both: 0,
            },
        )
    } else {
        (counts, LaneCounts::default())
    };

    let mut left = Vec::new();
    if [osm::CYCLEWAY_LEFT, osm::CYCLEWAY_BOTH, osm::CYCLEWAY]
        .iter()
        .any(|k| tags.is(k, "lane"))
    {
        left.push(LaneSpec::new(LaneType::CyclingLane, Direction::Back));
    }
    let mut right = Vec::new();
    if [osm::CYCLEWAY_RIGHT, osm::CYCLEWAY_BOTH, osm::CYCLEWAY]
        .iter()
        .any(|k| tags.is(k, "lane"))
    {
        right.push(LaneSpec::new(LaneType::CyclingLane, Direction::Fwd));
    }

    let repeat = |lt: LaneType, dir: Direction, n: usize| vec![LaneSpec::new(lt, dir); n];

    let mut backward = repeat(LaneType::Motorized, Direction::Back, motorized.back);
    backward.extend(repeat(LaneType::DedicatedPT, Direction::Back, pt.back));
    let mut both = repeat(LaneType::DedicatedPT, Direction::Both, pt.both);
    both.extend(repeat(LaneType::Motorized, Direction::Both, motorized.both));
    let mut forward = repeat(LaneType::DedicatedPT, Direction::Fwd, pt.fwd);
    forward.extend(repeat(LaneType::Motorized, Direction::Fwd, motorized.fwd));

    // Per-lane overrides. Backward lists are tagged starting from the far side.
    for (key, value) in [
        (osm::BUS_LANES_FORWARD, "designated"),
        (osm::VEHICLE_LANES_FORWARD, "no"),
    ] {
        retype_to_transit(&mut forward, tags.get(key), value, false, Direction::Fwd);
    }
    for (key, value) in [
        (osm::BUS_LANES_BACKWARD, "designated"),
        (osm::VEHICLE_LANES_BACKWARD, "no"),
    ] {
        retype_to_transit(&mut backward, tags.get(key), value, true, Direction::Back);
    }

    let mut result = left;
    result.extend(backward);
    result.extend(both);
    result.extend(forward);
    result.extend(right);
    result
}

/// Split a "|"-separated per-lane value and turn every lane matching `trigger` into a transit
/// lane. Positions past the end of `lanes` are ignored.
fn retype_to_transit(
    lanes: &mut [LaneSpec],
    raw: Option<&String>,
    trigger: &str,
    from_far_side: bool,
    dir: Direction,
) {
    let raw = match raw {
        Some(raw) => raw,
        None => {
            return;
        }
    };
    let mut values: Vec<&str> = raw.split('|').map(|x| x.trim()).collect();
    if from_far_side {
        values.reverse();
    }
    for (lane, value) in lanes.iter_mut().zip(values) {
        if value == trigger {
            *lane = LaneSpec::new(LaneType::DedicatedPT, dir);
        }
    }
}

/// The same lanes, seen from the other end of the edge.
pub fn reverse_lanes(lanes: &[LaneSpec]) -> Vec<LaneSpec> {
    lanes.iter().rev().map(|lane| lane.reversed()).collect()
}

impl StreetGraph {
    /// Derive lanes for every edge from its tags.
    pub fn generate_lanes(&mut self, timer: &mut Timer) {
        timer.start("generate lanes");
        for edge in self.edges.values_mut() {
            edge.lanes = get_lane_specs_ltr(&edge.osm_tags, edge.reversed);
        }
        info!(
            "Generated lanes for {} edges",
            prettyprint_usize(self.edges.len())
        );
        timer.stop("generate lanes");
    }

    /// Write every edge's lanes back into its tags.
    pub fn update_osm_tags(&mut self, timer: &mut Timer) {
        timer.start("update OSM tags from lanes");
        for edge in self.edges.values_mut() {
            update_osm_tags(&edge.lanes, edge.reversed, &mut edge.osm_tags);
        }
        timer.stop("update OSM tags from lanes");
    }
}
