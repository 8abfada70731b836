use itertools::Itertools;

use abstutil::Tags;

use crate::{osm, reverse_lanes, Direction, LaneSpec, LaneStats, LaneType};

/// Rewrite the lane-related tags to describe `lanes`. Any previous lane tagging is removed
/// first; unrelated tags are left alone. `reversed` is the flag of the edge the lanes belong to,
/// since tags always describe the original way.
pub fn update_osm_tags(lanes: &[LaneSpec], reversed: bool, tags: &mut Tags) {
    let lanes: Vec<LaneSpec> = if reversed {
        reverse_lanes(lanes)
    } else {
        lanes.to_vec()
    };
    let stats = LaneStats::new(&lanes);

    for key in osm::LANE_KEYS {
        tags.remove(key);
    }

    let total = stats.total_motorized();
    if total > 0 {
        tags.insert(osm::LANES, total.to_string());
    }
    for (key, dir) in [
        (osm::LANES_FORWARD, Direction::Fwd),
        (osm::LANES_BACKWARD, Direction::Back),
        (osm::LANES_BOTH_WAYS, Direction::Both),
    ] {
        let n = stats.motorized(dir);
        if n > 0 {
            tags.insert(key, n.to_string());
        }
    }

    // Per-lane values are positional. Forward lanes are listed left-to-right, backward ones
    // starting from the far side.
    let forward: Vec<LaneType> = lanes
        .iter()
        .filter(|lane| lane.dir == Direction::Fwd && lane.lt.is_motorized())
        .map(|lane| lane.lt)
        .collect();
    let backward: Vec<LaneType> = lanes
        .iter()
        .rev()
        .filter(|lane| lane.dir == Direction::Back && lane.lt.is_motorized())
        .map(|lane| lane.lt)
        .collect();
    for (bus_key, vehicle_key, side) in [
        (osm::BUS_LANES_FORWARD, osm::VEHICLE_LANES_FORWARD, forward),
        (osm::BUS_LANES_BACKWARD, osm::VEHICLE_LANES_BACKWARD, backward),
    ] {
        if !side.iter().any(|lt| lt.is_dedicated_pt()) {
            continue;
        }
        tags.insert(
            bus_key,
            side.iter()
                .map(|lt| {
                    if lt.is_dedicated_pt() {
                        "designated"
                    } else {
                        "permissive"
                    }
                })
                .join("|"),
        );
        tags.insert(
            vehicle_key,
            side.iter()
                .map(|lt| if lt.is_dedicated_pt() { "no" } else { "yes" })
                .join("|"),
        );
    }

    // A side with both a track and a painted lane is tagged as a lane
    write_cycleway(
        tags,
        "track",
        stats.cycling_tracks(Direction::Fwd) > 0,
        stats.cycling_tracks(Direction::Back) > 0,
    );
    write_cycleway(
        tags,
        "lane",
        stats.cycling_lanes(Direction::Fwd) > 0,
        stats.cycling_lanes(Direction::Back) > 0,
    );
}

/// Cycle lanes going forward are on the right, backward ones on the left.
fn write_cycleway(tags: &mut Tags, value: &str, fwd: bool, back: bool) {
    let painted = value == "lane";
    if fwd && back {
        tags.insert(osm::CYCLEWAY, value);
        if painted {
            tags.insert(osm::CYCLEWAY_LANE, "advisory");
        }
    } else if fwd {
        tags.insert(osm::CYCLEWAY_RIGHT, value);
        if painted {
            tags.insert(osm::CYCLEWAY_RIGHT_LANE, "advisory");
        }
    } else if back {
        tags.insert(osm::CYCLEWAY_LEFT, value);
        if painted {
            tags.insert(osm::CYCLEWAY_LEFT_LANE, "advisory");
        }
    }
}
