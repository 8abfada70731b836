//! Tag keys read and written by the lane codec.

pub const HIGHWAY: &str = "highway";
pub const ONEWAY: &str = "oneway";
pub const ACCESS: &str = "access";
pub const BICYCLE: &str = "bicycle";
pub const BUS: &str = "bus";
pub const PSV: &str = "psv";

pub const LANES: &str = "lanes";
pub const LANES_FORWARD: &str = "lanes:forward";
pub const LANES_BACKWARD: &str = "lanes:backward";
pub const LANES_BOTH_WAYS: &str = "lanes:both_ways";

pub const BUS_LANES_FORWARD: &str = "bus:lanes:forward";
pub const BUS_LANES_BACKWARD: &str = "bus:lanes:backward";
pub const VEHICLE_LANES_FORWARD: &str = "vehicle:lanes:forward";
pub const VEHICLE_LANES_BACKWARD: &str = "vehicle:lanes:backward";

pub const CYCLEWAY: &str = "cycleway";
pub const CYCLEWAY_LANE: &str = "cycleway:lane";
pub const CYCLEWAY_BOTH: &str = "cycleway:both";
pub const CYCLEWAY_LEFT: &str = "cycleway:left";
pub const CYCLEWAY_LEFT_LANE: &str = "cycleway:left:lane";
pub const CYCLEWAY_RIGHT: &str = "cycleway:right";
pub const CYCLEWAY_RIGHT_LANE: &str = "cycleway:right:lane";

/// Everything the lane encoder owns. Other tags pass through untouched.
pub const LANE_KEYS: [&str; 15] = [
    LANES,
    LANES_FORWARD,
    LANES_BACKWARD,
    LANES_BOTH_WAYS,
    BUS_LANES_FORWARD,
    BUS_LANES_BACKWARD,
    VEHICLE_LANES_FORWARD,
    VEHICLE_LANES_BACKWARD,
    CYCLEWAY,
    CYCLEWAY_LANE,
    CYCLEWAY_BOTH,
    CYCLEWAY_LEFT,
    CYCLEWAY_LEFT_LANE,
    CYCLEWAY_RIGHT,
    CYCLEWAY_RIGHT_LANE,
];

/// Highway types that only carry a single non-motorized lane.
pub const PATH_HIGHWAYS: [&str; 5] = ["footway", "path", "track", "cycleway", "pedestrian"];
