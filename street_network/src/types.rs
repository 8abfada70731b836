use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use geom::Distance;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Fwd,
    Back,
    /// Shared by traffic in both directions, like a single-lane residential street
    Both,
    /// Known to exist, but the direction hasn't been decided
    Tbd,
}

impl Direction {
    /// Only directional lanes flip; shared and undecided lanes stay as they are.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Fwd => Direction::Back,
            Direction::Back => Direction::Fwd,
            Direction::Both => Direction::Both,
            Direction::Tbd => Direction::Tbd,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Direction::Fwd => '>',
            Direction::Back => '<',
            Direction::Both => '-',
            Direction::Tbd => '?',
        }
    }

    pub fn from_char(x: char) -> Option<Direction> {
        match x {
            '>' => Some(Direction::Fwd),
            '<' => Some(Direction::Back),
            '-' => Some(Direction::Both),
            '?' => Some(Direction::Tbd),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Fwd => write!(f, "forwards"),
            Direction::Back => write!(f, "backwards"),
            Direction::Both => write!(f, "both ways"),
            Direction::Tbd => write!(f, "undecided"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LaneType {
    /// General traffic
    Motorized,
    /// Only buses, taxis and other public transport
    DedicatedPT,
    /// Painted on the carriageway
    CyclingLane,
    /// Physically separated from motor traffic
    CyclingTrack,
    Foot,
}

impl LaneType {
    /// Private cars and public transport both count as motorized traffic.
    pub fn is_motorized(self) -> bool {
        matches!(self, LaneType::Motorized | LaneType::DedicatedPT)
    }

    pub fn is_private_cars(self) -> bool {
        self == LaneType::Motorized
    }

    pub fn is_dedicated_pt(self) -> bool {
        self == LaneType::DedicatedPT
    }

    pub fn is_dedicated_cycling(self) -> bool {
        matches!(self, LaneType::CyclingLane | LaneType::CyclingTrack)
    }

    pub fn is_cycling_lane(self) -> bool {
        self == LaneType::CyclingLane
    }

    pub fn is_cycling_track(self) -> bool {
        self == LaneType::CyclingTrack
    }

    /// Represents the lane type as a single character, for use in compact lane strings.
    pub fn to_char(self) -> char {
        match self {
            LaneType::Motorized => 'm',
            LaneType::DedicatedPT => 't',
            LaneType::CyclingLane => 'L',
            LaneType::CyclingTrack => 'T',
            LaneType::Foot => 'f',
        }
    }

    /// The inverse of `to_char`.
    pub fn from_char(x: char) -> Option<LaneType> {
        match x {
            'm' => Some(LaneType::Motorized),
            't' => Some(LaneType::DedicatedPT),
            'L' => Some(LaneType::CyclingLane),
            'T' => Some(LaneType::CyclingTrack),
            'f' => Some(LaneType::Foot),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaneSpec {
    pub lt: LaneType,
    pub dir: Direction,
}

impl LaneSpec {
    pub fn new(lt: LaneType, dir: Direction) -> LaneSpec {
        LaneSpec { lt, dir }
    }

    /// The same lane, seen from the other end of the road.
    pub fn reversed(self) -> LaneSpec {
        LaneSpec::new(self.lt, self.dir.opposite())
    }

    /// A rough guess, used when no measured width is available. Shared lanes need room for
    /// passing.
    pub fn default_width(self) -> Distance {
        let shared = self.dir == Direction::Both;
        Distance::meters(match (self.lt, shared) {
            (LaneType::Motorized, false) => 3.0,
            (LaneType::Motorized, true) => 4.5,
            (LaneType::DedicatedPT, false) => 3.5,
            (LaneType::DedicatedPT, true) => 6.0,
            (LaneType::CyclingLane, false) => 1.5,
            (LaneType::CyclingLane, true) => 2.5,
            (LaneType::CyclingTrack, false) => 2.0,
            (LaneType::CyclingTrack, true) => 3.0,
            (LaneType::Foot, _) => 1.8,
        })
    }

    /// Render lanes left-to-right as space-separated tokens, like "m< m< m>".
    pub fn to_tokens(lanes: &[LaneSpec]) -> String {
        lanes
            .iter()
            .map(|lane| lane.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The inverse of `to_tokens`. Blank input is an empty list.
    pub fn from_tokens(raw: &str) -> Result<Vec<LaneSpec>> {
        raw.split_whitespace().map(LaneSpec::from_str).collect()
    }
}

impl fmt::Display for LaneSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.lt.to_char(), self.dir.to_char())
    }
}

impl FromStr for LaneSpec {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<LaneSpec> {
        let chars: Vec<char> = raw.chars().collect();
        if chars.len() != 2 {
            bail!("Lane token {:?} should be a type and a direction", raw);
        }
        match (LaneType::from_char(chars[0]), Direction::from_char(chars[1])) {
            (Some(lt), Some(dir)) => Ok(LaneSpec::new(lt, dir)),
            (None, _) => bail!("Unknown lane type in {:?}", raw),
            (_, None) => bail!("Unknown direction in {:?}", raw),
        }
    }
}

/// Knobs for repairing intersections. All distances are in the graph's meter-based coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Nodes within twice this distance of each other belong to the same intersection.
    pub merge_tolerance: Distance,
    /// When an edge is split, the piece within this distance of the split point is thrown away.
    pub split_clearance: Distance,
    /// How many segments approximate each node's buffer circle.
    pub circle_segments: usize,
}

impl Default for RepairConfig {
    fn default() -> Self {
        RepairConfig {
            merge_tolerance: Distance::meters(10.0),
            split_clearance: Distance::meters(1.0),
            circle_segments: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens() {
        let lanes = LaneSpec::from_tokens("L< m< t- m> T?").unwrap();
        assert_eq!(
            lanes,
            vec![
                LaneSpec::new(LaneType::CyclingLane, Direction::Back),
                LaneSpec::new(LaneType::Motorized, Direction::Back),
                LaneSpec::new(LaneType::DedicatedPT, Direction::Both),
                LaneSpec::new(LaneType::Motorized, Direction::Fwd),
                LaneSpec::new(LaneType::CyclingTrack, Direction::Tbd),
            ]
        );
        assert_eq!(LaneSpec::to_tokens(&lanes), "L< m< t- m> T?");
        assert!(LaneSpec::from_tokens("").unwrap().is_empty());

        for bad in ["x>", "m", "m>>", "m^"] {
            assert!(LaneSpec::from_str(bad).is_err(), "{} should fail", bad);
        }
    }

    #[test]
    fn opposite() {
        for (input, expected) in [
            (Direction::Fwd, Direction::Back),
            (Direction::Back, Direction::Fwd),
            (Direction::Both, Direction::Both),
            (Direction::Tbd, Direction::Tbd),
        ] {
            assert_eq!(input.opposite(), expected);
            assert_eq!(input.opposite().opposite(), input);
        }
    }

    #[test]
    fn categories() {
        assert!(LaneType::DedicatedPT.is_motorized());
        assert!(!LaneType::DedicatedPT.is_private_cars());
        assert!(LaneType::CyclingTrack.is_dedicated_cycling());
        assert!(!LaneType::CyclingTrack.is_cycling_lane());
        assert!(!LaneType::Foot.is_motorized());
    }
}
