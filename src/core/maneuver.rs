//! Turn-by-turn maneuver synthesis
//!
//! Converts the ordered node sequence of a local route into a list of
//! depart / continue / turn instructions. A turn is only announced at an
//! intersection (a node with more than two incident edges) and only when the
//! heading changes by more than [`TURN_THRESHOLD_DEG`]. Everything between
//! two turns is folded into a single `continue` carrying the segment length.

use serde::{Deserialize, Serialize};

use crate::core::geo::{self, Point};
use crate::core::network::Node;

/// Minimum heading change (exclusive) that counts as a turn at an intersection
pub const TURN_THRESHOLD_DEG: f64 = 15.0;

/// Heading changes above this are sharp turns
pub const SHARP_TURN_DEG: f64 = 90.0;

/// Heading changes below this are slight turns
pub const SLIGHT_TURN_DEG: f64 = 22.5;

/// Kind of maneuver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManeuverType {
    Depart,
    Turn,
    Continue,
    Stop,
}

/// Direction qualifier of a maneuver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Modifier {
    Straight,
    Left,
    Right,
    SharpLeft,
    SharpRight,
    SlightLeft,
    SlightRight,
}

impl Modifier {
    /// Classify a signed heading change (positive = clockwise)
    pub fn from_delta(delta: f64) -> Self {
        let magnitude = delta.abs();
        let right = delta > 0.0;
        if magnitude > SHARP_TURN_DEG {
            if right {
                Modifier::SharpRight
            } else {
                Modifier::SharpLeft
            }
        } else if magnitude < SLIGHT_TURN_DEG {
            if right {
                Modifier::SlightRight
            } else {
                Modifier::SlightLeft
            }
        } else if right {
            Modifier::Right
        } else {
            Modifier::Left
        }
    }

    /// Instruction wording, e.g. "sharp right"
    pub fn phrase(&self) -> &'static str {
        match self {
            Modifier::Straight => "straight",
            Modifier::Left => "left",
            Modifier::Right => "right",
            Modifier::SharpLeft => "sharp left",
            Modifier::SharpRight => "sharp right",
            Modifier::SlightLeft => "slight left",
            Modifier::SlightRight => "slight right",
        }
    }

    pub fn is_left(&self) -> bool {
        matches!(
            self,
            Modifier::Left | Modifier::SharpLeft | Modifier::SlightLeft
        )
    }

    pub fn is_right(&self) -> bool {
        matches!(
            self,
            Modifier::Right | Modifier::SharpRight | Modifier::SlightRight
        )
    }
}

/// One instruction step of a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maneuver {
    #[serde(rename = "type")]
    pub kind: ManeuverType,
    pub bearing_before: f64,
    pub bearing_after: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Modifier>,
    pub location: Point,
    /// Segment length in meters; always set on `continue`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    pub instruction: String,
}

/// Decide whether leaving `via` with heading change `delta` is an announced turn
pub fn detect_turn(via: &Node, delta: f64) -> Option<Modifier> {
    if via.degree() > 2 && delta.abs() > TURN_THRESHOLD_DEG {
        Some(Modifier::from_delta(delta))
    } else {
        None
    }
}

fn depart(location: Point, bearing: f64) -> Maneuver {
    Maneuver {
        kind: ManeuverType::Depart,
        bearing_before: bearing,
        bearing_after: bearing,
        modifier: None,
        location,
        distance: None,
        instruction: format!("Start heading {}", geo::cardinal(bearing)),
    }
}

fn proceed(location: Point, bearing_before: f64, bearing_after: f64, distance: f64) -> Maneuver {
    Maneuver {
        kind: ManeuverType::Continue,
        bearing_before,
        bearing_after,
        modifier: Some(Modifier::Straight),
        location,
        distance: Some(distance),
        instruction: format!("Continue for {}", geo::format_distance(distance)),
    }
}

fn turn(location: Point, bearing_before: f64, bearing_after: f64, modifier: Modifier) -> Maneuver {
    Maneuver {
        kind: ManeuverType::Turn,
        bearing_before,
        bearing_after,
        modifier: Some(modifier),
        location,
        distance: None,
        instruction: format!("Take a {} turn", modifier.phrase()),
    }
}

/// Build the maneuver list for an ordered node sequence.
///
/// Routes with fewer than two nodes have no maneuvers.
pub fn synthesize(nodes: &[Node]) -> Vec<Maneuver> {
    let mut maneuvers = Vec::new();
    if nodes.len() < 2 {
        return maneuvers;
    }

    let last_index = nodes.len() - 1;
    let mut previous_bearing = geo::bearing(nodes[0].coordinates, nodes[1].coordinates);
    let mut segment_length = 0.0;

    maneuvers.push(depart(nodes[0].coordinates, previous_bearing));

    for i in 1..nodes.len() {
        let via = &nodes[i - 1];
        let next = &nodes[i];
        let bearing = geo::bearing(via.coordinates, next.coordinates);
        let edge_length = geo::distance(via.coordinates, next.coordinates);

        let turned = if i >= 2 {
            detect_turn(via, geo::bearing_delta(previous_bearing, bearing))
        } else {
            None
        };

        match turned {
            Some(modifier) => {
                maneuvers.push(proceed(via.coordinates, previous_bearing, previous_bearing, segment_length));
                maneuvers.push(turn(via.coordinates, previous_bearing, bearing, modifier));
                // The edge just taken opens the next segment
                segment_length = edge_length;
            }
            None => segment_length += edge_length,
        }

        if i == last_index {
            maneuvers.push(proceed(via.coordinates, previous_bearing, bearing, segment_length));
        }

        previous_bearing = bearing;
    }

    maneuvers
}
