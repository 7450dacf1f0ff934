//! Route result types shared by local, remote, and stitched routes

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::geo::Point;
use crate::core::maneuver::{Maneuver, ManeuverType};

/// One entry of a route's maneuver list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteStep {
    /// Synthesized from the local way network, or an entrance template
    Local(Maneuver),
    /// Maneuver object as returned by the remote provider
    Provider(Value),
}

impl RouteStep {
    /// Display text of the step
    pub fn instruction(&self) -> Option<&str> {
        match self {
            RouteStep::Local(m) => Some(m.instruction.as_str()),
            RouteStep::Provider(v) => v.get("instruction").and_then(Value::as_str),
        }
    }

    /// Maneuver type as a lowercase string ("depart", "turn", ...)
    pub fn kind(&self) -> Option<&str> {
        match self {
            RouteStep::Local(m) => Some(match m.kind {
                ManeuverType::Depart => "depart",
                ManeuverType::Turn => "turn",
                ManeuverType::Continue => "continue",
                ManeuverType::Stop => "stop",
            }),
            RouteStep::Provider(v) => v.get("type").and_then(Value::as_str),
        }
    }

    /// Direction qualifier as a kebab-case string ("left", "sharp-right", ...)
    pub fn modifier(&self) -> Option<String> {
        match self {
            RouteStep::Local(m) => m
                .modifier
                .and_then(|modifier| serde_json::to_value(modifier).ok())
                .and_then(|v| v.as_str().map(str::to_string)),
            RouteStep::Provider(v) => v.get("modifier").and_then(Value::as_str).map(str::to_string),
        }
    }

    /// The synthesized maneuver, if this step is one
    pub fn as_local(&self) -> Option<&Maneuver> {
        match self {
            RouteStep::Local(m) => Some(m),
            RouteStep::Provider(_) => None,
        }
    }
}

impl From<Maneuver> for RouteStep {
    fn from(maneuver: Maneuver) -> Self {
        RouteStep::Local(maneuver)
    }
}

/// Directions between two points
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Route line as `[lon, lat]` points
    pub geometry: Vec<Point>,
    pub maneuvers: Vec<RouteStep>,
}

impl RouteResult {
    /// GeoJSON `Feature` with a `LineString` geometry and the maneuver list as a property
    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "Feature",
            "properties": {
                "maneuvers": self.maneuvers,
            },
            "geometry": {
                "type": "LineString",
                "coordinates": self.geometry,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::maneuver::Modifier;

    fn local_turn() -> RouteStep {
        RouteStep::Local(Maneuver {
            kind: ManeuverType::Turn,
            bearing_before: 0.0,
            bearing_after: 95.0,
            modifier: Some(Modifier::SharpRight),
            location: [0.0, 0.0],
            distance: None,
            instruction: "Take a sharp right turn".to_string(),
        })
    }

    #[test]
    fn test_step_accessors() {
        let local = local_turn();
        assert_eq!(local.kind(), Some("turn"));
        assert_eq!(local.modifier(), Some("sharp-right".to_string()));
        assert_eq!(local.instruction(), Some("Take a sharp right turn"));
        assert!(local.as_local().is_some());

        let provider = RouteStep::Provider(json!({
            "type": "turn",
            "modifier": "slight left",
            "instruction": "Bear left onto Highway 200"
        }));
        assert_eq!(provider.kind(), Some("turn"));
        assert_eq!(provider.modifier(), Some("slight left".to_string()));
        assert_eq!(provider.instruction(), Some("Bear left onto Highway 200"));
        assert!(provider.as_local().is_none());
    }

    #[test]
    fn test_untagged_serialization() {
        let steps = vec![
            local_turn(),
            RouteStep::Provider(json!({"type": "arrive", "instruction": "Arrived"})),
        ];
        let value = serde_json::to_value(&steps).unwrap();
        assert_eq!(value[0]["type"], "turn");
        assert_eq!(value[0]["modifier"], "sharp-right");
        assert_eq!(value[1], json!({"type": "arrive", "instruction": "Arrived"}));
    }

    #[test]
    fn test_geojson_feature() {
        let route = RouteResult {
            geometry: vec![[-100.0, 47.0], [-100.001, 47.001]],
            maneuvers: vec![local_turn()],
        };
        let feature = route.to_geojson();
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"]["type"], "LineString");
        assert_eq!(feature["geometry"]["coordinates"], json!([[-100.0, 47.0], [-100.001, 47.001]]));
        assert_eq!(feature["properties"]["maneuvers"][0]["instruction"], "Take a sharp right turn");
    }
}
