//! Routing machine configuration
//!
//! Options are plain data with defaults applied at construction time, and can
//! be read from a TOML file:
//!
//! ```toml
//! max_snap = 150.0
//!
//! [remote]
//! access_token = "pk.xxx"
//!
//! [[entrances]]
//! coordinates = [-100.3895796068651, 47.14025809259155]
//! enter_maneuver = { instruction = "Check in at the security gate." }
//! exit_maneuver = { instruction = "Check out at the security gate." }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::core::geo::{self, Point};
use crate::core::maneuver::{Maneuver, ManeuverType, Modifier};

/// Default snapping threshold in meters
pub const DEFAULT_MAX_SNAP: f64 = 200.0;

/// Default Mapbox API root
pub const DEFAULT_REMOTE_BASE_URL: &str = "https://api.mapbox.com";

/// Settings handed through to the remote directions adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteApiConfig {
    /// API root, without trailing slash
    pub base_url: String,
    pub access_token: String,
}

impl Default for RemoteApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REMOTE_BASE_URL.to_string(),
            access_token: String::new(),
        }
    }
}

/// Canned instruction shown when crossing an entrance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManeuverTemplate {
    #[serde(rename = "type", default = "default_template_kind")]
    pub kind: ManeuverType,
    #[serde(default)]
    pub modifier: Option<Modifier>,
    pub instruction: String,
}

fn default_template_kind() -> ManeuverType {
    ManeuverType::Stop
}

impl ManeuverTemplate {
    /// A `stop` maneuver with the given text
    pub fn stop(instruction: impl Into<String>) -> Self {
        Self {
            kind: ManeuverType::Stop,
            modifier: None,
            instruction: instruction.into(),
        }
    }

    /// Materialize the template at a location
    pub fn at(&self, location: Point) -> Maneuver {
        Maneuver {
            kind: self.kind,
            bearing_before: 0.0,
            bearing_after: 0.0,
            modifier: self.modifier,
            location,
            distance: None,
            instruction: self.instruction.clone(),
        }
    }
}

/// Transition point between the local way network and public roads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrance {
    pub coordinates: Point,
    pub enter_maneuver: ManeuverTemplate,
    pub exit_maneuver: ManeuverTemplate,
}

/// Configuration of a routing machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingOptions {
    /// Endpoints further than this (meters) from the way network are routed
    /// on public roads, provided an entrance exists
    pub max_snap: f64,

    /// Entrances between local and public networks; only the first is used
    pub entrances: Vec<Entrance>,

    pub remote: RemoteApiConfig,
}

impl Default for RoutingOptions {
    fn default() -> Self {
        Self {
            max_snap: DEFAULT_MAX_SNAP,
            entrances: Vec::new(),
            remote: RemoteApiConfig::default(),
        }
    }
}

impl RoutingOptions {
    /// Parse and validate options from TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let options: RoutingOptions = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Read options from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !self.max_snap.is_finite() || self.max_snap < 0.0 {
            return Err(Error::Config(format!(
                "max_snap must be a non-negative number of meters, got {}",
                self.max_snap
            )));
        }
        for (i, entrance) in self.entrances.iter().enumerate() {
            if !geo::is_valid_point(entrance.coordinates) {
                return Err(Error::Config(format!(
                    "entrance {i} has invalid coordinates {:?}",
                    entrance.coordinates
                )));
            }
        }
        Ok(())
    }

    /// The entrance used for hand-offs: the first configured one
    pub fn active_entrance(&self) -> Option<&Entrance> {
        self.entrances.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let options = RoutingOptions::default();
        assert_eq!(options.max_snap, 200.0);
        assert!(options.entrances.is_empty());
        assert!(options.active_entrance().is_none());
        assert_eq!(options.remote.base_url, "https://api.mapbox.com");
        assert_eq!(options.remote.access_token, "");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let options = RoutingOptions::from_toml_str("").unwrap();
        assert_eq!(options, RoutingOptions::default());
    }

    #[test]
    fn test_full_toml() {
        let options = RoutingOptions::from_toml_str(
            r#"
            max_snap = 150.0

            [remote]
            access_token = "pk.test"

            [[entrances]]
            coordinates = [-100.3895796068651, 47.14025809259155]
            enter_maneuver = { instruction = "Check in at the security gate." }
            exit_maneuver = { type = "stop", instruction = "Check out at the security gate." }

            [[entrances]]
            coordinates = [-100.37, 47.13]
            enter_maneuver = { instruction = "North gate in" }
            exit_maneuver = { instruction = "North gate out" }
            "#,
        )
        .unwrap();

        assert_eq!(options.max_snap, 150.0);
        assert_eq!(options.remote.access_token, "pk.test");
        assert_eq!(options.remote.base_url, DEFAULT_REMOTE_BASE_URL);
        assert_eq!(options.entrances.len(), 2);

        let active = options.active_entrance().unwrap();
        assert_eq!(active.coordinates, [-100.3895796068651, 47.14025809259155]);
        assert_eq!(active.enter_maneuver.kind, ManeuverType::Stop);
        assert_eq!(active.exit_maneuver.instruction, "Check out at the security gate.");
    }

    #[test]
    fn test_rejects_negative_snap() {
        let err = RoutingOptions::from_toml_str("max_snap = -1.0").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_template_materializes_at_location() {
        let template = ManeuverTemplate::stop("Check in at the security gate.");
        let maneuver = template.at([-100.38, 47.14]);
        assert_eq!(maneuver.kind, ManeuverType::Stop);
        assert_eq!(maneuver.location, [-100.38, 47.14]);
        assert_eq!(maneuver.modifier, None);
        assert_eq!(maneuver.instruction, "Check in at the security gate.");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_snap = 75").unwrap();

        let options = RoutingOptions::load(file.path()).unwrap();
        assert_eq!(options.max_snap, 75.0);
    }
}
