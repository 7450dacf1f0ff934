//! # Butterfly-directions Library
//!
//! Turn-by-turn driving directions between two points that may lie on a
//! private way network (a mine site, a campus, a logistics yard), on public
//! roads, or on both.
//!
//! ## Features
//!
//! - **Local routing**: endpoints near the way network are snapped to it and
//!   routed with a shortest-path search
//! - **Public-road hand-off**: endpoints too far from the network are routed
//!   by the Mapbox Directions API, through a configured entrance
//! - **Maneuver synthesis**: depart / continue / turn instructions derived
//!   from bearings at intersections
//! - **Request coalescing**: an at-most-one-in-flight front for interactive
//!   callers
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use butterfly_directions::{GraphNetwork, RoutingMachine, RoutingOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let network = Arc::new(GraphNetwork::load("site-network.json")?);
//!     let options = RoutingOptions::load("directions.toml")?;
//!     let machine = RoutingMachine::with_mapbox(network, options);
//!
//!     let route = machine
//!         .get_directions([-100.3884, 47.1399], [-100.3749, 47.1333])
//!         .await?;
//!     for step in &route.maneuvers {
//!         println!("{}", step.instruction().unwrap_or_default());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Custom adapters
//!
//! Any way network implementing [`Network`] and any provider implementing
//! [`RemoteDirections`] can be plugged into [`RoutingMachine::new`].

use std::sync::Arc;

// Re-export core types that users might need
pub use crate::core::coalesce::{Delivery, DirectionsCoalescer, Submission};
pub use crate::core::error::{Error, Result};
pub use crate::core::geo::Point;
pub use crate::core::machine::{classify_endpoint, Endpoint, Plan};
pub use crate::core::maneuver::{synthesize, Maneuver, ManeuverType, Modifier};
pub use crate::core::network::{
    EdgeId, EdgeRecord, GraphNetwork, LocalPath, Network, NetworkDocument, Node, NodeId,
    NodeRecord, Snap,
};
pub use crate::core::options::{Entrance, ManeuverTemplate, RemoteApiConfig};
pub use crate::core::remote::{MapboxDirections, Profile, RemoteDirections, RemoteRoute};
pub use crate::core::route::{RouteResult, RouteStep};
pub use crate::core::{RoutingMachine, RoutingOptions};

/// Geometry helpers (bearing, distance, compass names)
pub use crate::core::geo;

// Internal modules
mod core;

/// One-shot directions using the Mapbox provider configured in `options`
///
/// Builds a throwaway [`RoutingMachine`]; keep a machine around instead when
/// serving many requests.
///
/// # Examples
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use butterfly_directions::{GraphNetwork, RoutingOptions};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let network = Arc::new(GraphNetwork::load("site-network.json")?);
/// let route = butterfly_directions::get_directions(
///     network,
///     RoutingOptions::default(),
///     [-100.3884, 47.1399],
///     [-100.3749, 47.1333],
/// )
/// .await?;
/// println!("{} maneuvers", route.maneuvers.len());
/// # Ok(())
/// # }
/// ```
pub async fn get_directions<N: Network>(
    network: Arc<N>,
    options: RoutingOptions,
    a: Point,
    b: Point,
) -> Result<RouteResult> {
    RoutingMachine::with_mapbox(network, options)
        .get_directions(a, b)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_directions_local_only() {
        let network = GraphNetwork::from_json_str(
            r#"{
                "nodes": [
                    {"id": 1, "coordinates": [-100.0, 47.0]},
                    {"id": 2, "coordinates": [-100.001, 47.001]}
                ],
                "edges": [{"from": 1, "to": 2}]
            }"#,
        )
        .unwrap();

        let route = get_directions(
            Arc::new(network),
            RoutingOptions::default(),
            [-100.0, 47.0],
            [-100.001, 47.001],
        )
        .await
        .unwrap();

        assert_eq!(route.geometry, vec![[-100.0, 47.0], [-100.001, 47.001]]);
        assert_eq!(route.maneuvers.len(), 2);
    }
}
