//! Routing machine: decides where each endpoint is routed and stitches the
//! local and public-road legs together at the entrance.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::core::error::{Error, Result};
use crate::core::geo::{self, Point};
use crate::core::maneuver::{self, Maneuver};
use crate::core::network::{Network, Node, Snap};
use crate::core::options::RoutingOptions;
use crate::core::remote::{MapboxDirections, Profile, RemoteDirections, RemoteRoute};
use crate::core::route::{RouteResult, RouteStep};

/// Where an endpoint is routed from
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    /// On the local way network, at the snapped node
    Onsite(Node),
    /// On public roads, at the raw requested point
    Offsite(Point),
}

/// Classify an endpoint from its snap result.
///
/// An endpoint is offsite only when it is further than `max_snap` meters from
/// the way network *and* an entrance exists to hand off through.
pub fn classify_endpoint(raw: Point, snap: Snap, max_snap: f64, has_entrance: bool) -> Endpoint {
    if snap.distance > max_snap && has_entrance {
        Endpoint::Offsite(raw)
    } else {
        Endpoint::Onsite(snap.node)
    }
}

/// How a request is served
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Both endpoints on the way network
    Local { from: Node, to: Node },
    /// Both endpoints on public roads; the entrance is not involved
    Remote { origin: Point, destination: Point },
    /// Public roads to the entrance, then the way network
    Enter { origin: Point, to: Node },
    /// Way network to the entrance, then public roads
    Exit { from: Node, destination: Point },
}

impl Plan {
    pub fn new(start: Endpoint, end: Endpoint) -> Self {
        match (start, end) {
            (Endpoint::Onsite(from), Endpoint::Onsite(to)) => Plan::Local { from, to },
            (Endpoint::Offsite(origin), Endpoint::Offsite(destination)) => {
                Plan::Remote { origin, destination }
            }
            (Endpoint::Offsite(origin), Endpoint::Onsite(to)) => Plan::Enter { origin, to },
            (Endpoint::Onsite(from), Endpoint::Offsite(destination)) => {
                Plan::Exit { from, destination }
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Plan::Local { .. } => "local",
            Plan::Remote { .. } => "remote",
            Plan::Enter { .. } => "remote then local",
            Plan::Exit { .. } => "local then remote",
        }
    }
}

/// The entrance in use, with its maneuvers placed at its coordinates
#[derive(Debug, Clone)]
struct ActiveEntrance {
    coordinates: Point,
    enter: Maneuver,
    exit: Maneuver,
}

/// Directions across a private way network and public roads.
///
/// Holds no per-request state; one machine serves any number of concurrent
/// [`get_directions`](RoutingMachine::get_directions) calls.
pub struct RoutingMachine<N, R> {
    network: Arc<N>,
    remote: R,
    options: RoutingOptions,
    entrance: Option<ActiveEntrance>,
}

impl<N: Network> RoutingMachine<N, MapboxDirections> {
    /// Machine using the Mapbox Directions API configured in `options.remote`
    pub fn with_mapbox(network: Arc<N>, options: RoutingOptions) -> Self {
        let remote = MapboxDirections::new(options.remote.clone());
        Self::new(network, remote, options)
    }
}

impl<N: Network, R: RemoteDirections> RoutingMachine<N, R> {
    pub fn new(network: Arc<N>, remote: R, options: RoutingOptions) -> Self {
        if options.entrances.len() > 1 {
            warn!(
                "{} entrances configured, only the first one is used",
                options.entrances.len()
            );
        }

        let entrance = options.active_entrance().map(|e| ActiveEntrance {
            coordinates: e.coordinates,
            enter: e.enter_maneuver.at(e.coordinates),
            exit: e.exit_maneuver.at(e.coordinates),
        });

        Self {
            network,
            remote,
            options,
            entrance,
        }
    }

    pub fn options(&self) -> &RoutingOptions {
        &self.options
    }

    pub fn network(&self) -> &Arc<N> {
        &self.network
    }

    /// Snap both points and decide how the request is served
    pub fn plan(&self, a: Point, b: Point) -> Result<Plan> {
        for p in [a, b] {
            if !geo::is_valid_point(p) {
                return Err(Error::InvalidInput(format!("invalid coordinates {p:?}")));
            }
        }

        let snap_a = self.network.nearest_node(a)?;
        let snap_b = self.network.nearest_node(b)?;
        debug!(
            "Snapped start to node {} ({:.1} m), end to node {} ({:.1} m)",
            snap_a.node.id, snap_a.distance, snap_b.node.id, snap_b.distance
        );

        let has_entrance = self.entrance.is_some();
        let start = classify_endpoint(a, snap_a, self.options.max_snap, has_entrance);
        let end = classify_endpoint(b, snap_b, self.options.max_snap, has_entrance);

        Ok(Plan::new(start, end))
    }

    /// Turn-by-turn directions from `a` to `b`.
    ///
    /// At most one remote request and one local shortest-path search are made.
    /// A failure of either fails the whole request.
    pub async fn get_directions(&self, a: Point, b: Point) -> Result<RouteResult> {
        let plan = self.plan(a, b)?;
        info!("Routing {a:?} -> {b:?} ({})", plan.label());

        match plan {
            Plan::Local { from, to } => self.local_route(&from, &to),
            Plan::Remote {
                origin,
                destination,
            } => {
                let remote = self.remote_route(&[origin, destination]).await?;
                Ok(RouteResult {
                    geometry: remote.geometry,
                    maneuvers: remote.maneuvers.into_iter().map(RouteStep::Provider).collect(),
                })
            }
            Plan::Enter { origin, to } => {
                let entrance = self.entrance()?;
                let remote = self.remote_route(&[origin, entrance.coordinates]).await?;
                let gate = self.entrance_node(entrance)?;
                let local = self.local_route(&gate, &to)?;
                Ok(stitch_enter(remote, local, &entrance.enter))
            }
            Plan::Exit { from, destination } => {
                let entrance = self.entrance()?;
                let remote = self.remote_route(&[entrance.coordinates, destination]).await?;
                let gate = self.entrance_node(entrance)?;
                let local = self.local_route(&from, &gate)?;
                Ok(stitch_exit(local, remote, &entrance.exit))
            }
        }
    }

    fn entrance(&self) -> Result<&ActiveEntrance> {
        self.entrance
            .as_ref()
            .ok_or_else(|| Error::InvalidInput("offsite endpoint but no entrance configured".to_string()))
    }

    fn entrance_node(&self, entrance: &ActiveEntrance) -> Result<Node> {
        Ok(self.network.nearest_node(entrance.coordinates)?.node)
    }

    fn local_route(&self, from: &Node, to: &Node) -> Result<RouteResult> {
        let path = self.network.shortest_path(from, to)?;
        let maneuvers = maneuver::synthesize(&path.nodes);
        debug!(
            "Local path {} -> {}: {} nodes, {} maneuvers",
            from.id,
            to.id,
            path.nodes.len(),
            maneuvers.len()
        );

        Ok(RouteResult {
            geometry: path.geometry,
            maneuvers: maneuvers.into_iter().map(RouteStep::Local).collect(),
        })
    }

    async fn remote_route(&self, waypoints: &[Point]) -> Result<RemoteRoute> {
        self.remote
            .route(waypoints, Profile::Driving)
            .await
            .inspect_err(|e| warn!("Remote directions failed: {e}"))
    }
}

/// Public roads into the site: the provider's final step is replaced by the
/// entrance maneuver, and the local depart is dropped.
fn stitch_enter(remote: RemoteRoute, local: RouteResult, enter: &Maneuver) -> RouteResult {
    let mut geometry = remote.geometry;
    geometry.extend(local.geometry);

    let mut provider = remote.maneuvers;
    provider.pop();

    let mut maneuvers: Vec<RouteStep> = provider.into_iter().map(RouteStep::Provider).collect();
    maneuvers.push(RouteStep::Local(enter.clone()));
    maneuvers.extend(local.maneuvers.into_iter().skip(1));

    RouteResult {
        geometry,
        maneuvers,
    }
}

/// Site onto public roads: the exit maneuver sits between both legs.
fn stitch_exit(local: RouteResult, remote: RemoteRoute, exit: &Maneuver) -> RouteResult {
    let mut geometry = local.geometry;
    geometry.extend(remote.geometry);

    let mut maneuvers = local.maneuvers;
    maneuvers.push(RouteStep::Local(exit.clone()));
    maneuvers.extend(remote.maneuvers.into_iter().map(RouteStep::Provider));

    RouteResult {
        geometry,
        maneuvers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::maneuver::ManeuverType;
    use crate::core::options::ManeuverTemplate;
    use serde_json::json;

    fn snap(distance: f64) -> Snap {
        Snap {
            node: Node {
                id: 7,
                coordinates: [-100.0, 47.0],
                edges: vec![0],
            },
            distance,
        }
    }

    #[test]
    fn test_classify_within_threshold_is_onsite() {
        for d in [0.0, 50.0, 199.9, 200.0] {
            for has_entrance in [true, false] {
                let endpoint = classify_endpoint([-100.0, 47.0], snap(d), 200.0, has_entrance);
                assert!(
                    matches!(endpoint, Endpoint::Onsite(ref n) if n.id == 7),
                    "d={d} has_entrance={has_entrance}"
                );
            }
        }
    }

    #[test]
    fn test_classify_beyond_threshold() {
        let raw = [-100.01, 47.01];
        for d in [200.1, 500.0, 10_000.0] {
            assert_eq!(classify_endpoint(raw, snap(d), 200.0, true), Endpoint::Offsite(raw));
            assert!(matches!(
                classify_endpoint(raw, snap(d), 200.0, false),
                Endpoint::Onsite(_)
            ));
        }
    }

    #[test]
    fn test_plan_from_endpoints() {
        let node = snap(0.0).node;
        let p = [-100.01, 47.01];

        assert!(matches!(
            Plan::new(Endpoint::Onsite(node.clone()), Endpoint::Onsite(node.clone())),
            Plan::Local { .. }
        ));
        assert_eq!(
            Plan::new(Endpoint::Offsite(p), Endpoint::Offsite([1.0, 2.0])),
            Plan::Remote {
                origin: p,
                destination: [1.0, 2.0]
            }
        );
        assert!(matches!(
            Plan::new(Endpoint::Offsite(p), Endpoint::Onsite(node.clone())),
            Plan::Enter { origin, .. } if origin == p
        ));
        assert!(matches!(
            Plan::new(Endpoint::Onsite(node), Endpoint::Offsite(p)),
            Plan::Exit { destination, .. } if destination == p
        ));
    }

    fn remote_leg() -> RemoteRoute {
        RemoteRoute {
            geometry: vec![[-100.40, 47.15], [-100.39, 47.14]],
            maneuvers: vec![
                json!({"type": "depart", "instruction": "Head east"}),
                json!({"type": "arrive", "instruction": "You have arrived"}),
            ],
        }
    }

    fn local_leg() -> RouteResult {
        let nodes = vec![
            Node {
                id: 1,
                coordinates: [-100.39, 47.14],
                edges: vec![0],
            },
            Node {
                id: 2,
                coordinates: [-100.38, 47.13],
                edges: vec![0],
            },
        ];
        RouteResult {
            geometry: nodes.iter().map(|n| n.coordinates).collect(),
            maneuvers: maneuver::synthesize(&nodes)
                .into_iter()
                .map(RouteStep::Local)
                .collect(),
        }
    }

    #[test]
    fn test_stitch_enter_replaces_arrival_and_drops_depart() {
        let enter = ManeuverTemplate::stop("Check in at the security gate.").at([-100.39, 47.14]);
        let route = stitch_enter(remote_leg(), local_leg(), &enter);

        assert_eq!(
            route.geometry,
            vec![[-100.40, 47.15], [-100.39, 47.14], [-100.39, 47.14], [-100.38, 47.13]]
        );
        let kinds: Vec<_> = route.maneuvers.iter().map(|m| m.kind()).collect();
        assert_eq!(kinds, vec![Some("depart"), Some("stop"), Some("continue")]);
        assert_eq!(route.maneuvers[1], RouteStep::Local(enter));
    }

    #[test]
    fn test_stitch_exit_inserts_exit_between_legs() {
        let exit = ManeuverTemplate::stop("Check out at the security gate.").at([-100.39, 47.14]);
        let route = stitch_exit(local_leg(), remote_leg(), &exit);

        assert_eq!(route.geometry.first(), Some(&[-100.39, 47.14]));
        assert_eq!(route.geometry.last(), Some(&[-100.39, 47.14]));
        let kinds: Vec<_> = route.maneuvers.iter().map(|m| m.kind()).collect();
        assert_eq!(
            kinds,
            vec![Some("depart"), Some("continue"), Some("stop"), Some("depart"), Some("arrive")]
        );
        assert_eq!(
            route.maneuvers[2].as_local().map(|m| m.kind),
            Some(ManeuverType::Stop)
        );
    }
}
