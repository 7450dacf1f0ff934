//! Local way network: the snapping and shortest-path capability consumed by
//! the routing machine, plus an in-memory implementation.
//!
//! [`GraphNetwork`] loads a small JSON document of nodes and edges. It is a
//! reference adapter: parsing GeoJSON road layers into such a document is the
//! job of an upstream tool.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::path::Path;

use log::debug;
use priority_queue::PriorityQueue;
use rstar::{primitives::GeomWithData, RTree};
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::core::geo::{self, Point};

/// Identifier of a node in the local network
pub type NodeId = u64;

/// Identifier of an edge in the local network
pub type EdgeId = usize;

/// A vertex of the local way network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub coordinates: Point,
    /// Incident edges, in either direction
    pub edges: Vec<EdgeId>,
}

impl Node {
    /// Number of incident edges; greater than 2 means an intersection
    pub fn degree(&self) -> usize {
        self.edges.len()
    }
}

/// Nearest network node to a query point
#[derive(Debug, Clone, PartialEq)]
pub struct Snap {
    pub node: Node,
    /// Great-circle distance from the query point to the node, in meters
    pub distance: f64,
}

/// Shortest path through the local network
#[derive(Debug, Clone, PartialEq)]
pub struct LocalPath {
    pub nodes: Vec<Node>,
    pub geometry: Vec<Point>,
}

/// Capability the routing machine needs from a local way network
pub trait Network: Send + Sync {
    /// Snap an arbitrary point to the closest node
    fn nearest_node(&self, point: Point) -> Result<Snap>;

    /// Shortest path between two nodes; `Error::NoRoute` if they are not connected
    fn shortest_path(&self, from: &Node, to: &Node) -> Result<LocalPath>;
}

/// Serialized form of a way network
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkDocument {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub coordinates: Point,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: NodeId,
    pub to: NodeId,
    /// Only traversable from `from` to `to`
    #[serde(default)]
    pub oneway: bool,
}

/// In-memory way network with R-tree snapping and Dijkstra routing
#[derive(Debug)]
pub struct GraphNetwork {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    /// Outgoing (target, length in millimeters) per node
    adjacency: Vec<Vec<(usize, u64)>>,
    /// Nodes as unit vectors; chord length orders like great-circle distance
    spatial_index: RTree<GeomWithData<[f64; 3], usize>>,
}

/// Position on the unit sphere of a `[lon, lat]` point
fn unit_vector(p: Point) -> [f64; 3] {
    let (lon, lat) = (p[0].to_radians(), p[1].to_radians());
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

impl GraphNetwork {
    /// Build a network from a parsed document
    pub fn from_document(doc: NetworkDocument) -> Result<Self> {
        let mut nodes = Vec::with_capacity(doc.nodes.len());
        let mut index = HashMap::with_capacity(doc.nodes.len());

        for record in doc.nodes {
            if !geo::is_valid_point(record.coordinates) {
                return Err(Error::Config(format!(
                    "node {} has invalid coordinates {:?}",
                    record.id, record.coordinates
                )));
            }
            if index.insert(record.id, nodes.len()).is_some() {
                return Err(Error::Config(format!("duplicate node id {}", record.id)));
            }
            nodes.push(Node {
                id: record.id,
                coordinates: record.coordinates,
                edges: Vec::new(),
            });
        }

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for (edge_id, edge) in doc.edges.iter().enumerate() {
            let lookup = |id: NodeId| {
                index.get(&id).copied().ok_or_else(|| {
                    Error::Config(format!("edge {edge_id} references unknown node {id}"))
                })
            };
            let from = lookup(edge.from)?;
            let to = lookup(edge.to)?;
            if from == to {
                return Err(Error::Config(format!(
                    "edge {edge_id} is a loop on node {}",
                    edge.from
                )));
            }

            let length_mm =
                (geo::distance(nodes[from].coordinates, nodes[to].coordinates) * 1000.0).round() as u64;

            adjacency[from].push((to, length_mm));
            if !edge.oneway {
                adjacency[to].push((from, length_mm));
            }
            nodes[from].edges.push(edge_id);
            nodes[to].edges.push(edge_id);
        }

        let points: Vec<GeomWithData<[f64; 3], usize>> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| GeomWithData::new(unit_vector(n.coordinates), i))
            .collect();

        debug!(
            "Built way network: {} nodes, {} edges",
            nodes.len(),
            doc.edges.len()
        );

        Ok(Self {
            nodes,
            index,
            adjacency,
            spatial_index: RTree::bulk_load(points),
        })
    }

    /// Parse a network from its JSON form
    pub fn from_json_str(json: &str) -> Result<Self> {
        let doc: NetworkDocument = serde_json::from_str(json)?;
        Self::from_document(doc)
    }

    /// Load a network from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Look up a node by id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn slot(&self, node: &Node) -> Result<usize> {
        self.index
            .get(&node.id)
            .copied()
            .ok_or_else(|| Error::InvalidInput(format!("node {} is not part of this network", node.id)))
    }
}

impl Network for GraphNetwork {
    fn nearest_node(&self, point: Point) -> Result<Snap> {
        if !geo::is_valid_point(point) {
            return Err(Error::InvalidInput(format!("invalid coordinates {point:?}")));
        }

        let nearest = self
            .spatial_index
            .nearest_neighbor(&unit_vector(point))
            .ok_or_else(|| Error::InvalidInput("way network has no nodes".to_string()))?;
        let node = &self.nodes[nearest.data];

        Ok(Snap {
            node: node.clone(),
            distance: geo::distance(point, node.coordinates),
        })
    }

    fn shortest_path(&self, from: &Node, to: &Node) -> Result<LocalPath> {
        let start = self.slot(from)?;
        let goal = self.slot(to)?;

        let mut dist = vec![u64::MAX; self.nodes.len()];
        let mut prev: Vec<Option<usize>> = vec![None; self.nodes.len()];
        let mut pq: PriorityQueue<usize, Reverse<u64>> = PriorityQueue::new();

        dist[start] = 0;
        pq.push(start, Reverse(0));

        while let Some((u, Reverse(d))) = pq.pop() {
            if u == goal {
                break;
            }
            for &(v, w) in &self.adjacency[u] {
                let nd = d + w;
                if nd < dist[v] {
                    dist[v] = nd;
                    prev[v] = Some(u);
                    pq.push_increase(v, Reverse(nd));
                }
            }
        }

        if dist[goal] == u64::MAX {
            return Err(Error::NoRoute {
                from: from.id,
                to: to.id,
            });
        }

        let mut slots = vec![goal];
        let mut current = goal;
        while let Some(p) = prev[current] {
            slots.push(p);
            current = p;
        }
        slots.reverse();

        let nodes: Vec<Node> = slots.iter().map(|&i| self.nodes[i].clone()).collect();
        let geometry = nodes.iter().map(|n| n.coordinates).collect();

        Ok(LocalPath { nodes, geometry })
    }
}
