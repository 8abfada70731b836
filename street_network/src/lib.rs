//! A street network as a multigraph: nodes are junctions and dead-ends, edges are street
//! segments carrying a left-to-right list of lanes and their raw OSM tags. The interesting
//! operations are the lane codec in `lanes`, the topology edits in `transform`, and the derived
//! node attributes in `nodes`.

#[macro_use]
extern crate log;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use abstutil::{deserialize_btreemap, serialize_btreemap, Tags};
use geom::{PolyLine, Pt2D};

pub use self::lanes::{get_lane_specs_ltr, reverse_lanes, update_osm_tags, LaneStats, LaneWidths};
pub use self::transform::intersections::IntersectionCluster;
pub use self::transform::{RepairReport, SplitResult};
pub use self::types::{Direction, LaneSpec, LaneType, RepairConfig};

mod lanes;
mod nodes;
pub mod osm;
mod transform;
mod types;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeID(pub usize);

impl fmt::Display for NodeID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Node #{}", self.0)
    }
}

/// Parallel edges between the same endpoints are told apart by `key`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeID {
    pub u: NodeID,
    pub v: NodeID,
    pub key: usize,
}

impl EdgeID {
    pub fn new(u: NodeID, v: NodeID, key: usize) -> EdgeID {
        EdgeID { u, v, key }
    }

    pub fn endpoints(self) -> Vec<NodeID> {
        vec![self.u, self.v]
    }

    pub fn is_loop(self) -> bool {
        self.u == self.v
    }
}

impl fmt::Display for EdgeID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Edge {} -> {} (key {})", self.u.0, self.v.0, self.key)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub pt: Pt2D,
    /// How many edge endpoints touch this node. Derived; see `update_street_count`.
    pub street_count: usize,
    /// The distinct hierarchy labels of all incident edges. Derived; see `add_hierarchies`.
    pub hierarchies: BTreeSet<String>,
    /// True if this node was created by splitting an edge.
    pub split_node: bool,
}

impl Node {
    pub fn new(pt: Pt2D) -> Node {
        Node {
            pt,
            street_count: 0,
            hierarchies: BTreeSet::new(),
            split_node: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Ordered from `u` to `v`. Some edges, like ones imported without shapes, have none.
    pub geometry: Option<PolyLine>,
    /// Left-to-right when looking from `u` to `v`
    pub lanes: Vec<LaneSpec>,
    /// True if the stored direction is opposite to the direction of the original OSM way. The
    /// tags always describe the original way.
    pub reversed: bool,
    pub hierarchy: Option<String>,
    pub osm_tags: Tags,
}

impl Edge {
    pub fn new(osm_tags: Tags, geometry: Option<PolyLine>) -> Edge {
        Edge {
            geometry,
            lanes: Vec::new(),
            reversed: false,
            hierarchy: None,
            osm_tags,
        }
    }

    pub fn lane_stats(&self) -> LaneStats {
        LaneStats::new(&self.lanes)
    }

    pub fn lane_widths(&self) -> LaneWidths {
        LaneWidths::new(&self.lanes)
    }
}

/// Edges sharing an endpoint with some edge, grouped by which endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct AdjacentEdges {
    pub at_u: Vec<EdgeID>,
    pub at_v: Vec<EdgeID>,
    /// The union of the two, without duplicates
    pub all: Vec<EdgeID>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreetGraph {
    /// In a directed graph, (u, v) and (v, u) are different slots. In an undirected one, they're
    /// the same pair.
    pub directed: bool,
    #[serde(
        serialize_with = "serialize_btreemap",
        deserialize_with = "deserialize_btreemap"
    )]
    pub nodes: BTreeMap<NodeID, Node>,
    #[serde(
        serialize_with = "serialize_btreemap",
        deserialize_with = "deserialize_btreemap"
    )]
    pub edges: BTreeMap<EdgeID, Edge>,
    /// Always above every node ID ever used in this graph, even deleted ones
    next_node_id: usize,
}

impl StreetGraph {
    pub fn blank() -> StreetGraph {
        StreetGraph {
            directed: true,
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            next_node_id: 0,
        }
    }

    pub fn blank_undirected() -> StreetGraph {
        StreetGraph {
            directed: false,
            ..StreetGraph::blank()
        }
    }

    pub fn new_node_id(&mut self) -> NodeID {
        let id = NodeID(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Create a node with a fresh ID.
    pub fn add_node(&mut self, pt: Pt2D) -> NodeID {
        let id = self.new_node_id();
        self.nodes.insert(id, Node::new(pt));
        id
    }

    /// Insert a node with an ID chosen by the caller, like one from an input file.
    pub fn insert_node(&mut self, id: NodeID, node: Node) -> Result<()> {
        if self.nodes.contains_key(&id) {
            bail!("{} already exists", id);
        }
        self.next_node_id = self.next_node_id.max(id.0 + 1);
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Add an edge between two existing nodes, picking the next free key for that pair.
    pub fn add_edge(&mut self, u: NodeID, v: NodeID, edge: Edge) -> Result<EdgeID> {
        for n in [u, v] {
            if !self.nodes.contains_key(&n) {
                bail!("Can't add an edge to {}; it doesn't exist", n);
            }
        }
        Ok(self.insert_edge(u, v, edge))
    }

    pub(crate) fn insert_edge(&mut self, u: NodeID, v: NodeID, edge: Edge) -> EdgeID {
        let id = EdgeID::new(u, v, self.new_edge_key(u, v));
        self.edges.insert(id, edge);
        id
    }

    /// The smallest key not used by any edge between this pair of nodes.
    fn new_edge_key(&self, u: NodeID, v: NodeID) -> usize {
        let used: BTreeSet<usize> = self
            .edges
            .keys()
            .filter(|id| {
                (id.u == u && id.v == v) || (!self.directed && id.u == v && id.v == u)
            })
            .map(|id| id.key)
            .collect();
        (0..).find(|key| !used.contains(key)).unwrap_or(0)
    }

    pub fn remove_edge(&mut self, id: EdgeID) -> Option<Edge> {
        self.edges.remove(&id)
    }

    /// Every edge touching this node. Self-loops show up once.
    pub fn edges_per_node(&self, n: NodeID) -> Vec<EdgeID> {
        self.edges
            .keys()
            .filter(|id| id.u == n || id.v == n)
            .cloned()
            .collect()
    }

    pub fn adjacent_edges(&self, id: EdgeID) -> Option<AdjacentEdges> {
        if !self.edges.contains_key(&id) {
            return None;
        }
        let others = |n: NodeID| -> Vec<EdgeID> {
            self.edges_per_node(n)
                .into_iter()
                .filter(|e| *e != id)
                .collect()
        };
        let at_u = others(id.u);
        let at_v = others(id.v);
        let all: BTreeSet<EdgeID> = at_u.iter().chain(at_v.iter()).cloned().collect();
        Some(AdjacentEdges {
            at_u,
            at_v,
            all: all.into_iter().collect(),
        })
    }

    /// The same pair of nodes ordered so the lower ID comes first.
    pub(crate) fn is_canonical(id: EdgeID) -> bool {
        id.u <= id.v
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Nodes at the given points, numbered from 0, connected by the given edges. Edges get a
    /// straight geometry and the tags are parsed from "k=v" pairs.
    pub fn graph(pts: Vec<(f64, f64)>, edges: Vec<(usize, usize, Vec<&str>)>) -> StreetGraph {
        let mut g = StreetGraph::blank();
        for (x, y) in pts {
            g.add_node(Pt2D::new(x, y));
        }
        for (u, v, kv) in edges {
            let (u, v) = (NodeID(u), NodeID(v));
            let geometry = PolyLine::new(vec![g.nodes[&u].pt, g.nodes[&v].pt]).ok();
            g.add_edge(u, v, Edge::new(tags(kv), geometry)).unwrap();
        }
        g
    }

    pub fn tags(kv: Vec<&str>) -> Tags {
        kv.into_iter()
            .map(|pair| {
                let parts = pair.split('=').collect::<Vec<_>>();
                (parts[0], parts[1])
            })
            .collect()
    }

    #[test]
    fn edge_keys() {
        let mut g = graph(vec![(0.0, 0.0), (10.0, 0.0)], vec![]);
        let (a, b) = (NodeID(0), NodeID(1));
        let e0 = g.add_edge(a, b, Edge::new(Tags::empty(), None)).unwrap();
        let e1 = g.add_edge(a, b, Edge::new(Tags::empty(), None)).unwrap();
        let back = g.add_edge(b, a, Edge::new(Tags::empty(), None)).unwrap();
        assert_eq!((e0.key, e1.key, back.key), (0, 1, 0));

        g.remove_edge(e0);
        assert_eq!(g.add_edge(a, b, Edge::new(Tags::empty(), None)).unwrap().key, 0);

        let mut g = StreetGraph::blank_undirected();
        let a = g.add_node(Pt2D::new(0.0, 0.0));
        let b = g.add_node(Pt2D::new(10.0, 0.0));
        g.add_edge(a, b, Edge::new(Tags::empty(), None)).unwrap();
        assert_eq!(g.add_edge(b, a, Edge::new(Tags::empty(), None)).unwrap().key, 1);

        assert!(g
            .add_edge(a, NodeID(7), Edge::new(Tags::empty(), None))
            .is_err());
    }

    #[test]
    fn node_ids_stay_fresh() {
        let mut g = StreetGraph::blank();
        g.insert_node(NodeID(41), Node::new(Pt2D::new(0.0, 0.0)))
            .unwrap();
        assert!(g
            .insert_node(NodeID(41), Node::new(Pt2D::new(1.0, 0.0)))
            .is_err());
        assert_eq!(g.add_node(Pt2D::new(5.0, 5.0)), NodeID(42));
    }

    #[test]
    fn adjacency() {
        // A star around node 0, plus a parallel edge and a self-loop
        let mut g = graph(
            vec![(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (-10.0, 0.0)],
            vec![(0, 1, vec![]), (0, 2, vec![]), (3, 0, vec![]), (1, 2, vec![])],
        );
        let parallel = g
            .add_edge(NodeID(0), NodeID(1), Edge::new(Tags::empty(), None))
            .unwrap();
        let self_loop = g
            .add_edge(NodeID(1), NodeID(1), Edge::new(Tags::empty(), None))
            .unwrap();
        let id = EdgeID::new(NodeID(0), NodeID(1), 0);

        let adj = g.adjacent_edges(id).unwrap();
        assert_eq!(
            adj.at_u,
            vec![
                parallel,
                EdgeID::new(NodeID(0), NodeID(2), 0),
                EdgeID::new(NodeID(3), NodeID(0), 0),
            ]
        );
        assert_eq!(
            adj.at_v,
            vec![parallel, self_loop, EdgeID::new(NodeID(1), NodeID(2), 0)]
        );
        assert_eq!(adj.all.len(), 5);
        assert!(!adj.all.contains(&id));

        assert!(g
            .adjacent_edges(EdgeID::new(NodeID(2), NodeID(3), 0))
            .is_none());
    }

    #[test]
    fn edge_summaries() {
        let mut edge = Edge::new(tags(vec!["lanes=2", "cycleway=lane"]), None);
        edge.lanes = get_lane_specs_ltr(&edge.osm_tags, false);
        assert_eq!(edge.lane_stats().cycling_lanes(Direction::Fwd), 1);
        assert_eq!(edge.lane_stats().total_motorized(), 2);
        assert_eq!(edge.lane_widths().total, geom::Distance::meters(9.0));
    }

    #[test]
    fn serialization() {
        let g = graph(
            vec![(0.0, 0.0), (10.0, 0.0)],
            vec![(0, 1, vec!["highway=residential"])],
        );
        let copy: StreetGraph = abstutil::from_json(&abstutil::to_json(&g)).unwrap();
        assert_eq!(copy.nodes, g.nodes);
        assert_eq!(copy.edges, g.edges);
    }
}
