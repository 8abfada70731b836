use anyhow::{bail, Result};

use abstutil::Timer;
use geom::{Distance, PolyLine, Pt2D};

use crate::{reverse_lanes, EdgeID, IntersectionCluster, Node, NodeID, RepairConfig, StreetGraph};

pub mod intersections;

/// Where an edge was cut, and the two edges that replaced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitResult {
    pub node: NodeID,
    /// Touches the original `u`
    pub first: EdgeID,
    /// Touches the original `v`
    pub second: EdgeID,
}

#[derive(Clone, Debug)]
pub struct RepairReport {
    pub clusters: Vec<IntersectionCluster>,
    /// Nodes created by splitting edges that passed through a cluster
    pub split_nodes: Vec<NodeID>,
    /// Edges added to join disconnected pieces of one cluster
    pub connectors: Vec<EdgeID>,
}

impl StreetGraph {
    /// Flip the stored direction of an edge. Lanes and geometry are reversed and the `reversed`
    /// flag toggles, so the tags still describe the same street. Returns the new ID, or None if
    /// the edge doesn't exist.
    pub fn reverse_edge(&mut self, id: EdgeID) -> Option<EdgeID> {
        let mut edge = self.edges.remove(&id)?;
        edge.lanes = reverse_lanes(&edge.lanes);
        edge.geometry = edge.geometry.map(|pl| pl.reversed());
        edge.reversed = !edge.reversed;

        let new_id = if self.directed {
            EdgeID::new(id.v, id.u, self.new_edge_key(id.v, id.u))
        } else {
            // Same pair of nodes, so the key stays free
            EdgeID::new(id.v, id.u, id.key)
        };
        self.edges.insert(new_id, edge);
        Some(new_id)
    }

    /// Cut an edge in two near `split_pt`, with a new node between the halves. The point is first
    /// snapped onto the edge, and a little bit of geometry on either side of it (the
    /// `clearance`) is replaced by a straight line to the new node. Fails without changing
    /// anything if the edge doesn't exist or the point is too close to either end.
    ///
    /// Both new edges keep the lanes, tags and hierarchy of the original. The new node has the
    /// highest ID in the graph, so the second half is stored reversed to keep the lower ID first.
    pub fn split_edge(
        &mut self,
        id: EdgeID,
        split_pt: Pt2D,
        clearance: Distance,
    ) -> Result<SplitResult> {
        let edge = match self.edges.get(&id) {
            Some(edge) => edge,
            None => bail!("Can't split {}; it doesn't exist", id),
        };
        let mut first = edge.clone();
        let mut second = edge.clone();

        let node_pt = if let Some(ref pl) = edge.geometry {
            let snapped = pl.project_pt(split_pt);
            let pieces = pl.split_at_circle(snapped, clearance);
            if pieces.len() != 3 {
                bail!(
                    "Can't split {} at {}; cutting a circle there produces {} pieces",
                    id,
                    snapped,
                    pieces.len()
                );
            }
            let mut pts1 = pieces[0].clone().into_points();
            pts1.push(snapped);
            let mut pts2 = vec![snapped];
            pts2.extend(pieces[2].clone().into_points());
            first.geometry = Some(PolyLine::deduping_new(pts1)?);
            second.geometry = Some(PolyLine::deduping_new(pts2)?);
            snapped
        } else {
            split_pt
        };

        let node = self.new_node_id();
        self.nodes.insert(
            node,
            Node {
                split_node: true,
                ..Node::new(node_pt)
            },
        );
        self.edges.remove(&id);
        let first = self.insert_edge(id.u, node, first);
        let second = self.insert_edge(node, id.v, second);
        let first = self.canonicalize(first);
        let second = self.canonicalize(second);
        Ok(SplitResult {
            node,
            first,
            second,
        })
    }

    fn canonicalize(&mut self, id: EdgeID) -> EdgeID {
        if StreetGraph::is_canonical(id) {
            return id;
        }
        self.reverse_edge(id).unwrap_or(id)
    }

    /// Reverse every edge stored from a higher node ID to a lower one. Returns how many were
    /// reversed.
    pub fn normalize_edge_directions(&mut self) -> usize {
        let backwards: Vec<EdgeID> = self
            .edges
            .keys()
            .filter(|id| !StreetGraph::is_canonical(**id))
            .cloned()
            .collect();
        for id in &backwards {
            self.reverse_edge(*id);
        }
        backwards.len()
    }

    /// Make junctions that were mapped as several nearby nodes behave like one intersection.
    /// First edges passing straight through a junction without stopping are split there, then
    /// disconnected pieces inside each junction are joined.
    pub fn repair_intersections(&mut self, cfg: &RepairConfig, timer: &mut Timer) -> RepairReport {
        timer.start("repair intersections");

        timer.start("split edges through intersections");
        let (clusters, split_nodes) = self.split_through_edges(cfg, timer);
        timer.stop("split edges through intersections");

        timer.start("connect components in intersections");
        let connectors = self.connect_components_in_intersections(&clusters, timer);
        timer.stop("connect components in intersections");

        timer.note(format!(
            "{} intersections: split {} edges passing through, added {} connectors",
            clusters.len(),
            split_nodes.len(),
            connectors.len()
        ));
        timer.stop("repair intersections");

        RepairReport {
            clusters,
            split_nodes,
            connectors,
        }
    }
}
