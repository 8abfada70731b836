use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use petgraph::graphmap::UnGraphMap;
use petgraph::unionfind::UnionFind;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use abstutil::{MultiMap, Tags, Timer};
use geom::{Circle, PolyLine, Polygon, Pt2D};

use crate::{Edge, EdgeID, NodeID, RepairConfig, StreetGraph};

/// One real-world junction, possibly mapped as several nearby nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionCluster {
    /// The union of a circle around every member node
    pub polygon: Polygon,
    /// None if the polygon is degenerate
    pub centroid: Option<Pt2D>,
    pub nodes: BTreeSet<NodeID>,
}

struct NodeEntry {
    pt: [f64; 2],
    id: NodeID,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.pt)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.pt[0] - point[0];
        let dy = self.pt[1] - point[1];
        dx * dx + dy * dy
    }
}

impl StreetGraph {
    /// Buffer every node by the merge tolerance and group nodes whose buffers overlap.
    pub fn find_intersection_clusters(&self, cfg: &RepairConfig) -> Vec<IntersectionCluster> {
        let ids: Vec<NodeID> = self.nodes.keys().cloned().collect();
        let index: BTreeMap<NodeID, usize> =
            ids.iter().enumerate().map(|(idx, id)| (*id, idx)).collect();
        let tree = RTree::bulk_load(
            self.nodes
                .iter()
                .map(|(id, node)| NodeEntry {
                    pt: [node.pt.x(), node.pt.y()],
                    id: *id,
                })
                .collect(),
        );

        let reach = 2.0 * cfg.merge_tolerance.inner_meters();
        let mut groups = UnionFind::new(ids.len());
        for (idx, id) in ids.iter().enumerate() {
            let pt = self.nodes[id].pt;
            for nearby in tree.locate_within_distance([pt.x(), pt.y()], reach * reach) {
                groups.union(idx, index[&nearby.id]);
            }
        }
        let mut members: MultiMap<usize, NodeID> = MultiMap::new();
        for (idx, id) in ids.iter().enumerate() {
            members.insert(groups.find(idx), *id);
        }

        let mut clusters = Vec::new();
        for (_, group) in members.consume() {
            let circles: Vec<Polygon> = group
                .iter()
                .filter_map(|id| {
                    Circle::new(self.nodes[id].pt, cfg.merge_tolerance)
                        .to_polygon(cfg.circle_segments)
                })
                .collect();
            // Buffers that only barely overlap might not survive approximation as polygons
            for polygon in Polygon::union_all(circles) {
                let nodes: BTreeSet<NodeID> = group
                    .iter()
                    .filter(|id| polygon.intersects_pt(self.nodes[*id].pt))
                    .cloned()
                    .collect();
                clusters.push(IntersectionCluster {
                    centroid: polygon.centroid(),
                    polygon,
                    nodes,
                });
            }
        }
        clusters
    }

    /// Find edges that pass through an intersection without either end inside it, and split
    /// each one at the point closest to the intersection's center. Returns the clusters and the
    /// new nodes.
    ///
    /// Clusters are handled one at a time, each against the graph left by the previous splits, so
    /// one half of a long edge can still be split at the next intersection it crosses. Splits
    /// that fail, like ones too close to an end of the edge, are skipped with a warning.
    pub fn split_through_edges(
        &mut self,
        cfg: &RepairConfig,
        timer: &mut Timer,
    ) -> (Vec<IntersectionCluster>, Vec<NodeID>) {
        let clusters = self.find_intersection_clusters(cfg);
        info!("Found {} intersection clusters", clusters.len());

        let mut new_nodes = Vec::new();
        for cluster in &clusters {
            let centroid = match cluster.centroid {
                Some(pt) => pt,
                None => {
                    timer.warn(format!(
                        "Intersection around {:?} has no centroid",
                        cluster.nodes
                    ));
                    continue;
                }
            };
            for (id, pt) in self.edges_through(cluster, centroid) {
                match self.split_edge(id, pt, cfg.split_clearance) {
                    Ok(result) => {
                        new_nodes.push(result.node);
                    }
                    Err(err) => {
                        timer.warn(format!("Not splitting {}: {}", id, err));
                    }
                }
            }
        }
        info!(
            "Split {} edges passing through intersections",
            new_nodes.len()
        );
        (clusters, new_nodes)
    }

    /// Edges crossing the cluster with neither end inside it, and where to cut each one.
    fn edges_through(
        &self,
        cluster: &IntersectionCluster,
        centroid: Pt2D,
    ) -> Vec<(EdgeID, Pt2D)> {
        let mut through = Vec::new();
        for (id, edge) in &self.edges {
            let pl = abstutil::skip_fail!(edge.geometry.as_ref());
            if !cluster.polygon.intersects_polyline(pl)
                || cluster.polygon.intersects_pt(pl.first_pt())
                || cluster.polygon.intersects_pt(pl.last_pt())
            {
                continue;
            }
            through.push((*id, pl.project_pt(centroid)));
        }
        through
    }

    /// Within each cluster, find the groups of nodes that aren't connected to each other, and join
    /// the lowest node of every group to the lowest node of every other group with a straight
    /// edge. Dead-ends don't count. Returns the new edges.
    pub fn connect_components_in_intersections(
        &mut self,
        clusters: &[IntersectionCluster],
        timer: &mut Timer,
    ) -> Vec<EdgeID> {
        self.update_street_count();

        let mut members: MultiMap<usize, NodeID> = MultiMap::new();
        for (id, node) in &self.nodes {
            if node.street_count == 1 {
                continue;
            }
            if let Some(idx) = clusters
                .iter()
                .position(|c| c.polygon.contains_pt(node.pt))
            {
                members.insert(idx, *id);
            }
        }

        let mut connectors = Vec::new();
        for (idx, nodes) in members.consume() {
            if nodes.len() < 2 {
                continue;
            }
            let components = self.components_among(&nodes);
            if components.len() < 2 {
                continue;
            }
            let representatives: BTreeSet<NodeID> = components
                .iter()
                .filter_map(|component| component.iter().min().cloned())
                .collect();
            debug!(
                "Cluster {} has {} disconnected pieces",
                idx,
                representatives.len()
            );
            for (u, v) in representatives.iter().cloned().tuple_combinations() {
                let geometry = PolyLine::new(vec![self.nodes[&u].pt, self.nodes[&v].pt]).ok();
                connectors.push(self.insert_edge(u, v, Edge::new(Tags::empty(), geometry)));
            }
        }
        if !connectors.is_empty() {
            timer.note(format!(
                "Added {} edges to connect pieces of intersections",
                connectors.len()
            ));
        }
        connectors
    }

    /// Connected components of the subgraph induced by some nodes, ignoring edge direction.
    fn components_among(&self, nodes: &BTreeSet<NodeID>) -> Vec<Vec<NodeID>> {
        let mut graph: UnGraphMap<NodeID, ()> = UnGraphMap::new();
        for n in nodes {
            graph.add_node(*n);
        }
        for id in self.edges.keys() {
            if nodes.contains(&id.u) && nodes.contains(&id.v) && !id.is_loop() {
                graph.add_edge(id.u, id.v, ());
            }
        }
        petgraph::algo::kosaraju_scc(&graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::graph;
    use geom::Distance;

    fn cfg() -> RepairConfig {
        RepairConfig {
            merge_tolerance: Distance::meters(5.0),
            ..Default::default()
        }
    }

    fn ids(raw: Vec<usize>) -> BTreeSet<NodeID> {
        raw.into_iter().map(NodeID).collect()
    }

    #[test]
    fn clusters() {
        let g = graph(
            vec![
                (0.0, 0.0),
                (4.0, 3.0),
                (12.0, 3.0),
                (100.0, 100.0),
                (100.0, 109.9),
            ],
            vec![],
        );
        let clusters = g.find_intersection_clusters(&cfg());
        assert_eq!(
            clusters.iter().map(|c| c.nodes.clone()).collect::<Vec<_>>(),
            vec![ids(vec![0, 1, 2]), ids(vec![3, 4])]
        );
        let centroid = clusters[1].centroid.unwrap();
        assert!(centroid.approx_eq(Pt2D::new(100.0, 104.95), Distance::meters(0.1)));
        assert!(clusters[0].polygon.contains_pt(Pt2D::new(8.0, 3.0)));
        assert!(!clusters[0].polygon.contains_pt(Pt2D::new(20.0, 3.0)));
    }

    #[test]
    fn through_edge_gets_split_and_connected() {
        // A road passes just below the end of two streets
        let mut g = graph(
            vec![
                (0.0, 0.0),
                (100.0, 0.0),
                (50.0, 3.0),
                (50.0, 60.0),
                (70.0, 60.0),
            ],
            vec![
                (0, 1, vec!["highway=primary"]),
                (2, 3, vec!["highway=residential"]),
                (2, 4, vec!["highway=residential"]),
            ],
        );
        let mut timer = Timer::throwaway();
        let report = g.repair_intersections(&cfg(), &mut timer);

        assert_eq!(report.clusters.len(), 5);
        assert_eq!(report.split_nodes, vec![NodeID(5)]);
        let split = &g.nodes[&NodeID(5)];
        assert!(split.split_node);
        assert_eq!(split.pt, Pt2D::new(50.0, 0.0));
        assert!(!g.edges.contains_key(&EdgeID::new(NodeID(0), NodeID(1), 0)));
        for id in [
            EdgeID::new(NodeID(0), NodeID(5), 0),
            EdgeID::new(NodeID(1), NodeID(5), 0),
        ] {
            assert!(g.edges[&id].osm_tags.is("highway", "primary"));
        }

        assert_eq!(report.connectors, vec![EdgeID::new(NodeID(2), NodeID(5), 0)]);
        let connector = &g.edges[&report.connectors[0]];
        assert!(connector.lanes.is_empty());
        assert!(connector.osm_tags.is_empty());
        assert_eq!(
            connector.geometry.as_ref().unwrap().points(),
            &vec![Pt2D::new(50.0, 3.0), Pt2D::new(50.0, 0.0)]
        );
        assert!(timer.warnings().is_empty());

        // Running again finds nothing left to fix
        let edges = g.edges.clone();
        let report = g.repair_intersections(&cfg(), &mut timer);
        assert!(report.split_nodes.is_empty());
        assert!(report.connectors.is_empty());
        assert_eq!(g.edges, edges);
    }

    #[test]
    fn road_through_two_junctions() {
        // One long road passes just below two T-junctions
        let mut g = graph(
            vec![
                (0.0, 0.0),
                (300.0, 0.0),
                (100.0, 3.0),
                (100.0, 60.0),
                (120.0, 60.0),
                (200.0, 3.0),
                (200.0, 60.0),
                (220.0, 60.0),
            ],
            vec![
                (0, 1, vec!["highway=primary"]),
                (2, 3, vec![]),
                (2, 4, vec![]),
                (5, 6, vec![]),
                (5, 7, vec![]),
            ],
        );
        let mut timer = Timer::throwaway();
        let report = g.repair_intersections(&cfg(), &mut timer);
        assert!(timer.warnings().is_empty());

        assert_eq!(report.split_nodes, vec![NodeID(8), NodeID(9)]);
        assert_eq!(g.nodes[&NodeID(8)].pt, Pt2D::new(100.0, 0.0));
        assert_eq!(g.nodes[&NodeID(9)].pt, Pt2D::new(200.0, 0.0));
        let road: Vec<EdgeID> = g
            .edges
            .iter()
            .filter(|(_, e)| e.osm_tags.is("highway", "primary"))
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(
            road,
            vec![
                EdgeID::new(NodeID(0), NodeID(8), 0),
                EdgeID::new(NodeID(1), NodeID(9), 0),
                EdgeID::new(NodeID(8), NodeID(9), 0),
            ]
        );

        assert_eq!(
            report.connectors,
            vec![
                EdgeID::new(NodeID(2), NodeID(8), 0),
                EdgeID::new(NodeID(5), NodeID(9), 0),
            ]
        );
    }

    #[test]
    fn connect_components() {
        // Two streets cross without sharing a node. Node 6 is a dead-end inside the junction.
        let mut g = graph(
            vec![
                (0.0, 0.0),
                (50.0, 0.0),
                (100.0, 0.0),
                (51.0, -50.0),
                (51.0, 1.0),
                (51.0, 50.0),
                (48.0, 4.0),
                (48.0, 80.0),
            ],
            vec![
                (0, 1, vec![]),
                (1, 2, vec![]),
                (3, 4, vec![]),
                (4, 5, vec![]),
                (6, 7, vec![]),
            ],
        );
        let mut timer = Timer::throwaway();
        let clusters = g.find_intersection_clusters(&cfg());
        let junction = clusters
            .iter()
            .find(|c| c.nodes.contains(&NodeID(1)))
            .unwrap();
        assert_eq!(junction.nodes, ids(vec![1, 4, 6]));

        let connectors = g.connect_components_in_intersections(&clusters, &mut timer);
        assert_eq!(connectors, vec![EdgeID::new(NodeID(1), NodeID(4), 0)]);
        assert_eq!(g.nodes[&NodeID(6)].street_count, 1);

        // Already connected now
        assert!(g
            .connect_components_in_intersections(&clusters, &mut timer)
            .is_empty());
    }

    #[test]
    fn three_pieces_get_pairwise_connectors() {
        let mut g = graph(
            vec![
                (0.0, 0.0),
                (3.0, 0.0),
                (0.0, 3.0),
                (-50.0, 0.0),
                (50.0, 0.0),
                (0.0, 50.0),
                (-50.0, 1.0),
                (50.0, 1.0),
                (1.0, 50.0),
            ],
            vec![
                (3, 0, vec![]),
                (0, 6, vec![]),
                (1, 4, vec![]),
                (1, 7, vec![]),
                (2, 5, vec![]),
                (2, 8, vec![]),
            ],
        );
        let mut timer = Timer::throwaway();
        let clusters = g.find_intersection_clusters(&cfg());
        let connectors = g.connect_components_in_intersections(&clusters, &mut timer);
        assert_eq!(
            connectors,
            vec![
                EdgeID::new(NodeID(0), NodeID(1), 0),
                EdgeID::new(NodeID(0), NodeID(2), 0),
                EdgeID::new(NodeID(1), NodeID(2), 0),
            ]
        );
    }
}
