use std::collections::{BTreeMap, BTreeSet};

use crate::{NodeID, StreetGraph};

impl StreetGraph {
    /// Collect the hierarchy labels of every edge touching a node.
    pub fn add_hierarchies(&mut self, n: NodeID) {
        let hierarchies: BTreeSet<String> = self
            .edges_per_node(n)
            .into_iter()
            .filter_map(|id| self.edges[&id].hierarchy.clone())
            .collect();
        if let Some(node) = self.nodes.get_mut(&n) {
            node.hierarchies = hierarchies;
        }
    }

    pub fn add_all_hierarchies(&mut self) {
        let ids: Vec<NodeID> = self.nodes.keys().cloned().collect();
        for n in ids {
            self.add_hierarchies(n);
        }
    }

    /// Count edge endpoints at every node. Both ends of a self-loop count.
    pub fn update_street_count(&mut self) {
        let mut counts: BTreeMap<NodeID, usize> = BTreeMap::new();
        for id in self.edges.keys() {
            for n in id.endpoints() {
                *counts.entry(n).or_insert(0) += 1;
            }
        }
        for (id, node) in &mut self.nodes {
            node.street_count = counts.get(id).cloned().unwrap_or(0);
        }
    }
}
