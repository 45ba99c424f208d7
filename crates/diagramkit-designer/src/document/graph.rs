//! Read-only graph queries over the document.

use std::collections::HashSet;

use diagramkit_core::{NodeId, Point, Rect};

use super::Document;
use crate::model::{Edge, Node, RoutingType};

impl Document {
    /// Every edge touching `id`, in document order.
    ///
    /// Served from the node -> edges index, so the cost is proportional to
    /// the node's degree rather than the edge count.
    pub fn edges_for_node(&self, id: &NodeId) -> Vec<&Edge> {
        let Some(edge_ids) = self.node_edges.get(id) else {
            return Vec::new();
        };
        let mut edges: Vec<(usize, &Edge)> = edge_ids
            .iter()
            .filter_map(|edge_id| self.edges.get_full(edge_id))
            .map(|(index, _, edge)| (index, edge))
            .collect();
        edges.sort_by_key(|(index, _)| *index);
        edges.into_iter().map(|(_, edge)| edge).collect()
    }

    /// Edges whose source is `id`.
    pub fn outgoing_edges(&self, id: &NodeId) -> Vec<&Edge> {
        self.edges_for_node(id)
            .into_iter()
            .filter(|e| &e.source_id == id)
            .collect()
    }

    /// Edges whose target is `id`.
    pub fn incoming_edges(&self, id: &NodeId) -> Vec<&Edge> {
        self.edges_for_node(id)
            .into_iter()
            .filter(|e| &e.target_id == id)
            .collect()
    }

    pub fn edges_by_routing(&self, routing: RoutingType) -> Vec<&Edge> {
        self.edges
            .values()
            .filter(|e| e.routing_type == routing)
            .collect()
    }

    /// Topmost node under `point`: highest z-index, later insertion on ties.
    pub fn node_at(&self, point: Point) -> Option<&Node> {
        self.nodes
            .values()
            .enumerate()
            .filter(|(_, n)| n.contains_point(point))
            .max_by_key(|(index, n)| (n.z_index, *index))
            .map(|(_, n)| n)
    }

    /// Nodes lying entirely inside `area`, in document order.
    pub fn nodes_in_rect(&self, area: &Rect) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|n| area.contains_rect(&n.bounds()))
            .collect()
    }

    /// Union of all node bounds, or `None` for an empty document.
    pub fn bounds(&self) -> Option<Rect> {
        self.nodes
            .values()
            .map(Node::bounds)
            .reduce(|acc, r| acc.union(&r))
    }

    /// Finds cycles by depth-first traversal over outgoing edges.
    ///
    /// Each cycle is reported as the node ids from the first repeated node
    /// back to itself, e.g. `[A, B, C, A]`. Roots are visited in document
    /// order and each node is expanded once, so a cycle is reported from
    /// the node where traversal first entered it.
    pub fn detect_cycles(&self) -> Vec<Vec<NodeId>> {
        let mut cycles = Vec::new();
        let mut visited = HashSet::new();
        let mut path = Vec::new();

        for id in self.nodes.keys() {
            if !visited.contains(id) {
                self.visit_for_cycles(id, &mut visited, &mut path, &mut cycles);
            }
        }
        cycles
    }

    fn visit_for_cycles<'a>(
        &'a self,
        id: &'a NodeId,
        visited: &mut HashSet<&'a NodeId>,
        path: &mut Vec<&'a NodeId>,
        cycles: &mut Vec<Vec<NodeId>>,
    ) {
        visited.insert(id);
        path.push(id);

        for edge in self.outgoing_edges(id) {
            let next = &edge.target_id;
            if let Some(start) = path.iter().position(|n| *n == next) {
                let mut cycle: Vec<NodeId> = path[start..].iter().map(|n| (*n).clone()).collect();
                cycle.push(next.clone());
                cycles.push(cycle);
            } else if !visited.contains(next) {
                self.visit_for_cycles(next, visited, path, cycles);
            }
        }

        path.pop();
    }
}
