//! Selection operations. The document owns the selection so that deletes
//! can prune it in the same step; every effective change is announced.

use diagramkit_core::{DiagramResult, EdgeId, NodeId, Rect};

use super::Document;
use crate::selection_manager::SelectionSet;

impl Document {
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    fn announce(&mut self, changed: bool) {
        if changed {
            self.emit_selection();
        }
    }

    pub fn select_node(&mut self, id: &NodeId, additive: bool) -> DiagramResult<()> {
        self.require_node(id)?;
        let changed = self.selection.select_node(id.clone(), additive);
        self.announce(changed);
        Ok(())
    }

    pub fn select_edge(&mut self, id: &EdgeId, additive: bool) -> DiagramResult<()> {
        self.require_edge(id)?;
        let changed = self.selection.select_edge(id.clone(), additive);
        self.announce(changed);
        Ok(())
    }

    pub fn toggle_node_selection(&mut self, id: &NodeId) -> DiagramResult<()> {
        self.require_node(id)?;
        let changed = self.selection.toggle_node(id.clone());
        self.announce(changed);
        Ok(())
    }

    pub fn toggle_edge_selection(&mut self, id: &EdgeId) -> DiagramResult<()> {
        self.require_edge(id)?;
        let changed = self.selection.toggle_edge(id.clone());
        self.announce(changed);
        Ok(())
    }

    pub fn deselect_node(&mut self, id: &NodeId) {
        let changed = self.selection.deselect_node(id);
        self.announce(changed);
    }

    pub fn deselect_edge(&mut self, id: &EdgeId) {
        let changed = self.selection.deselect_edge(id);
        self.announce(changed);
    }

    pub fn clear_selection(&mut self) {
        let changed = self.selection.clear();
        self.announce(changed);
    }

    pub fn select_all(&mut self) {
        let nodes: Vec<NodeId> = self.nodes.keys().cloned().collect();
        let edges: Vec<EdgeId> = self.edges.keys().cloned().collect();
        let changed = self.selection.replace(nodes, edges);
        self.announce(changed);
    }

    /// Marquee selection of nodes fully inside `area`.
    pub fn select_area(&mut self, area: &Rect, additive: bool) {
        let hits: Vec<NodeId> = self
            .nodes_in_rect(area)
            .into_iter()
            .map(|n| n.id.clone())
            .collect();

        let changed = if additive {
            let mut changed = false;
            for id in hits {
                changed |= self.selection.select_node(id, true);
            }
            changed
        } else {
            self.selection.replace(hits, Vec::new())
        };
        self.announce(changed);
    }

    /// Replaces the selection, silently dropping ids that are not live.
    pub fn set_selection(
        &mut self,
        nodes: impl IntoIterator<Item = NodeId>,
        edges: impl IntoIterator<Item = EdgeId>,
    ) {
        let nodes: Vec<NodeId> = nodes
            .into_iter()
            .filter(|id| self.nodes.contains_key(id))
            .collect();
        let edges: Vec<EdgeId> = edges
            .into_iter()
            .filter(|id| self.edges.contains_key(id))
            .collect();
        let changed = self.selection.replace(nodes, edges);
        self.announce(changed);
    }

    /// Selected nodes in document order.
    pub fn selected_node_ids(&self) -> Vec<NodeId> {
        self.nodes
            .keys()
            .filter(|id| self.selection.is_node_selected(id))
            .cloned()
            .collect()
    }

    /// Selected edges in document order.
    pub fn selected_edge_ids(&self) -> Vec<EdgeId> {
        self.edges
            .keys()
            .filter(|id| self.selection.is_edge_selected(id))
            .cloned()
            .collect()
    }
}
