use std::collections::BTreeSet;

use diagramkit_core::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// The ids of the currently selected nodes and edges.
///
/// `SelectionSet` is plain state: every mutator reports whether it changed
/// anything so the owner can decide whether to announce it. Liveness of the
/// ids is the owner's job; [`crate::document::Document`] only lets live ids
/// in and prunes them in the same operation that deletes the entity.
///
/// # Examples
///
/// ```
/// use diagramkit_designer::selection_manager::SelectionSet;
///
/// let mut selection = SelectionSet::new();
/// assert!(selection.select_node("a".into(), false));
/// assert!(selection.select_node("b".into(), true));
/// assert_eq!(selection.node_count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    nodes: BTreeSet<NodeId>,
    edges: BTreeSet<EdgeId>,
}

/// Sorted copy of a selection, as carried by `selection:changed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a node. Without `additive` the previous selection is dropped.
    pub fn select_node(&mut self, id: NodeId, additive: bool) -> bool {
        if !additive {
            if self.edges.is_empty() && self.nodes.len() == 1 && self.nodes.contains(&id) {
                return false;
            }
            self.nodes.clear();
            self.edges.clear();
            self.nodes.insert(id);
            return true;
        }
        self.nodes.insert(id)
    }

    /// Selects an edge. Without `additive` the previous selection is dropped.
    pub fn select_edge(&mut self, id: EdgeId, additive: bool) -> bool {
        if !additive {
            if self.nodes.is_empty() && self.edges.len() == 1 && self.edges.contains(&id) {
                return false;
            }
            self.nodes.clear();
            self.edges.clear();
            self.edges.insert(id);
            return true;
        }
        self.edges.insert(id)
    }

    /// Shift-click behaviour: flips one node without touching the rest.
    pub fn toggle_node(&mut self, id: NodeId) -> bool {
        if !self.nodes.remove(&id) {
            self.nodes.insert(id);
        }
        true
    }

    pub fn toggle_edge(&mut self, id: EdgeId) -> bool {
        if !self.edges.remove(&id) {
            self.edges.insert(id);
        }
        true
    }

    pub fn deselect_node(&mut self, id: &NodeId) -> bool {
        self.nodes.remove(id)
    }

    pub fn deselect_edge(&mut self, id: &EdgeId) -> bool {
        self.edges.remove(id)
    }

    /// Replaces the whole selection.
    pub fn replace(
        &mut self,
        nodes: impl IntoIterator<Item = NodeId>,
        edges: impl IntoIterator<Item = EdgeId>,
    ) -> bool {
        let next = SelectionSet {
            nodes: nodes.into_iter().collect(),
            edges: edges.into_iter().collect(),
        };
        if next == *self {
            return false;
        }
        *self = next;
        true
    }

    pub fn clear(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        self.nodes.clear();
        self.edges.clear();
        true
    }

    pub fn is_node_selected(&self, id: &NodeId) -> bool {
        self.nodes.contains(id)
    }

    pub fn is_edge_selected(&self, id: &EdgeId) -> bool {
        self.edges.contains(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeId> {
        self.edges.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            nodes: self.nodes.iter().cloned().collect(),
            edges: self.edges.iter().cloned().collect(),
        }
    }
}
