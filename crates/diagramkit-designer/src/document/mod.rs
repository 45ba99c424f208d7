//! Canonical graph store for nodes and edges.
//!
//! The document is the only writer of its indices. Every mutation either
//! completes (index update, then events) or fails without touching anything.

mod graph;
mod selection;

use std::collections::HashMap;
use std::sync::Arc;

use diagramkit_core::{
    DiagramError, DiagramEvent, DiagramResult, EdgeEvent, EdgeId, EntityKind, EventBus,
    IdGenerator, NodeEvent, NodeId, SelectionEvent,
};
use indexmap::{IndexMap, IndexSet};

use crate::model::{Edge, EdgeOverrides, EdgePatch, Node, NodeOverrides, NodePatch, RoutingType};
use crate::selection_manager::SelectionSet;
use crate::shape_registry::ShapeRegistry;

/// Everything needed to put a deleted node back exactly where it was.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    pub node: Node,
    /// Position of the node in insertion order.
    pub index: usize,
    /// Cascade-deleted edges with their positions, in removal order.
    pub edges: Vec<(usize, Edge)>,
}

/// Mutable graph of nodes and edges with stable identity.
#[derive(Debug)]
pub struct Document {
    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,
    /// node id -> ids of every edge touching it
    node_edges: HashMap<NodeId, IndexSet<EdgeId>>,
    selection: SelectionSet,
    registry: Arc<ShapeRegistry>,
    ids: IdGenerator,
    default_routing: RoutingType,
    events: Arc<EventBus>,
    /// Open [`batched`](Self::batched) scopes; selection events wait for zero.
    batch_depth: usize,
    selection_pending: bool,
}

impl Document {
    pub fn new(registry: Arc<ShapeRegistry>, events: Arc<EventBus>) -> Self {
        Self {
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            node_edges: HashMap::new(),
            selection: SelectionSet::new(),
            registry,
            ids: IdGenerator::new(),
            default_routing: RoutingType::default(),
            events,
            batch_depth: 0,
            selection_pending: false,
        }
    }

    pub fn registry(&self) -> &Arc<ShapeRegistry> {
        &self.registry
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Routing assigned to new edges that do not name one.
    pub fn default_routing(&self) -> RoutingType {
        self.default_routing
    }

    pub fn set_default_routing(&mut self, routing: RoutingType) {
        self.default_routing = routing;
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn require_node(&self, id: &NodeId) -> DiagramResult<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| DiagramError::node_not_found(id.as_str()))
    }

    pub fn require_edge(&self, id: &EdgeId) -> DiagramResult<&Edge> {
        self.edges
            .get(id)
            .ok_or_else(|| DiagramError::edge_not_found(id.as_str()))
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.edges.contains_key(id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
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

    pub(crate) fn fresh_node_id(&self) -> NodeId {
        loop {
            let id = self.ids.node_id();
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    pub(crate) fn fresh_edge_id(&self) -> EdgeId {
        loop {
            let id = self.ids.edge_id();
            if !self.edges.contains_key(&id) {
                return id;
            }
        }
    }

    // ---- nodes ----

    /// Builds and validates a node without inserting it.
    ///
    /// Fails with `UnknownShapeType`, `DuplicateId` (caller-supplied id in
    /// use) or `InvalidGeometry`.
    pub fn prepare_node(
        &self,
        shape_type: &str,
        x: f64,
        y: f64,
        overrides: NodeOverrides,
    ) -> DiagramResult<Node> {
        let definition = self.registry.require(shape_type)?;

        let id = match &overrides.id {
            Some(id) if self.nodes.contains_key(id) => {
                return Err(DiagramError::DuplicateId {
                    kind: EntityKind::Node,
                    id: id.to_string(),
                })
            }
            Some(id) => id.clone(),
            None => self.fresh_node_id(),
        };

        let node = definition.instantiate(id, x, y, overrides);
        node.validate()?;
        Ok(node)
    }

    /// Inserts a fully formed node at the end of the insertion order.
    pub fn insert_node(&mut self, node: Node) -> DiagramResult<NodeId> {
        let index = self.nodes.len();
        self.insert_node_at(index, node)
    }

    fn insert_node_at(&mut self, index: usize, node: Node) -> DiagramResult<NodeId> {
        if self.nodes.contains_key(&node.id) {
            return Err(DiagramError::DuplicateId {
                kind: EntityKind::Node,
                id: node.id.to_string(),
            });
        }
        node.validate()?;

        let id = node.id.clone();
        let index = index.min(self.nodes.len());
        self.nodes.shift_insert(index, id.clone(), node);
        self.node_edges.entry(id.clone()).or_default();

        tracing::debug!("Node {} created", id);
        self.emit(DiagramEvent::Node(NodeEvent::Created { id: id.clone() }));
        Ok(id)
    }

    /// Looks up `shape_type` in the registry, merges `overrides` over its
    /// defaults and inserts the result.
    pub fn create_node(
        &mut self,
        shape_type: &str,
        x: f64,
        y: f64,
        overrides: NodeOverrides,
    ) -> DiagramResult<Node> {
        let node = self.prepare_node(shape_type, x, y, overrides)?;
        self.insert_node(node.clone())?;
        Ok(node)
    }

    /// The node as it would look after `patch`, validated but not stored.
    pub fn preview_node_update(&self, id: &NodeId, patch: &NodePatch) -> DiagramResult<Node> {
        let mut node = self.require_node(id)?.clone();
        patch.apply_to(&mut node);
        node.validate()?;
        self.check_ports_in_use(&node)?;
        Ok(node)
    }

    /// Every port an edge attaches to must survive a node replacement.
    fn check_ports_in_use(&self, node: &Node) -> DiagramResult<()> {
        let Some(edge_ids) = self.node_edges.get(&node.id) else {
            return Ok(());
        };
        for edge in edge_ids.iter().filter_map(|id| self.edges.get(id)) {
            let attached = [
                (&edge.source_id, edge.source_port_id.as_deref()),
                (&edge.target_id, edge.target_port_id.as_deref()),
            ];
            for (node_id, port_id) in attached {
                if let Some(port_id) = port_id {
                    if node_id == &node.id && node.port(port_id).is_none() {
                        return Err(DiagramError::NotFound {
                            kind: EntityKind::Port,
                            id: format!("{}:{}", node.id, port_id),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Shallow-merges `patch` into the node and returns the updated node.
    pub fn update_node(&mut self, id: &NodeId, patch: &NodePatch) -> DiagramResult<Node> {
        let node = self.preview_node_update(id, patch)?;
        self.set_node(node.clone())?;
        Ok(node)
    }

    /// Replaces a node wholesale. Used to restore snapshots.
    pub fn set_node(&mut self, node: Node) -> DiagramResult<()> {
        node.validate()?;
        self.check_ports_in_use(&node)?;
        let slot = self
            .nodes
            .get_mut(&node.id)
            .ok_or_else(|| DiagramError::node_not_found(node.id.as_str()))?;
        let id = node.id.clone();
        *slot = node;
        self.emit(DiagramEvent::Node(NodeEvent::Updated { id }));
        Ok(())
    }

    pub fn set_node_position(&mut self, id: &NodeId, x: f64, y: f64) -> DiagramResult<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| DiagramError::node_not_found(id.as_str()))?;
        if node.x == x && node.y == y {
            return Ok(());
        }
        node.x = x;
        node.y = y;
        self.emit(DiagramEvent::Node(NodeEvent::Updated { id: id.clone() }));
        Ok(())
    }

    /// Deletes a node after cascade-deleting its edges.
    ///
    /// Idempotent: an unknown id is a no-op returning `None`.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<RemovedNode> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        let incident: Vec<EdgeId> = self.edges_for_node(id).iter().map(|e| e.id.clone()).collect();
        let mut edges = Vec::with_capacity(incident.len());
        for edge_id in &incident {
            if let Some(removed) = self.detach_edge(edge_id) {
                edges.push(removed);
            }
        }

        let (index, _, node) = self.nodes.shift_remove_full(id)?;
        self.node_edges.remove(id);
        tracing::debug!("Node {} removed ({} incident edges)", id, edges.len());
        self.emit(DiagramEvent::Node(NodeEvent::Removed { id: id.clone() }));

        let mut selection_changed = self.selection.deselect_node(id);
        for (_, edge) in &edges {
            selection_changed |= self.selection.deselect_edge(&edge.id);
        }
        if selection_changed {
            self.emit_selection();
        }

        Some(RemovedNode { node, index, edges })
    }

    /// Puts back a node removed by [`remove_node`](Self::remove_node),
    /// together with its cascade-deleted edges, at their original positions.
    pub fn restore_node(&mut self, removed: RemovedNode) -> DiagramResult<()> {
        if let Some((_, edge)) = removed
            .edges
            .iter()
            .find(|(_, edge)| self.edges.contains_key(&edge.id))
        {
            return Err(DiagramError::DuplicateId {
                kind: EntityKind::Edge,
                id: edge.id.to_string(),
            });
        }

        let RemovedNode { node, index, edges } = removed;
        let node_id = node.id.clone();
        self.insert_node_at(index, node)?;

        for (index, edge) in edges.into_iter().rev() {
            if let Err(err) = self.insert_edge_at(index, edge) {
                self.remove_node(&node_id);
                return Err(err);
            }
        }
        Ok(())
    }

    // ---- edges ----

    fn check_port(&self, node_id: &NodeId, port_id: Option<&str>) -> DiagramResult<()> {
        let node = self.require_node(node_id)?;
        match port_id {
            Some(port_id) if node.port(port_id).is_none() => Err(DiagramError::NotFound {
                kind: EntityKind::Port,
                id: format!("{}:{}", node_id, port_id),
            }),
            _ => Ok(()),
        }
    }

    fn check_edge(&self, edge: &Edge) -> DiagramResult<()> {
        self.check_port(&edge.source_id, edge.source_port_id.as_deref())?;
        self.check_port(&edge.target_id, edge.target_port_id.as_deref())
    }

    /// Builds and validates an edge without inserting it.
    ///
    /// Fails with `NotFound` for a missing endpoint or an undeclared port,
    /// and with `DuplicateId` for a caller-supplied id already in use.
    pub fn prepare_edge(
        &self,
        source_id: &NodeId,
        target_id: &NodeId,
        overrides: EdgeOverrides,
    ) -> DiagramResult<Edge> {
        let id = match &overrides.id {
            Some(id) if self.edges.contains_key(id) => {
                return Err(DiagramError::DuplicateId {
                    kind: EntityKind::Edge,
                    id: id.to_string(),
                })
            }
            Some(id) => id.clone(),
            None => self.fresh_edge_id(),
        };

        let edge = Edge {
            id,
            source_id: source_id.clone(),
            target_id: target_id.clone(),
            source_port_id: overrides.source_port_id,
            target_port_id: overrides.target_port_id,
            routing_type: overrides.routing_type.unwrap_or(self.default_routing),
            label: overrides.label.unwrap_or_default(),
            style: overrides.style,
            data: overrides.data.unwrap_or_default(),
        };
        self.check_edge(&edge)?;
        Ok(edge)
    }

    /// Inserts a fully formed edge at the end of the insertion order.
    pub fn insert_edge(&mut self, edge: Edge) -> DiagramResult<EdgeId> {
        let index = self.edges.len();
        self.insert_edge_at(index, edge)
    }

    fn insert_edge_at(&mut self, index: usize, edge: Edge) -> DiagramResult<EdgeId> {
        if self.edges.contains_key(&edge.id) {
            return Err(DiagramError::DuplicateId {
                kind: EntityKind::Edge,
                id: edge.id.to_string(),
            });
        }
        self.check_edge(&edge)?;

        let id = edge.id.clone();
        self.index_edge(&edge);
        let index = index.min(self.edges.len());
        self.edges.shift_insert(index, id.clone(), edge);

        tracing::debug!("Edge {} created", id);
        self.emit(DiagramEvent::Edge(EdgeEvent::Created { id: id.clone() }));
        Ok(id)
    }

    pub fn create_edge(
        &mut self,
        source_id: &NodeId,
        target_id: &NodeId,
        overrides: EdgeOverrides,
    ) -> DiagramResult<Edge> {
        let edge = self.prepare_edge(source_id, target_id, overrides)?;
        self.insert_edge(edge.clone())?;
        Ok(edge)
    }

    pub fn preview_edge_update(&self, id: &EdgeId, patch: &EdgePatch) -> DiagramResult<Edge> {
        let mut edge = self.require_edge(id)?.clone();
        patch.apply_to(&mut edge);
        self.check_edge(&edge)?;
        Ok(edge)
    }

    pub fn update_edge(&mut self, id: &EdgeId, patch: &EdgePatch) -> DiagramResult<Edge> {
        let edge = self.preview_edge_update(id, patch)?;
        self.set_edge(edge.clone())?;
        Ok(edge)
    }

    /// Replaces an edge wholesale, re-indexing if its endpoints changed.
    pub fn set_edge(&mut self, edge: Edge) -> DiagramResult<()> {
        let previous = self.require_edge(&edge.id)?.clone();
        self.check_edge(&edge)?;

        if previous.source_id != edge.source_id || previous.target_id != edge.target_id {
            self.unindex_edge(&previous);
            self.index_edge(&edge);
        }

        let id = edge.id.clone();
        if let Some(slot) = self.edges.get_mut(&id) {
            *slot = edge;
        }
        self.emit(DiagramEvent::Edge(EdgeEvent::Updated { id }));
        Ok(())
    }

    /// Swaps source and target, ports included.
    pub fn reverse_edge(&mut self, id: &EdgeId) -> DiagramResult<Edge> {
        let mut edge = self.require_edge(id)?.clone();
        std::mem::swap(&mut edge.source_id, &mut edge.target_id);
        std::mem::swap(&mut edge.source_port_id, &mut edge.target_port_id);
        self.set_edge(edge.clone())?;
        Ok(edge)
    }

    /// Deletes an edge, returning it with its insertion position.
    ///
    /// Idempotent: an unknown id is a no-op returning `None`.
    pub fn remove_edge(&mut self, id: &EdgeId) -> Option<(usize, Edge)> {
        let removed = self.detach_edge(id)?;
        if self.selection.deselect_edge(id) {
            self.emit_selection();
        }
        Some(removed)
    }

    /// Puts back an edge removed by [`remove_edge`](Self::remove_edge).
    pub fn restore_edge(&mut self, index: usize, edge: Edge) -> DiagramResult<EdgeId> {
        self.insert_edge_at(index, edge)
    }

    fn detach_edge(&mut self, id: &EdgeId) -> Option<(usize, Edge)> {
        let (index, _, edge) = self.edges.shift_remove_full(id)?;
        self.unindex_edge(&edge);
        tracing::debug!("Edge {} removed", id);
        self.emit(DiagramEvent::Edge(EdgeEvent::Removed { id: id.clone() }));
        Some((index, edge))
    }

    fn index_edge(&mut self, edge: &Edge) {
        for node_id in [&edge.source_id, &edge.target_id] {
            self.node_edges
                .entry(node_id.clone())
                .or_default()
                .insert(edge.id.clone());
        }
    }

    fn unindex_edge(&mut self, edge: &Edge) {
        for node_id in [&edge.source_id, &edge.target_id] {
            if let Some(ids) = self.node_edges.get_mut(node_id) {
                ids.shift_remove(&edge.id);
            }
        }
    }

    // ---- whole document ----

    /// Removes everything, edges first. Emits `removed` for each entity.
    pub fn clear(&mut self) {
        let edge_ids: Vec<EdgeId> = self.edges.keys().cloned().collect();
        for id in edge_ids.iter().rev() {
            self.detach_edge(id);
        }
        let node_ids: Vec<NodeId> = self.nodes.keys().cloned().collect();
        for id in node_ids.iter().rev() {
            self.nodes.shift_remove(id);
            self.emit(DiagramEvent::Node(NodeEvent::Removed { id: id.clone() }));
        }
        self.node_edges.clear();
        if self.selection.clear() {
            self.emit_selection();
        }
    }

    /// Moves a node above every other node.
    pub fn bring_to_front(&mut self, id: &NodeId) -> DiagramResult<Node> {
        let top = self
            .nodes
            .values()
            .filter(|n| &n.id != id)
            .map(|n| n.z_index)
            .max();
        let z_index = match top {
            Some(top) => top + 1,
            None => self.require_node(id)?.z_index,
        };
        self.update_node(id, &NodePatch::z_index(z_index))
    }

    /// Moves a node below every other node.
    pub fn send_to_back(&mut self, id: &NodeId) -> DiagramResult<Node> {
        let bottom = self
            .nodes
            .values()
            .filter(|n| &n.id != id)
            .map(|n| n.z_index)
            .min();
        let z_index = match bottom {
            Some(bottom) => bottom - 1,
            None => self.require_node(id)?.z_index,
        };
        self.update_node(id, &NodePatch::z_index(z_index))
    }

    pub(crate) fn emit(&self, event: DiagramEvent) {
        self.events.emit(event);
    }

    /// Runs `f` with `selection:changed` held back until it returns, so a
    /// multi-step mutation announces its entity events first and the
    /// selection once.
    pub(crate) fn batched<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.batch_depth += 1;
        let out = f(self);
        self.batch_depth -= 1;
        if self.batch_depth == 0 && self.selection_pending {
            self.selection_pending = false;
            self.emit_selection();
        }
        out
    }

    pub(crate) fn emit_selection(&mut self) {
        if self.batch_depth > 0 {
            self.selection_pending = true;
            return;
        }
        let snapshot = self.selection.snapshot();
        self.emit(DiagramEvent::Selection(SelectionEvent::Changed {
            nodes: snapshot.nodes,
            edges: snapshot.edges,
        }));
    }
}
