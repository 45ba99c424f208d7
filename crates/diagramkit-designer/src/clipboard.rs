//! Copy, cut and paste of sub-graphs.

use std::collections::{HashMap, HashSet};

use diagramkit_core::constants::DEFAULT_PASTE_OFFSET;
use diagramkit_core::{DiagramResult, EdgeId, NodeId, Point};
use diagramkit_settings::ClipboardSettings;
use serde::{Deserialize, Serialize};

use crate::commands::DesignerCommand;
use crate::document::Document;
use crate::model::{Edge, Node, NodeOverrides};

/// Plain-data snapshot of copied nodes and the edges between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipboardPayload {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Outcome of a paste. `command` is what was (or will be) applied, for
/// recording in the history.
#[derive(Debug, Clone, PartialEq)]
pub struct PasteResult {
    pub new_node_ids: Vec<NodeId>,
    pub new_edge_ids: Vec<EdgeId>,
    pub command: DesignerCommand,
}

impl ClipboardPayload {
    /// Deep copy of `node_ids` plus every edge with both endpoints among
    /// them. Edges with a single copied endpoint are left out.
    pub fn capture(doc: &Document, node_ids: &[NodeId]) -> Self {
        let wanted: HashSet<&NodeId> = node_ids.iter().collect();
        let nodes: Vec<Node> = doc
            .nodes()
            .filter(|n| wanted.contains(&n.id))
            .cloned()
            .collect();
        let edges = doc
            .edges()
            .filter(|e| wanted.contains(&e.source_id) && wanted.contains(&e.target_id))
            .cloned()
            .collect();
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Builds the paste as one composite command without touching `doc`.
    ///
    /// Nodes get fresh ids and are shifted by `offset`; edges are remapped
    /// onto the new ids, and any edge whose endpoint is missing from the
    /// mapping is skipped.
    pub fn plan_paste(&self, doc: &Document, offset: Point) -> DiagramResult<PasteResult> {
        let mut id_map: HashMap<&NodeId, NodeId> = HashMap::with_capacity(self.nodes.len());
        let mut commands = Vec::with_capacity(self.nodes.len() + self.edges.len());
        let mut new_node_ids = Vec::with_capacity(self.nodes.len());
        let mut new_edge_ids = Vec::with_capacity(self.edges.len());

        for original in &self.nodes {
            let node = doc.prepare_node(
                &original.shape_type,
                original.x + offset.x,
                original.y + offset.y,
                NodeOverrides::from_node(original),
            )?;
            id_map.insert(&original.id, node.id.clone());
            new_node_ids.push(node.id.clone());
            commands.push(DesignerCommand::add_node(node));
        }

        for original in &self.edges {
            let (Some(source_id), Some(target_id)) =
                (id_map.get(&original.source_id), id_map.get(&original.target_id))
            else {
                tracing::debug!("Paste: skipping edge {} with unmapped endpoint", original.id);
                continue;
            };
            let edge = Edge {
                id: doc.fresh_edge_id(),
                source_id: source_id.clone(),
                target_id: target_id.clone(),
                ..original.clone()
            };
            new_edge_ids.push(edge.id.clone());
            commands.push(DesignerCommand::add_edge(edge));
        }

        Ok(PasteResult {
            new_node_ids,
            new_edge_ids,
            command: DesignerCommand::composite("Paste", commands),
        })
    }

    /// Pastes into `doc` atomically: on failure nothing is inserted.
    pub fn paste(&self, doc: &mut Document, offset: Point) -> DiagramResult<PasteResult> {
        let mut result = self.plan_paste(doc, offset)?;
        result.command.apply(doc)?;
        tracing::info!(
            "Pasted {} nodes and {} edges",
            result.new_node_ids.len(),
            result.new_edge_ids.len()
        );
        Ok(result)
    }
}

/// Clipboard buffer plus the configured paste offset.
#[derive(Debug, Clone)]
pub struct ClipboardEngine {
    buffer: Option<ClipboardPayload>,
    offset: Point,
}

impl Default for ClipboardEngine {
    fn default() -> Self {
        Self {
            buffer: None,
            offset: Point::new(DEFAULT_PASTE_OFFSET, DEFAULT_PASTE_OFFSET),
        }
    }
}

impl ClipboardEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &ClipboardSettings) -> Self {
        Self {
            buffer: None,
            offset: Point::new(settings.paste_offset_x, settings.paste_offset_y),
        }
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Point) {
        self.offset = offset;
    }

    pub fn has_content(&self) -> bool {
        self.buffer.as_ref().is_some_and(|p| !p.is_empty())
    }

    pub fn payload(&self) -> Option<&ClipboardPayload> {
        self.buffer.as_ref()
    }

    pub fn set_payload(&mut self, payload: ClipboardPayload) {
        self.buffer = Some(payload);
    }

    pub fn clear(&mut self) {
        self.buffer = None;
    }

    /// Copies the document's selected nodes and their induced edges.
    pub fn copy(&mut self, doc: &Document) -> &ClipboardPayload {
        let payload = ClipboardPayload::capture(doc, &doc.selected_node_ids());
        tracing::debug!(
            "Copied {} nodes and {} edges",
            payload.nodes.len(),
            payload.edges.len()
        );
        self.buffer.insert(payload)
    }

    /// Copies the selection and returns the command deleting it: every
    /// selected node (cascading) and every selected edge the cascades miss.
    pub fn cut(&mut self, doc: &Document) -> Option<DesignerCommand> {
        self.copy(doc);
        DesignerCommand::delete_entities(
            doc,
            &doc.selected_node_ids(),
            &doc.selected_edge_ids(),
            "Cut",
        )
    }

    /// Plans a paste of the buffer; `None` when there is nothing to paste.
    pub fn plan_paste(&self, doc: &Document) -> DiagramResult<Option<PasteResult>> {
        match &self.buffer {
            Some(payload) if !payload.is_empty() => {
                payload.plan_paste(doc, self.offset).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Pastes the buffer into `doc`.
    pub fn paste(&self, doc: &mut Document) -> DiagramResult<Option<PasteResult>> {
        match &self.buffer {
            Some(payload) if !payload.is_empty() => payload.paste(doc, self.offset).map(Some),
            _ => Ok(None),
        }
    }
}
