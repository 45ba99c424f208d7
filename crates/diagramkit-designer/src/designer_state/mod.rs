//! Editor state for UI integration.
//!
//! `DesignerState` wires the document to its history, viewport, snapping,
//! routing, validation and clipboard, and records every user action as one
//! undoable command. The implementation is split across submodules:
//! - `file_io`: open, import, export, save and load
//! - `sessions`: drag, resize and connection gestures

mod file_io;
mod sessions;

pub use file_io::ImportSummary;
pub use sessions::ActiveSession;

use std::path::PathBuf;
use std::sync::Arc;

use diagramkit_core::{DiagramResult, EdgeId, EventBus, NodeId, Point, Rect};
use diagramkit_settings::EditorConfig;

use crate::clipboard::{ClipboardEngine, PasteResult};
use crate::commands::{DesignerCommand, MoveNodes, NodeMove};
use crate::document::Document;
use crate::history::CommandHistory;
use crate::model::{Edge, EdgeOverrides, EdgePatch, Node, NodeOverrides, NodePatch};
use crate::routing::{ConnectionRouter, RoutedPath};
use crate::serialization::DiagramMetadata;
use crate::shape_registry::ShapeRegistry;
use crate::snap::SnapEngine;
use crate::validation::ConnectionValidator;
use crate::viewport::ViewportTransform;

/// Editor state for UI integration
#[derive(Debug)]
pub struct DesignerState {
    document: Document,
    history: CommandHistory,
    pub viewport: ViewportTransform,
    pub snap: SnapEngine,
    pub router: ConnectionRouter,
    pub validator: ConnectionValidator,
    pub clipboard: ClipboardEngine,
    config: EditorConfig,
    events: Arc<EventBus>,
    pub metadata: DiagramMetadata,
    pub current_file_path: Option<PathBuf>,
    pub is_modified: bool,
    session: Option<ActiveSession>,
}

impl DesignerState {
    /// Creates an empty editor with default configuration.
    pub fn new(registry: Arc<ShapeRegistry>, events: Arc<EventBus>) -> Self {
        Self::with_config(registry, events, EditorConfig::default())
    }

    pub fn with_config(
        registry: Arc<ShapeRegistry>,
        events: Arc<EventBus>,
        config: EditorConfig,
    ) -> Self {
        let mut document = Document::new(registry, events.clone());
        document.set_default_routing(config.routing.default_routing.into());
        Self {
            document,
            history: CommandHistory::with_max_depth(events.clone(), config.history.max_depth),
            viewport: ViewportTransform::new(events.clone()).with_settings(&config.viewport),
            snap: SnapEngine::from_settings(&config.snap),
            router: ConnectionRouter::from_settings(&config.routing),
            validator: ConnectionValidator::new(),
            clipboard: ClipboardEngine::from_settings(&config.clipboard),
            config,
            events,
            metadata: DiagramMetadata::default(),
            current_file_path: None,
            is_modified: false,
            session: None,
        }
    }

    /// Re-applies every configurable component from `config`.
    pub fn apply_config(&mut self, config: EditorConfig) {
        self.document
            .set_default_routing(config.routing.default_routing.into());
        self.history.set_max_depth(config.history.max_depth);
        self.viewport.apply_settings(&config.viewport);
        self.snap = SnapEngine::from_settings(&config.snap);
        self.router = ConnectionRouter::from_settings(&config.routing);
        self.clipboard.set_offset(Point::new(
            config.clipboard.paste_offset_x,
            config.clipboard.paste_offset_y,
        ));
        self.config = config;
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Read-only view of the document; all mutation goes through the
    /// recorded actions below.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    fn execute(&mut self, command: DesignerCommand) -> DiagramResult<()> {
        self.settle_interaction()?;
        self.history.execute(command, &mut self.document)?;
        self.is_modified = true;
        Ok(())
    }

    fn record(&mut self, command: DesignerCommand) {
        self.history.record(command);
        self.is_modified = true;
    }

    // ---- nodes ----

    pub fn create_node(
        &mut self,
        shape_type: &str,
        x: f64,
        y: f64,
        overrides: NodeOverrides,
    ) -> DiagramResult<Node> {
        let node = self.document.prepare_node(shape_type, x, y, overrides)?;
        self.execute(DesignerCommand::add_node(node.clone()))?;
        Ok(node)
    }

    /// Applies `patch`. An update that changes nothing records nothing.
    pub fn update_node(&mut self, id: &NodeId, patch: &NodePatch) -> DiagramResult<Node> {
        let before = self.document.require_node(id)?.clone();
        let after = self.document.preview_node_update(id, patch)?;
        if before != after {
            self.execute(DesignerCommand::update_node(before, after.clone()))?;
        }
        Ok(after)
    }

    /// Moves `ids` by `(dx, dy)` as a single step.
    pub fn move_nodes(&mut self, ids: &[NodeId], dx: f64, dy: f64) -> DiagramResult<()> {
        let moves = ids
            .iter()
            .map(|id| {
                let node = self.document.require_node(id)?;
                let from = Point::new(node.x, node.y);
                Ok((id.clone(), NodeMove { from, to: from.offset(dx, dy) }))
            })
            .collect::<DiagramResult<Vec<_>>>()?;
        let command = DesignerCommand::MoveNodes(MoveNodes { moves });
        if command.is_noop() {
            return Ok(());
        }
        self.execute(command)
    }

    /// Deletes a node and its edges. Returns false if it did not exist.
    pub fn remove_node(&mut self, id: &NodeId) -> DiagramResult<bool> {
        if !self.document.contains_node(id) {
            return Ok(false);
        }
        self.execute(DesignerCommand::remove_node(id.clone()))?;
        Ok(true)
    }

    /// Deletes every selected node and edge in one step.
    pub fn remove_selected(&mut self) -> DiagramResult<bool> {
        let command = DesignerCommand::delete_entities(
            &self.document,
            &self.document.selected_node_ids(),
            &self.document.selected_edge_ids(),
            "Delete",
        );
        match command {
            Some(command) => {
                self.execute(command)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn bring_to_front(&mut self, id: &NodeId) -> DiagramResult<Node> {
        self.settle_interaction()?;
        let before = self.document.require_node(id)?.clone();
        let after = self.document.bring_to_front(id)?;
        if before != after {
            self.record(DesignerCommand::update_node(before, after.clone()));
        }
        Ok(after)
    }

    pub fn send_to_back(&mut self, id: &NodeId) -> DiagramResult<Node> {
        self.settle_interaction()?;
        let before = self.document.require_node(id)?.clone();
        let after = self.document.send_to_back(id)?;
        if before != after {
            self.record(DesignerCommand::update_node(before, after.clone()));
        }
        Ok(after)
    }

    // ---- edges ----

    /// Validates and adds a connection.
    pub fn connect(
        &mut self,
        source_id: &NodeId,
        target_id: &NodeId,
        overrides: EdgeOverrides,
    ) -> DiagramResult<Edge> {
        let edge = self.document.prepare_edge(source_id, target_id, overrides)?;
        self.validator.validate(&self.document, &edge)?;
        self.execute(DesignerCommand::add_edge(edge.clone()))?;
        Ok(edge)
    }

    pub fn update_edge(&mut self, id: &EdgeId, patch: &EdgePatch) -> DiagramResult<Edge> {
        let before = self.document.require_edge(id)?.clone();
        let after = self.document.preview_edge_update(id, patch)?;
        if before != after {
            self.execute(DesignerCommand::update_edge(before, after.clone()))?;
        }
        Ok(after)
    }

    /// Deletes an edge. Returns false if it did not exist.
    pub fn remove_edge(&mut self, id: &EdgeId) -> DiagramResult<bool> {
        if !self.document.contains_edge(id) {
            return Ok(false);
        }
        self.execute(DesignerCommand::remove_edge(id.clone()))?;
        Ok(true)
    }

    /// Swaps an edge's source and target, ports included.
    pub fn reverse_edge(&mut self, id: &EdgeId) -> DiagramResult<Edge> {
        let before = self.document.require_edge(id)?.clone();
        let mut after = before.clone();
        std::mem::swap(&mut after.source_id, &mut after.target_id);
        std::mem::swap(&mut after.source_port_id, &mut after.target_port_id);
        if before != after {
            self.execute(DesignerCommand::update_edge(before, after.clone()))?;
        }
        Ok(after)
    }

    /// Current geometry of an edge.
    pub fn route(&self, id: &EdgeId) -> Option<RoutedPath> {
        let edge = self.document.edge(id)?;
        self.router.route_edge(&self.document, edge)
    }

    /// Geometry of every edge in document order.
    pub fn routes(&self) -> Vec<(EdgeId, RoutedPath)> {
        self.document
            .edges()
            .filter_map(|edge| {
                self.router
                    .route_edge(&self.document, edge)
                    .map(|path| (edge.id.clone(), path))
            })
            .collect()
    }

    // ---- selection ----

    pub fn select_node(&mut self, id: &NodeId, additive: bool) -> DiagramResult<()> {
        self.document.select_node(id, additive)
    }

    pub fn select_edge(&mut self, id: &EdgeId, additive: bool) -> DiagramResult<()> {
        self.document.select_edge(id, additive)
    }

    pub fn select_area(&mut self, area: &Rect, additive: bool) {
        self.document.select_area(area, additive);
    }

    pub fn select_all(&mut self) {
        self.document.select_all();
    }

    pub fn clear_selection(&mut self) {
        self.document.clear_selection();
    }

    // ---- clipboard ----

    /// Copies the selection. Returns the number of nodes copied.
    pub fn copy(&mut self) -> usize {
        self.clipboard.copy(&self.document).nodes.len()
    }

    /// Copies then deletes the selection in one step.
    pub fn cut(&mut self) -> DiagramResult<bool> {
        match self.clipboard.cut(&self.document) {
            Some(command) => {
                self.execute(command)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Pastes the clipboard and selects the pasted nodes.
    pub fn paste(&mut self) -> DiagramResult<Option<PasteResult>> {
        let Some(result) = self.clipboard.plan_paste(&self.document)? else {
            return Ok(None);
        };
        self.execute(result.command.clone())?;
        self.document
            .set_selection(result.new_node_ids.iter().cloned(), Vec::new());
        tracing::info!(
            "Pasted {} nodes and {} edges",
            result.new_node_ids.len(),
            result.new_edge_ids.len()
        );
        Ok(Some(result))
    }

    // ---- history ----

    pub fn undo(&mut self) -> DiagramResult<bool> {
        self.settle_interaction()?;
        let undone = self.history.undo(&mut self.document)?;
        if undone {
            self.is_modified = true;
        }
        Ok(undone)
    }

    pub fn redo(&mut self) -> DiagramResult<bool> {
        self.settle_interaction()?;
        let redone = self.history.redo(&mut self.document)?;
        if redone {
            self.is_modified = true;
        }
        Ok(redone)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Fits the viewport to the document content, if there is any.
    pub fn zoom_to_fit(&mut self) -> bool {
        match self.document.bounds() {
            Some(bounds) => {
                self.viewport.fit_to_view(&bounds);
                true
            }
            None => false,
        }
    }
}
