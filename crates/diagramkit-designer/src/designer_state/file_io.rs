//! File I/O operations for designer state.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use diagramkit_core::{DiagramResult, EdgeId, EventBus, NodeId};

use super::DesignerState;
use crate::commands::DesignerCommand;
use crate::model::{Edge, Node};
use crate::serialization::{DiagramFile, DiagramMetadata};

/// What an import added. Ids that collided with live ones were replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub node_ids: Vec<NodeId>,
    pub edge_ids: Vec<EdgeId>,
    pub remapped: usize,
}

impl DesignerState {
    /// Snapshot of the document, viewport and metadata.
    pub fn export(&self) -> DiagramFile {
        DiagramFile::from_document(
            &self.document,
            self.viewport.state(),
            Some(self.metadata.clone()),
        )
    }

    pub fn export_json(&self) -> DiagramResult<String> {
        self.export().to_json_string()
    }

    /// Replaces the document with `file`. Nothing changes if the file does
    /// not validate or names an unregistered shape type.
    pub fn open(&mut self, file: DiagramFile) -> DiagramResult<()> {
        self.cancel_interaction()?;
        let staged = file.to_document(self.document.registry().clone(), Arc::new(EventBus::new()))?;

        self.document.clear();
        for node in staged.nodes() {
            self.document.insert_node(node.clone())?;
        }
        for edge in staged.edges() {
            self.document.insert_edge(edge.clone())?;
        }

        self.history.clear();
        self.viewport.set_state(file.viewport);
        self.metadata = file.metadata.unwrap_or_default();
        self.is_modified = false;
        tracing::info!(
            "Opened diagram ({} nodes, {} edges)",
            self.document.node_count(),
            self.document.edge_count()
        );
        Ok(())
    }

    /// Merges `file` into the document as one undoable step.
    ///
    /// Colliding node and edge ids get fresh ones, and edges follow their
    /// remapped endpoints. Either the whole payload lands or nothing does.
    pub fn import(&mut self, file: &DiagramFile) -> DiagramResult<ImportSummary> {
        file.validate()?;
        for node in &file.nodes {
            self.document.registry().require(&node.shape_type)?;
        }

        let mut summary = ImportSummary::default();
        let mut node_map: HashMap<&NodeId, NodeId> = HashMap::with_capacity(file.nodes.len());
        let mut commands = Vec::with_capacity(file.nodes.len() + file.edges.len());

        for original in &file.nodes {
            let id = if self.document.contains_node(&original.id) {
                summary.remapped += 1;
                self.document.fresh_node_id()
            } else {
                original.id.clone()
            };
            node_map.insert(&original.id, id.clone());
            summary.node_ids.push(id.clone());
            commands.push(DesignerCommand::add_node(Node {
                id,
                ..original.clone()
            }));
        }

        for original in &file.edges {
            let (Some(source_id), Some(target_id)) = (
                node_map.get(&original.source_id),
                node_map.get(&original.target_id),
            ) else {
                continue;
            };
            let id = if self.document.contains_edge(&original.id) {
                summary.remapped += 1;
                self.document.fresh_edge_id()
            } else {
                original.id.clone()
            };
            summary.edge_ids.push(id.clone());
            commands.push(DesignerCommand::add_edge(Edge {
                id,
                source_id: source_id.clone(),
                target_id: target_id.clone(),
                ..original.clone()
            }));
        }

        if commands.is_empty() {
            return Ok(summary);
        }
        self.execute(DesignerCommand::composite("Import", commands))?;
        tracing::info!(
            "Imported {} nodes and {} edges ({} ids remapped)",
            summary.node_ids.len(),
            summary.edge_ids.len(),
            summary.remapped
        );
        Ok(summary)
    }

    /// Saves the design to a file.
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.metadata.touch();
        self.export()
            .save_to_file(path)
            .with_context(|| format!("Failed to save design to {}", path.display()))?;
        self.current_file_path = Some(path.to_path_buf());
        self.is_modified = false;
        Ok(())
    }

    /// Loads a design from a file, replacing the current one.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = DiagramFile::load_from_file(path)?;
        self.open(file)
            .with_context(|| format!("Failed to open design {}", path.display()))?;
        self.current_file_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Merges a design file into the current one.
    pub fn import_from_file(&mut self, path: impl AsRef<Path>) -> Result<ImportSummary> {
        let path = path.as_ref();
        let file = DiagramFile::load_from_file(path)?;
        let summary = self
            .import(&file)
            .with_context(|| format!("Failed to import {}", path.display()))?;
        Ok(summary)
    }

    /// Starts a new, empty design.
    pub fn new_design(&mut self) -> DiagramResult<()> {
        self.cancel_interaction()?;
        self.document.clear();
        self.history.clear();
        self.viewport.reset();
        self.metadata = DiagramMetadata::default();
        self.current_file_path = None;
        self.is_modified = false;
        Ok(())
    }
}
