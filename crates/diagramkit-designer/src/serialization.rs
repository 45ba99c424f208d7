//! Serialization and deserialization of diagram files.
//!
//! The file is a single JSON object:
//!
//! ```text
//! { "version": "1.0", "metadata": {..}, "nodes": [..], "edges": [..],
//!   "viewport": { "panX": .., "panY": .., "zoom": .. } }
//! ```
//!
//! `metadata` is optional. Nodes and edges keep document insertion order,
//! and edges reference their endpoints by id.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use diagramkit_core::constants::DOCUMENT_FORMAT_VERSION;
use diagramkit_core::{DiagramError, DiagramResult, EventBus, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;
use crate::model::{Edge, Node};
use crate::shape_registry::ShapeRegistry;
use crate::viewport::ViewportState;

/// Format version written by [`serialize`].
pub const FORMAT_VERSION: &str = DOCUMENT_FORMAT_VERSION;

/// Versions [`deserialize`] accepts.
pub const SUPPORTED_VERSIONS: &[&str] = &[FORMAT_VERSION];

/// Descriptive data about a diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagramMetadata {
    pub title: String,
    pub description: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Default for DiagramMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            title: String::new(),
            description: String::new(),
            created: now,
            modified: now,
        }
    }
}

impl DiagramMetadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Update modified timestamp
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}

/// Complete diagram file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramFile {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DiagramMetadata>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub viewport: ViewportState,
}

impl DiagramFile {
    /// Snapshot of `doc` in insertion order.
    pub fn from_document(
        doc: &Document,
        viewport: ViewportState,
        metadata: Option<DiagramMetadata>,
    ) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            metadata,
            nodes: doc.nodes().cloned().collect(),
            edges: doc.edges().cloned().collect(),
            viewport,
        }
    }

    /// Checks ids, geometry and edge references within this payload.
    ///
    /// Every failure is reported as `MalformedDocument`.
    pub fn validate(&self) -> DiagramResult<()> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            return Err(DiagramError::malformed(format!(
                "unsupported version '{}'",
                self.version
            )));
        }

        let mut nodes_by_id: HashMap<&NodeId, &Node> = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if nodes_by_id.insert(&node.id, node).is_some() {
                return Err(DiagramError::malformed(format!(
                    "duplicate node id '{}'",
                    node.id
                )));
            }
            node.validate()
                .map_err(|err| DiagramError::malformed(format!("node '{}': {}", node.id, err)))?;
        }

        let mut edge_ids = HashSet::with_capacity(self.edges.len());
        for edge in &self.edges {
            if !edge_ids.insert(&edge.id) {
                return Err(DiagramError::malformed(format!(
                    "duplicate edge id '{}'",
                    edge.id
                )));
            }
            check_endpoint(&nodes_by_id, edge, &edge.source_id, edge.source_port_id.as_deref())?;
            check_endpoint(&nodes_by_id, edge, &edge.target_id, edge.target_port_id.as_deref())?;
        }

        Ok(())
    }

    /// Builds a fresh document holding this payload, ids preserved.
    ///
    /// Fails with `UnknownShapeType` if a node type is not registered.
    pub fn to_document(
        &self,
        registry: Arc<ShapeRegistry>,
        events: Arc<EventBus>,
    ) -> DiagramResult<Document> {
        self.validate()?;
        for node in &self.nodes {
            registry.require(&node.shape_type)?;
        }

        let mut doc = Document::new(registry, events);
        for node in &self.nodes {
            doc.insert_node(node.clone())?;
        }
        for edge in &self.edges {
            doc.insert_edge(edge.clone())?;
        }
        Ok(doc)
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> DiagramResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save diagram to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self
            .to_json_string()
            .context("Failed to serialize diagram")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write diagram file {}", path.display()))?;
        tracing::info!("Saved diagram to {}", path.display());
        Ok(())
    }

    /// Load and validate a diagram from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read diagram file {}", path.display()))?;
        let file = from_json_str(&content)
            .with_context(|| format!("Failed to parse diagram file {}", path.display()))?;
        tracing::info!(
            "Loaded diagram from {} ({} nodes, {} edges)",
            path.display(),
            file.nodes.len(),
            file.edges.len()
        );
        Ok(file)
    }
}

fn check_endpoint(
    nodes_by_id: &HashMap<&NodeId, &Node>,
    edge: &Edge,
    node_id: &NodeId,
    port_id: Option<&str>,
) -> DiagramResult<()> {
    let node = nodes_by_id.get(node_id).ok_or_else(|| {
        DiagramError::malformed(format!(
            "edge '{}' references unknown node '{}'",
            edge.id, node_id
        ))
    })?;
    match port_id {
        Some(port_id) if node.port(port_id).is_none() => Err(DiagramError::malformed(format!(
            "edge '{}' references unknown port '{}' on node '{}'",
            edge.id, port_id, node_id
        ))),
        _ => Ok(()),
    }
}

/// Projects `doc` and `viewport` to the JSON document shape.
pub fn serialize(
    doc: &Document,
    viewport: ViewportState,
    metadata: Option<DiagramMetadata>,
) -> DiagramResult<Value> {
    Ok(serde_json::to_value(DiagramFile::from_document(
        doc, viewport, metadata,
    ))?)
}

/// Parses and validates a JSON document.
///
/// Fails with `MalformedDocument` if the version is missing or unsupported,
/// if the payload does not match the schema, or if ids collide or edges
/// reference nodes or ports not present in the same payload.
pub fn deserialize(value: Value) -> DiagramResult<DiagramFile> {
    match value.get("version") {
        Some(Value::String(version)) if SUPPORTED_VERSIONS.contains(&version.as_str()) => {}
        Some(Value::String(version)) => {
            return Err(DiagramError::malformed(format!(
                "unsupported version '{}'",
                version
            )))
        }
        Some(_) => return Err(DiagramError::malformed("version must be a string")),
        None => return Err(DiagramError::malformed("missing version")),
    }

    let file: DiagramFile = serde_json::from_value(value)?;
    file.validate()?;
    Ok(file)
}

/// [`deserialize`] from JSON text.
pub fn from_json_str(json: &str) -> DiagramResult<DiagramFile> {
    deserialize(serde_json::from_str(json)?)
}
