//! # DiagramKit Designer
//!
//! The diagram editing engine: a graph document of typed shape nodes and
//! routed edges, with undo/redo, snapping, clipboard and a lossless JSON
//! file format.
//!
//! ## Core Components
//!
//! ### Document Model
//! - **Shape Registry**: Node types as data (default size, ports, style, render hint)
//! - **Document**: Nodes and edges in insertion order, with cascade delete
//!   and a node -> edges index
//! - **Selection**: Node and edge selection owned by the document
//!
//! ### Editing
//! - **Commands/History**: Snapshot-based reversible commands and a bounded
//!   linear undo stack
//! - **Interaction**: Drag, resize and connection gestures as sessions that
//!   commit one command each
//! - **Snapping**: Grid and neighbour-edge alignment
//! - **Routing**: Port resolution, edge paths and magnetic connection preview
//! - **Validation**: Rules checked before a connection is committed
//! - **Clipboard**: Copy, cut and paste of sub-graphs
//!
//! ### Persistence
//! - **Serialization**: Versioned JSON diagram files
//! - **Viewport**: Pan/zoom transform stored alongside the diagram
//!
//! ## Architecture
//!
//! ```text
//! DesignerState (facade)
//!   ├── Document ── ShapeRegistry
//!   ├── CommandHistory
//!   ├── ViewportTransform
//!   ├── SnapEngine / ConnectionRouter / ConnectionValidator
//!   └── ClipboardEngine
//!
//! EventBus (shared): node/edge/selection/history/viewport changes
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use diagramkit_core::EventBus;
//! use diagramkit_designer::{DesignerState, EdgeOverrides, NodeOverrides, ShapeRegistry};
//!
//! let mut state = DesignerState::new(Arc::new(ShapeRegistry::builtin()), Arc::new(EventBus::new()));
//! let start = state.create_node("terminator", 100.0, 50.0, NodeOverrides::new().with_label("Start"))?;
//! let end = state.create_node("terminator", 100.0, 150.0, NodeOverrides::new().with_label("End"))?;
//! state.connect(&start.id, &end.id, EdgeOverrides::new())?;
//! state.undo()?;
//! ```

pub mod clipboard;
pub mod commands;
pub mod designer_state;
pub mod document;
pub mod history;
pub mod interaction;
pub mod model;
pub mod routing;
pub mod selection_manager;
pub mod serialization;
pub mod shape_registry;
pub mod snap;
pub mod validation;
pub mod viewport;

pub use clipboard::{ClipboardEngine, ClipboardPayload, PasteResult};
pub use commands::DesignerCommand;
pub use designer_state::{ActiveSession, DesignerState, ImportSummary};
pub use document::{Document, RemovedNode};
pub use history::CommandHistory;
pub use interaction::{
    ConnectionPreview, ConnectionRequest, ConnectionSession, DragSession, ResizeHandle,
    ResizeSession,
};
pub use model::{
    Edge, EdgeOverrides, EdgePatch, Node, NodeOverrides, NodePatch, Port, RoutingType, Side,
};
pub use routing::{ConnectionRouter, DropTarget, MagneticPreview, NearestPort, PortRef, RoutedPath};
pub use selection_manager::{SelectionSet, SelectionSnapshot};
pub use serialization::{deserialize, serialize, DiagramFile, DiagramMetadata};
pub use shape_registry::{RenderHint, ShapeDefinition, ShapeRegistry};
pub use snap::{snap_to_grid, snap_to_neighbors, SnapEngine};
pub use validation::{ConnectionRule, ConnectionValidator};
pub use viewport::{ViewportState, ViewportTransform};
