//! Event type definitions for the event bus.
//!
//! This module defines every change notification the engine emits, organised
//! by category. Payloads carry ids rather than entity copies: consumers
//! re-fetch from the document instead of caching mutable state.

use serde::{Deserialize, Serialize};

use crate::ids::{EdgeId, NodeId};

/// Root event enum for all engine notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DiagramEvent {
    /// Node lifecycle
    Node(NodeEvent),
    /// Edge lifecycle
    Edge(EdgeEvent),
    /// Selection set changes
    Selection(SelectionEvent),
    /// Undo/redo availability
    History(HistoryEvent),
    /// Pan/zoom changes
    Viewport(ViewportEvent),
}

impl DiagramEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            DiagramEvent::Node(_) => EventCategory::Node,
            DiagramEvent::Edge(_) => EventCategory::Edge,
            DiagramEvent::Selection(_) => EventCategory::Selection,
            DiagramEvent::History(_) => EventCategory::History,
            DiagramEvent::Viewport(_) => EventCategory::Viewport,
        }
    }

    /// Wire name of the event, e.g. `node:created`
    pub fn name(&self) -> &'static str {
        match self {
            DiagramEvent::Node(NodeEvent::Created { .. }) => "node:created",
            DiagramEvent::Node(NodeEvent::Updated { .. }) => "node:updated",
            DiagramEvent::Node(NodeEvent::Removed { .. }) => "node:removed",
            DiagramEvent::Edge(EdgeEvent::Created { .. }) => "edge:created",
            DiagramEvent::Edge(EdgeEvent::Updated { .. }) => "edge:updated",
            DiagramEvent::Edge(EdgeEvent::Removed { .. }) => "edge:removed",
            DiagramEvent::Selection(_) => "selection:changed",
            DiagramEvent::History(_) => "history:changed",
            DiagramEvent::Viewport(_) => "viewport:changed",
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            DiagramEvent::Node(e) => e.description(),
            DiagramEvent::Edge(e) => e.description(),
            DiagramEvent::Selection(e) => e.description(),
            DiagramEvent::History(e) => e.description(),
            DiagramEvent::Viewport(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Node lifecycle events.
    Node,
    /// Edge lifecycle events.
    Edge,
    /// Selection events.
    Selection,
    /// Undo/redo events.
    History,
    /// Pan/zoom events.
    Viewport,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Node => write!(f, "Node"),
            EventCategory::Edge => write!(f, "Edge"),
            EventCategory::Selection => write!(f, "Selection"),
            EventCategory::History => write!(f, "History"),
            EventCategory::Viewport => write!(f, "Viewport"),
        }
    }
}

/// Node lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeEvent {
    /// Node inserted into the document.
    Created {
        /// Id of the new node.
        id: NodeId,
    },
    /// Node fields changed.
    Updated {
        /// Id of the changed node.
        id: NodeId,
    },
    /// Node removed from the document.
    Removed {
        /// Id of the removed node.
        id: NodeId,
    },
}

impl NodeEvent {
    fn description(&self) -> String {
        match self {
            NodeEvent::Created { id } => format!("Node created: {}", id),
            NodeEvent::Updated { id } => format!("Node updated: {}", id),
            NodeEvent::Removed { id } => format!("Node removed: {}", id),
        }
    }
}

/// Edge lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdgeEvent {
    /// Edge inserted into the document.
    Created {
        /// Id of the new edge.
        id: EdgeId,
    },
    /// Edge fields changed.
    Updated {
        /// Id of the changed edge.
        id: EdgeId,
    },
    /// Edge removed from the document.
    Removed {
        /// Id of the removed edge.
        id: EdgeId,
    },
}

impl EdgeEvent {
    fn description(&self) -> String {
        match self {
            EdgeEvent::Created { id } => format!("Edge created: {}", id),
            EdgeEvent::Updated { id } => format!("Edge updated: {}", id),
            EdgeEvent::Removed { id } => format!("Edge removed: {}", id),
        }
    }
}

/// Selection events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectionEvent {
    /// The selection set changed.
    Changed {
        /// Selected node ids, sorted.
        nodes: Vec<NodeId>,
        /// Selected edge ids, sorted.
        edges: Vec<EdgeId>,
    },
}

impl SelectionEvent {
    fn description(&self) -> String {
        match self {
            SelectionEvent::Changed { nodes, edges } => {
                format!("Selection: {} nodes, {} edges", nodes.len(), edges.len())
            }
        }
    }
}

/// Undo/redo availability events
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// Undo or redo availability may have changed.
    Changed {
        /// Whether an undo is possible.
        can_undo: bool,
        /// Whether a redo is possible.
        can_redo: bool,
    },
}

impl HistoryEvent {
    fn description(&self) -> String {
        match self {
            HistoryEvent::Changed { can_undo, can_redo } => {
                format!("History: undo={}, redo={}", can_undo, can_redo)
            }
        }
    }
}

/// Viewport events
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ViewportEvent {
    /// Pan or zoom changed.
    Changed {
        /// Horizontal pan in screen pixels.
        pan_x: f64,
        /// Vertical pan in screen pixels.
        pan_y: f64,
        /// Zoom factor.
        zoom: f64,
    },
}

impl ViewportEvent {
    fn description(&self) -> String {
        match self {
            ViewportEvent::Changed { pan_x, pan_y, zoom } => {
                format!("Viewport: {:.2}x at ({:.1}, {:.1})", zoom, pan_x, pan_y)
            }
        }
    }
}
