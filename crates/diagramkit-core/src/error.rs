//! Error handling for DiagramKit
//!
//! Provides the error taxonomy shared by every layer of the engine:
//! - Lookup failures (an id that does not resolve to a live entity)
//! - Identity conflicts (a caller-supplied id already in use)
//! - Registry misses (an unregistered shape type)
//! - Document validation (malformed import payloads)
//! - Geometry validation (non-positive node dimensions)
//!
//! All error types use `thiserror` for ergonomic error handling.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A shape node.
    Node,
    /// A connection between two nodes.
    Edge,
    /// An attachment point on a node boundary.
    Port,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Node => write!(f, "node"),
            EntityKind::Edge => write!(f, "edge"),
            EntityKind::Port => write!(f, "port"),
        }
    }
}

/// Diagram engine error type
///
/// Document methods return these synchronously. A failed operation leaves the
/// document exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagramError {
    /// The referenced entity does not exist
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// The kind of entity that was looked up.
        kind: EntityKind,
        /// The id that failed to resolve.
        id: String,
    },

    /// A caller-supplied id collides with a live entity
    #[error("{kind} id '{id}' is already in use")]
    DuplicateId {
        /// The kind of entity being created.
        kind: EntityKind,
        /// The colliding id.
        id: String,
    },

    /// Node creation referenced a shape type missing from the registry
    #[error("Unknown shape type: {shape_type}")]
    UnknownShapeType {
        /// The shape type that was requested.
        shape_type: String,
    },

    /// An import payload failed schema, version or reference checks
    #[error("Malformed document: {reason}")]
    MalformedDocument {
        /// What made the payload unacceptable.
        reason: String,
    },

    /// A node would end up with a non-finite coordinate or a non-positive
    /// dimension
    #[error(
        "Invalid geometry: ({x}, {y}) {width} x {height}; coordinates must be finite and both dimensions > 0"
    )]
    InvalidGeometry {
        /// The rejected x coordinate.
        x: f64,
        /// The rejected y coordinate.
        y: f64,
        /// The rejected width.
        width: f64,
        /// The rejected height.
        height: f64,
    },

    /// A connection validation rule refused the connection
    #[error("Connection rejected: {}", reasons.join("; "))]
    ConnectionRejected {
        /// One message per failed rule.
        reasons: Vec<String>,
    },
}

impl DiagramError {
    /// Shorthand for a missing node.
    pub fn node_not_found(id: impl Into<String>) -> Self {
        DiagramError::NotFound {
            kind: EntityKind::Node,
            id: id.into(),
        }
    }

    /// Shorthand for a missing edge.
    pub fn edge_not_found(id: impl Into<String>) -> Self {
        DiagramError::NotFound {
            kind: EntityKind::Edge,
            id: id.into(),
        }
    }

    /// Shorthand for a malformed payload.
    pub fn malformed(reason: impl Into<String>) -> Self {
        DiagramError::MalformedDocument {
            reason: reason.into(),
        }
    }

    /// Check if this is a lookup failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiagramError::NotFound { .. })
    }

    /// Check if this is an id collision
    pub fn is_duplicate_id(&self) -> bool {
        matches!(self, DiagramError::DuplicateId { .. })
    }

    /// Check if this is a malformed-document error
    pub fn is_malformed(&self) -> bool {
        matches!(self, DiagramError::MalformedDocument { .. })
    }

    /// Check if this is a geometry validation error
    pub fn is_invalid_geometry(&self) -> bool {
        matches!(self, DiagramError::InvalidGeometry { .. })
    }
}

impl From<serde_json::Error> for DiagramError {
    fn from(err: serde_json::Error) -> Self {
        DiagramError::malformed(err.to_string())
    }
}

/// Result type alias for engine operations
pub type DiagramResult<T> = std::result::Result<T, DiagramError>;
