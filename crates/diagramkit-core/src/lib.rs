//! # DiagramKit Core
//!
//! Core types and utilities for DiagramKit.
//! Provides the geometry primitives, entity ids, error taxonomy and the
//! change-notification bus shared by the settings and designer crates.

pub mod constants;
pub mod error;
pub mod event_bus;
pub mod geometry;
pub mod ids;

pub use error::{DiagramError, DiagramResult, EntityKind};

pub use event_bus::{
    DiagramEvent, EdgeEvent, EventBus, EventBusConfig, EventBusError, EventCategory, EventFilter,
    HistoryEvent, NodeEvent, SelectionEvent, SubscriptionId, ViewportEvent,
};

pub use geometry::{Point, Rect};
pub use ids::{EdgeId, IdGenerator, NodeId};
