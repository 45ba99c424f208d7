//! # Event Bus Module
//!
//! Typed change notifications for rendering and UI collaborators.
//!
//! ## Overview
//!
//! The document, selection, history and viewport components publish
//! [`DiagramEvent`]s on a shared [`EventBus`]; collaborators subscribe with a
//! filter. There is no global bus: construct one at start-up and hand out
//! `Arc<EventBus>` clones.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use diagramkit_core::event_bus::{DiagramEvent, EventBus, EventCategory, EventFilter, NodeEvent};
//!
//! let bus = Arc::new(EventBus::new());
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Node]),
//!     |event| println!("{}", event.description()),
//! );
//!
//! bus.emit(DiagramEvent::Node(NodeEvent::Created { id: "node_1".into() }));
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
