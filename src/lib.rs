//! # DiagramKit
//!
//! A diagram document and editing engine: typed shape nodes connected by
//! routed edges, with undo/redo, snapping, clipboard and a lossless JSON
//! file format. Rendering and input handling belong to the host; the engine
//! reports every change on an event bus.
//!
//! ## Architecture
//!
//! DiagramKit is organized as a workspace with multiple crates:
//!
//! 1. **diagramkit-core** - Geometry, ids, error taxonomy, event bus
//! 2. **diagramkit-settings** - Editor configuration (JSON/TOML)
//! 3. **diagramkit-designer** - Document, commands, history, routing,
//!    snapping, clipboard, serialization and the `DesignerState` facade
//! 4. **diagramkit** - Re-exports, logging setup and the inspection CLI

pub use diagramkit_designer as designer;
pub use diagramkit_settings as settings;

pub use diagramkit_core::{
    DiagramError, DiagramEvent, DiagramResult, EdgeId, EntityKind, EventBus, EventFilter, NodeId,
    Point, Rect,
};

pub use diagramkit_designer::{
    ClipboardEngine, CommandHistory, ConnectionRouter, ConnectionValidator, DesignerCommand,
    DesignerState, DiagramFile, DiagramMetadata, Document, Edge, EdgeOverrides, EdgePatch, Node,
    NodeOverrides, NodePatch, RoutingType, ShapeRegistry, SnapEngine, ViewportTransform,
};

pub use diagramkit_settings::{EditorConfig, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty console output on stderr
/// - RUST_LOG environment variable support, defaulting to `info`
/// - Target, level and line numbers on every record
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
