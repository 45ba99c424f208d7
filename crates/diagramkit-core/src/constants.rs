//! Engine-wide defaults shared by the settings and designer crates.

/// Document format version written by the serializer.
pub const DOCUMENT_FORMAT_VERSION: &str = "1.0";

/// Default grid spacing in document units.
pub const DEFAULT_GRID_SIZE: f64 = 20.0;

/// Default neighbour-alignment tolerance in document units.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 10.0;

/// Default undo depth.
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// Pointer distance within which a dragged connection is pulled toward a port.
pub const DEFAULT_MAGNETIC_RADIUS: f64 = 22.0;

/// Interpolation factor applied to the magnetised preview endpoint.
pub const DEFAULT_PULL_STRENGTH: f64 = 0.28;

/// Offset applied to pasted content.
pub const DEFAULT_PASTE_OFFSET: f64 = 20.0;

/// Zoom limits.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;

/// Multiplicative zoom step for zoom in/out.
pub const ZOOM_STEP: f64 = 1.2;

/// Fraction of the canvas kept as padding when fitting content.
pub const VIEW_PADDING: f64 = 0.05;

/// Minimum node size enforced by interactive resizing.
pub const MIN_NODE_WIDTH: f64 = 50.0;
pub const MIN_NODE_HEIGHT: f64 = 30.0;

/// Default canvas size used before the host reports its real size.
pub const DEFAULT_CANVAS_WIDTH: f64 = 1200.0;
pub const DEFAULT_CANVAS_HEIGHT: f64 = 800.0;
