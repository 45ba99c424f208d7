//! Configuration management for DiagramKit
//!
//! Provides configuration file handling and validation for the editor engine.
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - Snapping (grid size, alignment threshold, neighbour policy)
//! - History (undo depth)
//! - Routing (default style, magnetic connection preview)
//! - Clipboard (paste offset)
//! - Viewport (zoom limits and step)
//! - Interaction (minimum node size for resizing)

use diagramkit_core::constants;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Which neighbour wins when several align within the snap threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborPolicy {
    /// The last neighbour in document order that aligns wins on each axis
    #[default]
    LastMatch,
    /// The neighbour with the smallest alignment delta wins on each axis
    Closest,
}

impl std::fmt::Display for NeighborPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LastMatch => write!(f, "last_match"),
            Self::Closest => write!(f, "closest"),
        }
    }
}

/// Routing style used for new connections when the caller names none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingStyle {
    #[default]
    Straight,
    Bezier,
    Orthogonal,
}

impl std::fmt::Display for RoutingStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Straight => write!(f, "straight"),
            Self::Bezier => write!(f, "bezier"),
            Self::Orthogonal => write!(f, "orthogonal"),
        }
    }
}

/// Snapping settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    /// Master switch for grid and neighbour snapping
    pub enabled: bool,
    /// Grid spacing in document units; 0 disables grid snapping
    pub grid_size: f64,
    /// Neighbour alignment tolerance in document units
    pub threshold: f64,
    /// Tie-break when several neighbours align
    pub neighbor_policy: NeighborPolicy,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            grid_size: constants::DEFAULT_GRID_SIZE,
            threshold: constants::DEFAULT_SNAP_THRESHOLD,
            neighbor_policy: NeighborPolicy::LastMatch,
        }
    }
}

/// Undo/redo settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum number of undoable commands retained
    pub max_depth: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_HISTORY_DEPTH,
        }
    }
}

/// Connection routing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSettings {
    pub default_routing: RoutingStyle,
    /// Pointer distance at which a dragged connection is pulled toward a port
    pub magnetic_radius: f64,
    /// Interpolation factor toward the port, 0..=1
    pub pull_strength: f64,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            default_routing: RoutingStyle::Straight,
            magnetic_radius: constants::DEFAULT_MAGNETIC_RADIUS,
            pull_strength: constants::DEFAULT_PULL_STRENGTH,
        }
    }
}

/// Clipboard settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardSettings {
    pub paste_offset_x: f64,
    pub paste_offset_y: f64,
}

impl Default for ClipboardSettings {
    fn default() -> Self {
        Self {
            paste_offset_x: constants::DEFAULT_PASTE_OFFSET,
            paste_offset_y: constants::DEFAULT_PASTE_OFFSET,
        }
    }
}

/// Viewport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Multiplier applied by a single zoom in/out step
    pub zoom_step: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            min_zoom: constants::MIN_ZOOM,
            max_zoom: constants::MAX_ZOOM,
            zoom_step: constants::ZOOM_STEP,
        }
    }
}

/// Pointer interaction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    /// Smallest width a resize handle can produce
    pub min_node_width: f64,
    /// Smallest height a resize handle can produce
    pub min_node_height: f64,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            min_node_width: constants::MIN_NODE_WIDTH,
            min_node_height: constants::MIN_NODE_HEIGHT,
        }
    }
}

/// Complete editor configuration
///
/// Aggregates all settings sections and provides file I/O operations.
/// Missing sections or keys fall back to their defaults when loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EditorConfig {
    pub snap: SnapSettings,
    pub history: HistorySettings,
    pub routing: RoutingSettings,
    pub clipboard: ClipboardSettings,
    pub viewport: ViewportSettings,
    pub interaction: InteractionSettings,
}

enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )
            .into()),
        }
    }
}

impl EditorConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform location of the user's config file
    ///
    /// `<config_dir>/diagramkit/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("diagramkit").join("config.toml"))
            .ok_or_else(|| {
                ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string()).into()
            })
    }

    /// Parse a JSON config document
    pub fn from_json_str(content: &str) -> SettingsResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config document
    pub fn from_toml_str(content: &str) -> SettingsResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file (JSON or TOML, by extension)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config = match format {
            ConfigFormat::Json => Self::from_json_str(&content)?,
            ConfigFormat::Toml => Self::from_toml_str(&content)?,
        };

        tracing::debug!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML, by extension)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::ConfigDirectory(e.to_string()))?;
        }

        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if !(self.snap.grid_size >= 0.0) {
            return Err(SettingsError::invalid("snap.grid_size", "must be >= 0"));
        }

        if !(self.snap.threshold >= 0.0) {
            return Err(SettingsError::invalid("snap.threshold", "must be >= 0"));
        }

        if self.history.max_depth == 0 {
            return Err(SettingsError::invalid("history.max_depth", "must be > 0"));
        }

        if !(self.routing.magnetic_radius >= 0.0) {
            return Err(SettingsError::invalid(
                "routing.magnetic_radius",
                "must be >= 0",
            ));
        }

        if !(0.0..=1.0).contains(&self.routing.pull_strength) {
            return Err(SettingsError::invalid(
                "routing.pull_strength",
                "must be within 0..=1",
            ));
        }

        if !self.clipboard.paste_offset_x.is_finite() || !self.clipboard.paste_offset_y.is_finite()
        {
            return Err(SettingsError::invalid("clipboard", "offsets must be finite"));
        }

        if !(self.viewport.min_zoom > 0.0) {
            return Err(SettingsError::invalid("viewport.min_zoom", "must be > 0"));
        }

        if !(self.viewport.max_zoom >= self.viewport.min_zoom) {
            return Err(SettingsError::invalid(
                "viewport.max_zoom",
                "must be >= viewport.min_zoom",
            ));
        }

        if !(self.viewport.zoom_step > 1.0) {
            return Err(SettingsError::invalid("viewport.zoom_step", "must be > 1"));
        }

        if !(self.interaction.min_node_width > 0.0) || !(self.interaction.min_node_height > 0.0) {
            return Err(SettingsError::invalid(
                "interaction",
                "minimum node size must be > 0",
            ));
        }

        Ok(())
    }

    /// Merge another config into this one
    ///
    /// Sections of `other` that still hold their defaults leave the
    /// corresponding section here untouched.
    pub fn merge(&mut self, other: &EditorConfig) {
        if other.snap != SnapSettings::default() {
            self.snap = other.snap.clone();
        }
        if other.history != HistorySettings::default() {
            self.history = other.history.clone();
        }
        if other.routing != RoutingSettings::default() {
            self.routing = other.routing.clone();
        }
        if other.clipboard != ClipboardSettings::default() {
            self.clipboard = other.clipboard.clone();
        }
        if other.viewport != ViewportSettings::default() {
            self.viewport = other.viewport.clone();
        }
        if other.interaction != InteractionSettings::default() {
            self.interaction = other.interaction.clone();
        }
    }
}
