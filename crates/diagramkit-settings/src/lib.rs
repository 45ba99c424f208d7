//! DiagramKit Settings Crate
//!
//! Handles editor configuration: defaults, file persistence and validation.

pub mod config;
pub mod error;

pub use config::{
    ClipboardSettings, EditorConfig, HistorySettings, InteractionSettings, NeighborPolicy,
    RoutingSettings, RoutingStyle, SnapSettings, ViewportSettings,
};
pub use error::{ConfigError, SettingsError, SettingsResult};
