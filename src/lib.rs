//! Drag-and-drop canvas block editor for plugin admin screens.
//!
//! The document is a flat list of [`Block`]s where a columns block holds one
//! list of blocks per column. [`editor::CanvasModel`] owns every edit and can
//! be driven without a renderer; [`CanvasEditor`] wires it to Dioxus.

pub mod blocks;
pub mod config;
pub mod editor;
pub mod error;
pub mod visual_editor;

pub use blocks::{Block, BlockId, BlockPatch, BlockType, ColumnLayout, PaletteItem};
pub use config::EditorConfig;
pub use error::{Result, ZyraError};
pub use visual_editor::{CanvasEditor, SettingMetaBox, SettingMetaBoxProps};

/// Install the Dioxus tracing subscriber at the configured level.
///
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init_logging(config: &EditorConfig) {
    let level = config.tracing_level().unwrap_or(tracing::Level::INFO);
    if let Err(err) = dioxus::logger::init(level) {
        tracing::debug!(%err, "logger already installed");
    }
}
