use serde::{Deserialize, Serialize};

use crate::blocks::ColumnLayout;
use crate::error::{Result, ZyraError};

/// Editor settings supplied by the host page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet period before the document is handed to `on_change`.
    pub persist_debounce_ms: u64,
    /// Layout given to freshly dropped columns blocks.
    pub default_layout: ColumnLayout,
    /// Show drag handles and delete buttons on blocks.
    pub show_meta: bool,
    pub log_level: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            persist_debounce_ms: 300,
            default_layout: ColumnLayout::TwoEqual,
            show_meta: true,
            log_level: "info".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.persist_debounce_ms == 0 {
            return Err(ZyraError::InvalidConfig(
                "persist_debounce_ms must be greater than zero".to_string(),
            ));
        }
        if self.tracing_level().is_none() {
            return Err(ZyraError::InvalidConfig(format!(
                "unknown log level `{}`",
                self.log_level
            )));
        }
        Ok(())
    }

    pub fn tracing_level(&self) -> Option<tracing::Level> {
        match self.log_level.to_ascii_lowercase().as_str() {
            "trace" => Some(tracing::Level::TRACE),
            "debug" => Some(tracing::Level::DEBUG),
            "info" => Some(tracing::Level::INFO),
            "warn" => Some(tracing::Level::WARN),
            "error" => Some(tracing::Level::ERROR),
            _ => None,
        }
    }
}
