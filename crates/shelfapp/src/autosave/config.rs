//! Auto-save configuration.

use crate::config::ShelfConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for auto-save behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoSaveConfig {
    /// Whether edits schedule a save at all. `force_save` works either way.
    pub enabled: bool,

    /// Debounce delay in milliseconds.
    ///
    /// After a change, the coordinator waits this long before saving.
    /// Additional changes reset the timer.
    pub debounce_ms: u64,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 1000,
        }
    }
}

impl From<&ShelfConfig> for AutoSaveConfig {
    fn from(config: &ShelfConfig) -> Self {
        Self {
            enabled: config.autosave_debounce_ms > 0,
            debounce_ms: config.autosave_debounce_ms,
        }
    }
}

impl AutoSaveConfig {
    /// Create a disabled auto-save config.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn with_debounce_ms(debounce_ms: u64) -> Self {
        Self {
            enabled: true,
            debounce_ms,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
