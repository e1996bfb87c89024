//! # Configuration
//!
//! Shelf configuration is managed by [`clapfig`], which handles layered loading
//! from TOML files, environment variables, and programmatic overrides.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Environment variables**: `SHELF__EDIT_MODE`, `SHELF__AUTOSAVE_DEBOUNCE_MS`, etc.
//! 2. **Data-dir Config**: `<data dir>/shelf.toml`.
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `root_id` | `0` | Id of the forest-root sentinel; nothing may be dropped into it |
//! | `protected_ids` | `["1", "2"]` | Containers that can never be moved |
//! | `protected_titles` | `["Bookmarks Bar", "Other Bookmarks"]` | Root-level containers protected by title |
//! | `protected_target_policy` | `warn` | Dropping into a protected container: `warn`, `reject` or `allow` |
//! | `edit_mode` | `true` | Drag-start is refused while this is off |
//! | `autosave_debounce_ms` | `1000` | Auto-save delay after the last edit; `0` disables the timer |
//! | `expansion_key` | `shelf.expansion` | Entry name of the persisted folder-expansion map |

use confique::Config;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn default_protected_ids() -> Vec<String> {
    vec!["1".to_string(), "2".to_string()]
}

fn default_protected_titles() -> Vec<String> {
    vec!["Bookmarks Bar".to_string(), "Other Bookmarks".to_string()]
}

/// What happens when a payload is dropped *into* a protected container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectedTargetPolicy {
    /// Accept the move but report `ProtectedTarget` as a warning.
    #[default]
    Warn,
    /// Block the move with `ProtectedTarget`.
    Reject,
    /// Accept silently.
    Allow,
}

impl fmt::Display for ProtectedTargetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProtectedTargetPolicy::Warn => "warn",
            ProtectedTargetPolicy::Reject => "reject",
            ProtectedTargetPolicy::Allow => "allow",
        };
        f.write_str(name)
    }
}

impl FromStr for ProtectedTargetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" => Ok(ProtectedTargetPolicy::Warn),
            "reject" => Ok(ProtectedTargetPolicy::Reject),
            "allow" => Ok(ProtectedTargetPolicy::Allow),
            other => Err(format!(
                "unknown protected target policy '{}' (expected warn, reject or allow)",
                other
            )),
        }
    }
}

/// Configuration for shelf, stored in `shelf.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ShelfConfig {
    /// Id of the forest-root sentinel.
    #[config(default = "0")]
    pub root_id: String,

    /// Container ids that may never be moved.
    /// When absent, defaults to ["1", "2"].
    pub protected_ids: Option<Vec<String>>,

    /// Titles of root-level containers that may never be moved.
    /// When absent, defaults to ["Bookmarks Bar", "Other Bookmarks"].
    pub protected_titles: Option<Vec<String>>,

    /// One of "warn", "reject", "allow". When absent, "warn".
    pub protected_target_policy: Option<ProtectedTargetPolicy>,

    /// Whether drags may start at all.
    #[config(default = true)]
    pub edit_mode: bool,

    #[config(default = 1000)]
    pub autosave_debounce_ms: u64,

    #[config(default = "shelf.expansion")]
    pub expansion_key: String,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            root_id: "0".to_string(),
            protected_ids: None,
            protected_titles: None,
            protected_target_policy: None,
            edit_mode: true,
            autosave_debounce_ms: 1000,
            expansion_key: "shelf.expansion".to_string(),
        }
    }
}

impl ShelfConfig {
    /// Get protected ids, using defaults if not configured.
    pub fn protected_ids(&self) -> Vec<String> {
        self.protected_ids
            .clone()
            .unwrap_or_else(default_protected_ids)
    }

    /// Get protected titles, using defaults if not configured.
    pub fn protected_titles(&self) -> Vec<String> {
        self.protected_titles
            .clone()
            .unwrap_or_else(default_protected_titles)
    }

    pub fn protected_target_policy(&self) -> ProtectedTargetPolicy {
        self.protected_target_policy.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ShelfConfig::default();
        assert_eq!(config.root_id, "0");
        assert!(config.edit_mode);
        assert_eq!(config.autosave_debounce_ms, 1000);
        assert_eq!(config.protected_ids(), vec!["1", "2"]);
        assert_eq!(
            config.protected_titles(),
            vec!["Bookmarks Bar", "Other Bookmarks"]
        );
        assert_eq!(config.protected_target_policy(), ProtectedTargetPolicy::Warn);
    }

    #[test]
    fn test_custom_protected_ids() {
        let config = ShelfConfig {
            protected_ids: Some(vec!["7".to_string()]),
            ..Default::default()
        };
        assert_eq!(config.protected_ids(), vec!["7"]);
    }

    #[test]
    fn test_policy_from_toml() {
        let config: ShelfConfig = toml::from_str(
            r#"
            root_id = "root"
            protected_target_policy = "reject"
            edit_mode = false
            autosave_debounce_ms = 250
            expansion_key = "exp"
            "#,
        )
        .unwrap();
        assert_eq!(config.root_id, "root");
        assert_eq!(
            config.protected_target_policy(),
            ProtectedTargetPolicy::Reject
        );
        assert!(!config.edit_mode);
        assert_eq!(config.protected_ids(), vec!["1", "2"]);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "Allow".parse::<ProtectedTargetPolicy>().unwrap(),
            ProtectedTargetPolicy::Allow
        );
        assert!("sometimes".parse::<ProtectedTargetPolicy>().is_err());
        assert_eq!(ProtectedTargetPolicy::Reject.to_string(), "reject");
    }
}
