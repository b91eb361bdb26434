//! Model configuration
//!
//! Limits and validation rules that a document enforces on its tree.
//! Settings are plain serde structs so they can be kept in a JSON file
//! next to whatever application embeds the model.

use crate::{DocModelError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration for a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Bookmark naming rules
    pub bookmarks: BookmarkSettings,
    /// Table structure rules
    pub tables: TableSettings,
}

/// Bookmark naming rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookmarkSettings {
    /// Maximum name length in grapheme clusters
    pub max_name_length: usize,
    /// Restrict names to a letter followed by letters, digits, or underscores
    pub strict_names: bool,
}

impl Default for BookmarkSettings {
    fn default() -> Self {
        Self {
            max_name_length: 40,
            strict_names: false,
        }
    }
}

/// Table structure rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// Maximum nesting depth for tables (0 = top-level table)
    pub max_nesting_depth: usize,
    /// Slack (in points) when matching a cell width against grid column widths
    pub width_tolerance: f32,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            max_nesting_depth: 10,
            width_tolerance: 0.5,
        }
    }
}

impl ModelConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ModelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Load a configuration file, or return defaults if it is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    "Failed to load model config from {}, using defaults: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Write this configuration as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that the settings are usable
    pub fn validate(&self) -> Result<()> {
        if self.bookmarks.max_name_length == 0 {
            return Err(DocModelError::Config(
                "bookmarks.max_name_length must be at least 1".into(),
            ));
        }
        if !self.tables.width_tolerance.is_finite() || self.tables.width_tolerance < 0.0 {
            return Err(DocModelError::Config(
                "tables.width_tolerance must be a non-negative number".into(),
            ));
        }
        Ok(())
    }
}
