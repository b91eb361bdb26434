//! Editing engine settings
//!
//! Persisted as JSON. Missing fields fall back to their defaults so older
//! settings files keep loading.

use crate::{EditError, Result};
use doc_core::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for an [`EditingEngine`](crate::EditingEngine)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Maximum number of undo steps kept in history
    pub max_undo_entries: usize,
    /// Model rules applied to documents the engine creates
    pub model: ModelConfig,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_undo_entries: 100,
            model: ModelConfig::default(),
        }
    }
}

impl EngineSettings {
    /// Parse settings from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: EngineSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Load settings, falling back to defaults if the file is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(
                    "Failed to load engine settings from {}, using defaults: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_undo_entries == 0 {
            return Err(EditError::InvalidCommand(
                "max_undo_entries must be at least 1".to_string(),
            ));
        }
        self.model.validate()?;
        Ok(())
    }
}
