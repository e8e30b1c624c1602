//! Editor configuration persistence
//!
//! Stores user preferences in `~/.config/crossmap/config.yaml`

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::commands::RollbackOrder;
use crate::model::RecordField;
use crate::projection::ViewMetrics;

/// Editor configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Row sizes of the projected view (logical units)
    pub metrics: ViewMetrics,
    /// Quiet period after the last edit before an autosave is due
    pub autosave_delay_ms: u64,
    /// Undo entries kept per editor
    pub history_limit: usize,
    /// Order in which a failed group command undoes its applied steps
    pub rollback_order: RollbackOrder,
    /// Breakouts applied to newly opened editors
    pub default_breakouts: Vec<RecordField>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            metrics: ViewMetrics::default(),
            autosave_delay_ms: 1500,
            history_limit: 1000,
            rollback_order: RollbackOrder::Reverse,
            default_breakouts: Vec::new(),
        }
    }
}

impl EditorConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::read(path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Ignoring config at {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let content = std::fs::read_to_string(path).context("reading config")?;
        let config: Self = serde_yaml::from_str(&content).context("parsing config")?;
        if config.history_limit == 0 {
            anyhow::bail!("history_limit must be at least 1");
        }
        Ok(config)
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| anyhow::anyhow!("No config directory available"))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        use anyhow::Context;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}
