//! `ExporterConfig` struct, persistence and validation.
//!
//! Covers:
//! - `load` / `save` (YAML file I/O with atomic write) at the default path
//! - `load_from` / `save_to` for explicit paths
//! - `validate` (identifier layout and tooltip limits)

use crate::error::ConfigError;
use crate::types::LogLevel;
use crate::{MAX_CALLBACK_MESSAGE, MAX_ITEM_INDEX_BASE, MAX_TOOLTIP_CHARS, MIN_CALLBACK_MESSAGE};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for one status menu exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Offset added to every popup entry position to form its command id.
    ///
    /// Keeps generated ids away from low values reserved by the host window.
    #[serde(default = "crate::defaults::item_index_base")]
    pub item_index_base: u32,

    /// Notification icon id, scoped to the owning window.
    #[serde(default = "crate::defaults::icon_id")]
    pub icon_id: u32,

    /// Private window message the shell sends for icon interactions.
    #[serde(default = "crate::defaults::callback_message")]
    pub callback_message: u32,

    /// Maximum tooltip length in UTF-16 units; longer labels are truncated.
    #[serde(default = "crate::defaults::tooltip_max_chars")]
    pub tooltip_max_chars: usize,

    /// Log level hosts should apply when installing a logger.
    #[serde(default = "crate::defaults::log_level")]
    pub log_level: LogLevel,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            item_index_base: crate::defaults::item_index_base(),
            icon_id: crate::defaults::icon_id(),
            callback_message: crate::defaults::callback_message(),
            tooltip_max_chars: crate::defaults::tooltip_max_chars(),
            log_level: crate::defaults::log_level(),
        }
    }
}

impl ExporterConfig {
    /// Directory holding the exporter config file.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tray-export")
    }

    /// Default config file location.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Load configuration from the default path, creating it with defaults if missing.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        log::info!("Config path: {:?}", config_path);

        if config_path.exists() {
            return Self::load_from(&config_path);
        }

        log::info!(
            "Config file not found, creating default at {:?}",
            config_path
        );
        let config = Self::default();
        if let Err(e) = config.save_to(&config_path) {
            log::error!("Failed to save default config: {}", e);
            return Err(e);
        }
        Ok(config)
    }

    /// Load and validate configuration from `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        log::info!("Loading exporter config from {:?}", path);
        let contents = fs::read_to_string(path).map_err(ConfigError::from)?;
        let config: Self = serde_yaml_ng::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::from)?;
        }

        let yaml = serde_yaml_ng::to_string(self).map_err(ConfigError::from)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml).map_err(ConfigError::from)?;
        fs::rename(&temp_path, path).map_err(ConfigError::from)?;
        Ok(())
    }

    /// Check the identifier layout and tooltip limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.item_index_base == 0 || self.item_index_base > MAX_ITEM_INDEX_BASE {
            return Err(ConfigError::Validation(format!(
                "item_index_base must be in 1..={MAX_ITEM_INDEX_BASE:#x}, got {}",
                self.item_index_base
            )));
        }
        if !(MIN_CALLBACK_MESSAGE..=MAX_CALLBACK_MESSAGE).contains(&self.callback_message) {
            return Err(ConfigError::Validation(format!(
                "callback_message must be a private message in \
                 {MIN_CALLBACK_MESSAGE:#06x}..={MAX_CALLBACK_MESSAGE:#06x}, got {:#06x}",
                self.callback_message
            )));
        }
        if self.tooltip_max_chars == 0 || self.tooltip_max_chars > MAX_TOOLTIP_CHARS {
            return Err(ConfigError::Validation(format!(
                "tooltip_max_chars must be in 1..={MAX_TOOLTIP_CHARS}, got {}",
                self.tooltip_max_chars
            )));
        }
        Ok(())
    }

    /// Command id for the popup entry at `position`, if it fits the id space.
    pub fn command_id(&self, position: usize) -> Option<u32> {
        u32::try_from(position)
            .ok()
            .and_then(|p| self.item_index_base.checked_add(p))
            .filter(|id| *id <= u32::from(u16::MAX))
    }
}
