//! Engine configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no file)
//! yields a working configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::metrics::analytics::batch::BatchSettings;
use crate::metrics::analytics::pdc::DEFAULT_DURATIONS;
use crate::metrics::kernel::KernelPreference;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Power kernel selection
    pub kernel: KernelPreference,
    /// Durations (seconds) for power curves, strictly ascending
    pub curve_durations: Vec<u32>,
    /// Batch runner settings
    pub batch: BatchSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kernel: KernelPreference::Auto,
            curve_durations: DEFAULT_DURATIONS.to_vec(),
            batch: BatchSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch.chunk_size == 0 {
            return Err(ConfigError::Invalid(
                "batch.chunk_size must be greater than 0".to_string(),
            ));
        }

        if self.curve_durations.contains(&0) {
            return Err(ConfigError::Invalid(
                "curve_durations must be positive".to_string(),
            ));
        }

        if !self.curve_durations.windows(2).all(|w| w[0] < w[1]) {
            return Err(ConfigError::Invalid(
                "curve_durations must be strictly ascending".to_string(),
            ));
        }

        Ok(())
    }
}

/// Get the platform configuration directory.
pub fn get_config_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "powerload", "PowerLoad")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the default configuration file path.
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("powerload.toml")
}

/// Load configuration from `path`, or defaults when the file does not exist.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return Ok(EngineConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
    let config = EngineConfig::from_toml_str(&content)?;

    tracing::info!(path = %path.display(), kernel = %config.kernel, "Loaded engine config");
    Ok(config)
}

/// Save configuration to `path`, creating parent directories.
pub fn save_config(config: &EngineConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
