//! Registry configuration
//!
//! Layered the same way as the application config: an optional TOML file,
//! then environment variables prefixed `RICECODER_SETTINGS` (for example
//! `RICECODER_SETTINGS_DRAG_THRESHOLD=12`).

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const ENV_PREFIX: &str = "RICECODER_SETTINGS";

/// Tunables for a [`SettingsRegistry`](crate::SettingsRegistry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Pointer travel, in screen units, before a held draggable binding
    /// starts a drag
    pub drag_threshold: f32,
    /// Where [`JsonFileStore`](crate::JsonFileStore) keeps settings; the
    /// platform config dir when unset
    pub settings_file: Option<PathBuf>,
    pub pretty_json: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 8.0,
            settings_file: None,
            pretty_json: true,
        }
    }
}

impl RegistryConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RegistryConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` (optional) with environment overrides on top
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(path.as_ref().to_path_buf()).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX));

        let config: RegistryConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/ricecoder/settings.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ricecoder")
            .join("settings.toml")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.drag_threshold.is_finite() || self.drag_threshold < 0.0 {
            return Err(ConfigError::Validation(format!(
                "drag_threshold must be a non-negative number, got {}",
                self.drag_threshold
            )));
        }
        Ok(())
    }
}
