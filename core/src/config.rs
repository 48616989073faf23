// Plugin configuration
//
// Stored as JSON. Every field has a default, so `{}` is a valid config and
// yields the stock web plugin with the standard request defaults.

use crate::options::ResolvedPositionOptions;
use crate::{PLUGIN_NAME, WEB_PLATFORM};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginConfig {
    /// Name the plugin registers under
    pub name: String,

    /// Platform tag the plugin implements
    pub platform: String,

    /// Options every request starts from before caller overrides
    pub defaults: ResolvedPositionOptions,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            name: PLUGIN_NAME.to_string(),
            platform: WEB_PLATFORM.to_string(),
            defaults: ResolvedPositionOptions::default(),
        }
    }
}

impl PluginConfig {
    pub fn from_json(json: &str) -> std::result::Result<Self, ConfigError> {
        let config: PluginConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> std::result::Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Name and platform must be non-blank; request defaults are not checked.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("name cannot be empty".to_string()));
        }
        if self.platform.trim().is_empty() {
            return Err(ConfigError::Invalid("platform cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Load config from file, or fall back to the default if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_json(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = self.to_json().context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = PluginConfig::from_json("{}").unwrap();
        assert_eq!(config, PluginConfig::default());
        assert_eq!(config.name, "FusedLocation");
        assert_eq!(config.platform, "web");
    }

    #[test]
    fn test_partial_defaults_require_all_fields() {
        let err = PluginConfig::from_json(r#"{"defaults":{"timeout":1}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_blank_platform_rejected() {
        let err = PluginConfig::from_json(r#"{"platform":"  "}"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid configuration: platform cannot be empty");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("location.json");

        let mut config = PluginConfig::default();
        config.defaults.timeout = 2500;
        config.save(&path).unwrap();

        assert_eq!(PluginConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = PluginConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, PluginConfig::default());
    }
}
