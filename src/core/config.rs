//! Application configuration management

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::formats;

/// Main application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub download: DownloadPrefs,
    pub ui: UiConfig,
}

/// Download-related preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadPrefs {
    /// Catalog id of the pre-selected format
    pub default_format: String,
    /// Directory shown as the destination for finished downloads
    pub output_directory: String,
    pub show_notifications: bool,
}

/// UI-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub theme: String, // "light", "dark", "system"
    pub language: String,
    pub confirm_clear_history: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            download: DownloadPrefs::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for DownloadPrefs {
    fn default() -> Self {
        Self {
            default_format: formats::DEFAULT_FORMAT_ID.to_string(),
            output_directory: "downloads".to_string(),
            show_notifications: true,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "system".to_string(),
            language: "en".to_string(),
            confirm_clear_history: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from file, creating default if not exists
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

            let config: AppConfig =
                serde_json::from_str(&content).with_context(|| "Failed to parse config file")?;

            tracing::info!("Loaded configuration from: {:?}", config_path);
            Ok(config)
        } else {
            let config = Self::default();
            config.save()?;
            tracing::info!("Created default configuration at: {:?}", config_path);
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        tracing::info!("Saved configuration to: {:?}", config_path);
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "mediagrab", "app")
            .with_context(|| "Failed to get project directories")?;

        Ok(project_dirs.config_dir().join("config.json"))
    }

    /// Reset configuration to defaults
    pub fn reset() -> Result<Self> {
        let config = Self::default();
        config.save()?;
        tracing::info!("Reset configuration to defaults");
        Ok(config)
    }

    /// Validate field values
    pub fn validate(&self) -> Result<()> {
        if formats::find_format(&self.download.default_format).is_none() {
            return Err(anyhow!(
                "Unknown default format: {}",
                self.download.default_format
            ));
        }

        if self.download.output_directory.trim().is_empty() {
            return Err(anyhow!("Output directory cannot be empty"));
        }

        match self.ui.theme.as_str() {
            "light" | "dark" | "system" => {}
            other => return Err(anyhow!("Unknown theme: {}", other)),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_format() {
        let mut config = AppConfig::default();
        config.download.default_format = "webm-8k".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_theme() {
        let mut config = AppConfig::default();
        config.ui.theme = "solarized".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.download.default_format, config.download.default_format);
        assert_eq!(parsed.ui.theme, config.ui.theme);
    }
}
