//! Configuration file handling for ~/.pixelift/config.ini.
//!
//! Loads and saves user configuration with sensible defaults.
//! Settings structs live in [`super::settings`], constants in [`super::defaults`],
//! parsing in [`super::parser`], and serialization in [`super::writer`].

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::settings::ConfigFile;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.pixelift/config.ini).
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path (~/.pixelift/config.ini).
    pub fn save(&self) -> Result<(), ConfigFileError> {
        let path = config_file_path();
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            let config = Self::default();
            config.save_to(&path)?;
        }
        Ok(path)
    }
}

/// Get the path to the config directory (~/.pixelift).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pixelift")
}

/// Get the path to the config file (~/.pixelift/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::super::defaults::*;
    use super::*;
    use crate::plan::PlanTier;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(config.account.user_id, DEFAULT_USER_ID);
        assert!(config.account.plan.is_none());
        assert!(config.account.monthly_quota.is_none());
        assert_eq!(config.plan_tier(), PlanTier::Basic);
        assert_eq!(config.service.api_url, DEFAULT_API_URL);
        assert!(config.service.api_key.is_none());
        assert_eq!(config.validator.pixel_ceiling, DEFAULT_PIXEL_CEILING);
        assert_eq!(config.validator.memory_budget_mib, DEFAULT_MEMORY_BUDGET_MIB);
        assert_eq!(config.queue.max_depth, DEFAULT_MAX_QUEUE_DEPTH);
        assert_eq!(config.history.retention_days, DEFAULT_RETENTION_DAYS);
        assert!(config.logging.file.ends_with("pixelift.log"));
        assert!(config.service.state_dir.ends_with("state"));
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        let default = ConfigFile::default();

        assert_eq!(config.account.user_id, default.account.user_id);
        assert_eq!(config.service.api_url, default.service.api_url);
        assert_eq!(config.queue.max_depth, default.queue.max_depth);
    }

    #[test]
    fn test_memory_budget_bytes() {
        let config = ConfigFile::default();
        assert_eq!(
            config.validator.memory_budget_bytes(),
            DEFAULT_MEMORY_BUDGET_MIB * 1024 * 1024
        );
    }
}
