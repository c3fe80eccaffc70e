//! Configuration management
//!
//! Settings live in `config.toml` inside the config directory, which is
//! `$OSSADM_CONFIG_DIR` when set and `<platform config dir>/ossadm` otherwise.
//! A missing file yields the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::alias::RetryConfig;
use crate::error::{Error, Result};

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "OSSADM_CONFIG_DIR";

const CONFIG_FILE: &str = "config.toml";
const SCHEMA_VERSION: u32 = 1;

/// Resolve the directory holding `config.toml` and `aliases.toml`
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir));
    }

    dirs::config_dir()
        .map(|d| d.join("ossadm"))
        .ok_or_else(|| Error::Config("Cannot determine config directory".to_string()))
}

/// Output defaults applied when the command line does not override them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// "human" or "json"
    pub output: String,
    pub color: bool,
    pub progress: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: "human".to_string(),
            color: true,
            progress: true,
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema_version: u32,
    pub defaults: Defaults,
    /// Retry budget used when an alias has no retry settings of its own
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Loads and saves [`Config`]
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Create a manager for the default config location
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: config_dir()?.join(CONFIG_FILE),
        })
    }

    /// Create a manager for an explicit file path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration, falling back to defaults when the file is absent
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let config: Config = toml::from_str(&content)?;

        if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Unsupported config schema version {} (expected <= {SCHEMA_VERSION})",
                config.schema_version
            )));
        }

        Ok(config)
    }

    /// Write the configuration, creating parent directories as needed
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.toml"));
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("nested/config.toml"));

        let mut config = Config::default();
        config.retry.max_attempts = 7;
        config.defaults.color = false;
        manager.save(&config).unwrap();

        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn test_partial_file_is_filled_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[retry]\nmax_attempts = 5\n").unwrap();

        let config = ConfigManager::with_path(&path).load().unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_backoff_ms, 100);
        assert_eq!(config.defaults.output, "human");
    }

    #[test]
    fn test_future_schema_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "schema_version = 99\n").unwrap();

        let result = ConfigManager::with_path(&path).load();
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
