//! Alias management
//!
//! An alias is a named storage endpoint together with its static credentials
//! and optional retry settings. Aliases are stored in `aliases.toml` next to
//! `config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::config_dir;
use crate::error::{Error, Result};

const ALIASES_FILE: &str = "aliases.toml";

/// Retry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
        }
    }
}

/// A configured storage endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub name: String,
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_bucket_lookup")]
    pub bucket_lookup: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryConfig>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_bucket_lookup() -> String {
    "auto".to_string()
}

impl Alias {
    /// Create an alias with the default region and lookup style
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: default_region(),
            bucket_lookup: default_bucket_lookup(),
            retry: None,
        }
    }

    /// Check that the endpoint is an absolute http(s) URL
    pub fn validate_endpoint(&self) -> Result<()> {
        let url = url::Url::parse(&self.endpoint)
            .map_err(|e| Error::Config(format!("Invalid endpoint '{}': {e}", self.endpoint)))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(Error::Config(format!(
                "Unsupported endpoint scheme '{other}' (expected http or https)"
            ))),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AliasFile {
    #[serde(default)]
    aliases: Vec<Alias>,
}

/// Reads and writes the alias file
#[derive(Debug, Clone)]
pub struct AliasManager {
    path: PathBuf,
}

impl AliasManager {
    /// Create a manager for the default alias file location
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: config_dir()?.join(ALIASES_FILE),
        })
    }

    /// Create a manager for an explicit file path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<AliasFile> {
        if !self.path.exists() {
            return Ok(AliasFile::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    fn store(&self, file: &AliasFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(file)?)?;
        Ok(())
    }

    /// All aliases, sorted by name
    pub fn list(&self) -> Result<Vec<Alias>> {
        let mut aliases = self.load()?.aliases;
        aliases.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(aliases)
    }

    pub fn get(&self, name: &str) -> Result<Alias> {
        self.load()?
            .aliases
            .into_iter()
            .find(|a| a.name == name)
            .ok_or_else(|| Error::AliasNotFound(name.to_string()))
    }

    /// Insert or replace an alias
    pub fn set(&self, alias: Alias) -> Result<()> {
        alias.validate_endpoint()?;
        let mut file = self.load()?;
        file.aliases.retain(|a| a.name != alias.name);
        file.aliases.push(alias);
        self.store(&file)
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        let mut file = self.load()?;
        let before = file.aliases.len();
        file.aliases.retain(|a| a.name != name);
        if file.aliases.len() == before {
            return Err(Error::AliasNotFound(name.to_string()));
        }
        self.store(&file)
    }
}
