use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

use crate::error::{Error, Result};

/// Name of the environment variable holding the OpenWeather credential.
/// When set, it wins over whatever the config file says.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Process-wide configuration, resolved exactly once at startup and injected
/// into the fetch components. The key is either present or absent; nothing
/// reads the environment after resolution.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Example TOML:
    /// api_key = "..."
    pub api_key: Option<String>,
}

impl Config {
    /// Resolve configuration: environment variable first, then the config
    /// file on disk, then empty.
    pub fn resolve() -> Result<Self> {
        if let Ok(key) = env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                tracing::debug!("API key resolved from {API_KEY_ENV}");
                return Ok(Self {
                    api_key: Some(key),
                });
            }
        }
        Self::load()
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
        }
    }

    /// Credential check that short-circuits before any network call.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(Error::MissingApiKey)
    }

    pub fn is_configured(&self) -> bool {
        self.require_api_key().is_ok()
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        let cfg: Config = toml::from_str(&contents)?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        fs::write(&path, toml)?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs =
            ProjectDirs::from("dev", "citycast", "citycast").ok_or(Error::NoConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
