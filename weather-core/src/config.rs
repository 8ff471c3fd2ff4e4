use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{
    lifecycle::DEFAULT_ERROR_WINDOW,
    query::{DEFAULT_LOCATION, OPENWEATHER_CURRENT_URL, QueryDefaults, Units},
};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
/// default_location = "London,GB"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,

    /// Overrides the OpenWeather endpoint, mostly useful for testing.
    pub base_url: Option<String>,

    pub units: Units,

    /// Looked up as soon as the interactive search starts.
    pub default_location: String,

    /// How long a fresh error is highlighted, in milliseconds.
    pub error_display_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            units: Units::default(),
            default_location: DEFAULT_LOCATION.to_string(),
            error_display_ms: DEFAULT_ERROR_WINDOW.as_millis() as u64,
        }
    }
}

impl Config {
    /// Load config from disk (or defaults on first run) and apply the
    /// environment override for the API key.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env_key(std::env::var(API_KEY_ENV).ok());
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// A non-blank key from the environment wins over the stored one.
    pub fn apply_env_key(&mut self, env_key: Option<String>) {
        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key.trim().to_string());
        }
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn error_window(&self) -> Duration {
        Duration::from_millis(self.error_display_ms)
    }

    /// Static inputs for composing request targets.
    pub fn query_defaults(&self) -> Result<QueryDefaults> {
        let api_key = self.api_key().ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `weather configure` or set {API_KEY_ENV}."
            )
        })?;

        let raw = self.base_url.as_deref().unwrap_or(OPENWEATHER_CURRENT_URL);
        let base_url =
            Url::parse(raw).with_context(|| format!("Invalid base URL in config: {raw}"))?;

        Ok(QueryDefaults { base_url, api_key: api_key.to_string(), units: self.units })
    }
}
