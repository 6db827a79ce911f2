use anyhow::{Context, Result, anyhow};
use chrono::Locale;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};

use crate::theme::Theme;

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "WEATHERAPI_KEY";

pub const DEFAULT_LOCATION: &str = "Delhi";
pub const DEFAULT_LOCALE: &str = "en_IN";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// api_key = "..."
/// default_location = "Delhi"
/// locale = "en_IN"
/// theme = "dark"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// WeatherAPI.com key; `WEATHERAPI_KEY` wins when set.
    pub api_key: Option<String>,

    /// Location fetched on startup when none is given.
    pub default_location: String,

    /// Locale for weekday/date/time labels, e.g. "en_IN" or "en-US".
    pub locale: String,

    pub theme: Theme,

    /// Provider endpoint override, mainly for testing against a local server.
    pub base_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            default_location: DEFAULT_LOCATION.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            theme: Theme::default(),
            base_url: None,
        }
    }
}

impl Config {
    /// Load config from the platform config dir, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save config, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// API key from the environment, else from the file.
    pub fn resolve_api_key(&self) -> Result<String> {
        self.resolve_api_key_with(std::env::var(API_KEY_ENV).ok())
    }

    pub fn resolve_api_key_with(&self, env_value: Option<String>) -> Result<String> {
        env_value
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `forecast configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Parsed display locale. Accepts both `en-IN` and `en_IN`.
    pub fn locale(&self) -> Result<Locale> {
        parse_locale(&self.locale)
    }
}

pub fn parse_locale(raw: &str) -> Result<Locale> {
    let normalized = raw.trim().replace('-', "_");
    Locale::try_from(normalized.as_str())
        .map_err(|_| anyhow!("Unknown locale '{raw}'. Use a POSIX name such as en_IN or de_DE."))
}
