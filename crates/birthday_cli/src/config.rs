//! CLI configuration loaded from `~/.config/birthdays/config.toml`.
//!
//! A missing file means all defaults; a present but malformed file is an error.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "birthdays";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the database, cache and logs unless overridden.
    pub data_dir: Option<PathBuf>,
    /// Store file; relative paths resolve against `data_dir`.
    pub database_file: PathBuf,
    /// Cache file; relative paths resolve against `data_dir`.
    pub cache_file: PathBuf,
    /// Disable for scripted/server use: the cache then neither loads nor saves.
    pub cache_enabled: bool,
    pub log_level: Option<String>,
    /// Absolute log directory. Defaults to `<data_dir>/logs`.
    pub log_dir: Option<PathBuf>,
    /// Timezone label stored when the user leaves it blank.
    pub default_timezone: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            database_file: PathBuf::from("birthdays.sqlite3"),
            cache_file: PathBuf::from("cache.json"),
            cache_enabled: true,
            log_level: None,
            log_dir: None,
            default_timezone: default_timezone(),
        }
    }
}

impl Config {
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(dirs::data_local_dir()
                .context("Could not determine local data directory")?
                .join(APP_DIR_NAME)),
        }
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(&self.database_file))
    }

    pub fn cache_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(&self.cache_file))
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        match &self.log_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(self.data_dir()?.join("logs")),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or(birthday_core::default_log_level())
    }
}

/// Default config file path (`~/.config/birthdays/config.toml`).
pub fn config_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join(APP_DIR_NAME)
        .join("config.toml"))
}

/// Loads config from `path`, or from the default location when `None`.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config_path()?,
    };

    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("Invalid config file {}", path.display()))
}

fn parse_config(contents: &str) -> Result<Config> {
    Ok(toml::from_str(contents)?)
}

fn default_timezone() -> String {
    std::env::var("TZ")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "UTC".to_string())
}
