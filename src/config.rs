//! Application configuration storage

use crate::error::{PassfillError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    /// Overwrite the clipboard an extra 19 times after the decoy write.
    #[serde(default)]
    pub clear_clipboard_20x: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Use a user-designated store location instead of the in-app one.
    #[serde(default)]
    pub external_store: bool,
    /// Root of the external store; required when `external_store` is set.
    #[serde(default)]
    pub external_store_location: Option<PathBuf>,
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "passfill").ok_or_else(|| {
        PassfillError::ConfigError("could not determine a home directory".to_string())
    })
}

fn config_path() -> Result<PathBuf> {
    let dirs = project_dirs()?;
    let config_dir = dirs.config_dir();

    // Create directory if it doesn't exist
    if !config_dir.exists() {
        fs::create_dir_all(config_dir)?;
    }

    Ok(config_dir.join("config.json"))
}

pub fn load_config() -> Result<AppConfig> {
    let path = config_path()?;

    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(&path)?;

    serde_json::from_str(&content).map_err(|e| PassfillError::ConfigError(e.to_string()))
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    let path = config_path()?;

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| PassfillError::ConfigError(e.to_string()))?;

    fs::write(&path, content)?;
    Ok(())
}

/// Default in-app store location used when no external store is configured.
pub fn default_store_location() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join("store"))
}
