//! Configuration persistence utilities
//!
//! Loads TOML settings files from the platform config directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error while reading/writing config
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Failed to parse config file
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize config
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Get the base configuration directory
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "worldclock", "worldclock")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the configuration file path for a named settings file
pub fn config_path(name: &str) -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(format!("{}.toml", name)))
}

/// Load settings from an explicit path
///
/// Returns `None` if the file doesn't exist yet.
/// Returns an error if the file exists but can't be parsed.
pub fn load_config_from<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let config: T = toml::from_str(&contents)?;
    Ok(Some(config))
}

/// Save settings to an explicit path
pub fn save_config_to<T: Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}
