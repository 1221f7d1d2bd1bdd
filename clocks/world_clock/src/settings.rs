//! Application settings read once at startup from `world_clock.toml`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::{ConfigError, DiskStorage, StorageError};

pub const SETTINGS_NAME: &str = "world_clock";

pub const DEFAULT_LAND_URL: &str = "https://cdn.jsdelivr.net/npm/world-atlas@2/land-110m.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// TopoJSON document with a `land` object
    pub land_geometry_url: String,
    /// Skip the outline fetch entirely when false
    pub load_land: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Overrides where the storage slots live
    pub storage_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            land_geometry_url: DEFAULT_LAND_URL.to_string(),
            load_land: true,
            window_width: 1400,
            window_height: 800,
            storage_dir: None,
        }
    }
}

impl Settings {
    /// Load from the config directory; problems fall back to defaults
    pub fn load() -> Self {
        match shared::config_path(SETTINGS_NAME) {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("no config directory, using default settings");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        Self::or_default(shared::load_config_from(path))
    }

    fn or_default(loaded: Result<Option<Self>, ConfigError>) -> Self {
        match loaded {
            Ok(Some(settings)) => settings,
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("using default settings: {}", e);
                Self::default()
            }
        }
    }

    /// Slot storage honouring `storage_dir`
    pub fn storage(&self) -> Result<DiskStorage, StorageError> {
        match &self.storage_dir {
            Some(dir) => Ok(DiskStorage::new(dir)),
            None => DiskStorage::in_config_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world_clock.toml");
        std::fs::write(&path, "load_land = false\nstorage_dir = \"/tmp/slots\"\n").unwrap();

        let settings = Settings::load_from(&path);
        assert!(!settings.load_land);
        assert_eq!(settings.land_geometry_url, DEFAULT_LAND_URL);
        assert_eq!(settings.window_width, 1400);
        assert_eq!(settings.storage().unwrap().root(), Path::new("/tmp/slots"));
    }

    #[test]
    fn test_broken_or_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world_clock.toml");
        assert_eq!(Settings::load_from(&path), Settings::default());

        std::fs::write(&path, "window_width = \"wide\"").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world_clock.toml");
        let settings = Settings {
            window_width: 1024,
            ..Settings::default()
        };
        shared::save_config_to(&path, &settings).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }
}
