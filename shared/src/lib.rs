//! Shared building blocks for the world clock: timezone readings, storage
//! slots, settings files and the frame-loop ticker.

pub mod config;
pub mod storage;
pub mod ticker;
pub mod time_engine;

pub use config::{config_dir, config_path, load_config_from, save_config_to, ConfigError};
pub use storage::{DiskStorage, MemoryStorage, SlotStorage, StorageError};
pub use ticker::Ticker;
pub use time_engine::{
    is_valid_timezone, label_from_timezone, parse_timezone, read_zone, read_zone_id,
    search_timezones, TimeError, ZoneReading, INVALID_TIMEZONE,
};
