//! String-keyed storage slots
//!
//! Each slot holds one string value under a key. Callers own the encoding of
//! what they store; this layer only moves text in and out.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;

use crate::config::config_dir;

/// Error type for slot reads and writes
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to determine the storage directory
    #[error("could not determine storage directory")]
    NoStorageDir,
    /// IO error while reading/writing a slot
    #[error("storage IO error: {0}")]
    Io(#[from] io::Error),
}

/// A key/value store of string slots
pub trait SlotStorage {
    /// Read a slot, `None` when it has never been written
    fn read_slot(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the contents of a slot
    fn write_slot(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Slots kept as one file per key under a root directory
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage rooted in the platform config directory
    pub fn in_config_dir() -> Result<Self, StorageError> {
        config_dir()
            .map(|dir| Self::new(dir.join("slots")))
            .ok_or(StorageError::NoStorageDir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl SlotStorage for DiskStorage {
    fn read_slot(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_slot(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.slot_path(key), value)?;
        log::trace!("wrote slot {} ({} bytes)", key, value.len());
        Ok(())
    }
}

/// In-process slots; clones share the same underlying map
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStorage for MemoryStorage {
    fn read_slot(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn write_slot(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_slot_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = DiskStorage::new(dir.path().join("nested"));

        assert_eq!(storage.read_slot("worldclock.theme").unwrap(), None);
        storage.write_slot("worldclock.theme", "dark").unwrap();
        assert_eq!(
            storage.read_slot("worldclock.theme").unwrap().as_deref(),
            Some("dark")
        );

        // A second handle on the same root sees the write
        let reopened = DiskStorage::new(storage.root());
        assert_eq!(
            reopened.read_slot("worldclock.theme").unwrap().as_deref(),
            Some("dark")
        );
    }

    #[test]
    fn test_memory_clones_share_slots() {
        let mut storage = MemoryStorage::new();
        let view = storage.clone();
        storage.write_slot("key", "value").unwrap();
        assert_eq!(view.read_slot("key").unwrap().as_deref(), Some("value"));
        assert_eq!(view.read_slot("other").unwrap(), None);
    }
}
