//! Clock Store - the selected timezones, their persistence and change feed
//!
//! The store is the only owner of the clock collection. Every mutation is
//! persisted to the clock slot and then broadcast as a full snapshot to all
//! live [`ChangeFeed`]s.

use std::collections::HashSet;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};
use shared::{label_from_timezone, SlotStorage};

/// Storage slot holding the JSON clock list
pub const CLOCKS_KEY: &str = "worldclock.clocks.v1";

/// Cosmetic color category, cycled per entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accent {
    #[serde(rename = "accent-aqua")]
    Aqua,
    #[serde(rename = "accent-pink")]
    Pink,
    #[serde(rename = "accent-lime")]
    Lime,
}

/// Palette order used for round-robin assignment
pub const ACCENTS: [Accent; 3] = [Accent::Aqua, Accent::Pink, Accent::Lime];

impl Accent {
    /// Round-robin accent for an insertion index
    pub fn for_index(index: usize) -> Self {
        ACCENTS[index % ACCENTS.len()]
    }
}

/// One selected timezone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockEntry {
    #[serde(rename = "tz")]
    pub timezone_id: String,
    pub label: String,
    pub accent: Accent,
}

/// Outcome of [`ClockStore::toggle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// Loosely typed element used when reading possibly damaged data
#[derive(Deserialize)]
struct StoredEntry {
    #[serde(alias = "timezoneId")]
    tz: String,
    #[serde(default)]
    label: Option<serde_json::Value>,
    #[serde(default, alias = "accentId")]
    accent: Option<serde_json::Value>,
}

/// The three clocks shown on first run or after corruption
pub fn default_entries() -> Vec<ClockEntry> {
    vec![
        ClockEntry {
            timezone_id: "Europe/London".to_string(),
            label: "UK (London)".to_string(),
            accent: Accent::Aqua,
        },
        ClockEntry {
            timezone_id: "America/New_York".to_string(),
            label: "New York City".to_string(),
            accent: Accent::Pink,
        },
        ClockEntry {
            timezone_id: "Asia/Shanghai".to_string(),
            label: "Beijing".to_string(),
            accent: Accent::Lime,
        },
    ]
}

/// Decode the clock slot, `None` when it is not a JSON array
fn decode_entries(raw: &str) -> Option<Vec<ClockEntry>> {
    let items: Vec<serde_json::Value> = serde_json::from_str(raw).ok()?;

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let Ok(stored) = serde_json::from_value::<StoredEntry>(item) else {
            log::debug!("skipping unreadable clock entry at index {}", index);
            continue;
        };
        if !seen.insert(stored.tz.clone()) {
            continue;
        }
        let label = match stored.label {
            Some(serde_json::Value::String(label)) if !label.is_empty() => label,
            _ => label_from_timezone(&stored.tz),
        };
        let accent = stored
            .accent
            .and_then(|value| serde_json::from_value::<Accent>(value).ok())
            .unwrap_or_else(|| Accent::for_index(index));
        entries.push(ClockEntry {
            timezone_id: stored.tz,
            label,
            accent,
        });
    }
    Some(entries)
}

/// Receiving end of a store subscription
///
/// Dropping the feed unsubscribes it.
pub struct ChangeFeed {
    rx: Receiver<Vec<ClockEntry>>,
}

impl ChangeFeed {
    /// Newest pending snapshot, discarding older ones
    pub fn latest(&self) -> Option<Vec<ClockEntry>> {
        self.rx.try_iter().last()
    }
}

impl fmt::Debug for ChangeFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeFeed").finish_non_exhaustive()
    }
}

/// Owner of the clock collection
pub struct ClockStore {
    entries: Vec<ClockEntry>,
    storage: Box<dyn SlotStorage>,
    subscribers: Vec<Sender<Vec<ClockEntry>>>,
}

impl ClockStore {
    /// Load the collection from storage, falling back to the defaults
    pub fn load(storage: Box<dyn SlotStorage>) -> Self {
        let raw = match storage.read_slot(CLOCKS_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("could not read saved clocks: {}", e);
                None
            }
        };

        let entries = match raw.as_deref().map(decode_entries) {
            Some(Some(entries)) => entries,
            Some(None) => {
                log::warn!("saved clocks are corrupt, using defaults");
                default_entries()
            }
            None => default_entries(),
        };
        log::info!("loaded {} clocks", entries.len());

        Self {
            entries,
            storage,
            subscribers: Vec::new(),
        }
    }

    /// Snapshot of the collection in display order
    pub fn entries(&self) -> Vec<ClockEntry> {
        self.entries.clone()
    }

    pub fn contains(&self, timezone_id: &str) -> bool {
        self.entries.iter().any(|e| e.timezone_id == timezone_id)
    }

    /// Remove the zone if present, otherwise add it
    pub fn toggle(&mut self, timezone_id: &str, label: Option<&str>) -> Toggled {
        if self.contains(timezone_id) {
            self.entries.retain(|e| e.timezone_id != timezone_id);
            self.commit();
            Toggled::Removed
        } else {
            self.insert(timezone_id, label);
            self.commit();
            Toggled::Added
        }
    }

    /// Append a zone; returns false if it is already present
    pub fn add(&mut self, timezone_id: &str, label: Option<&str>) -> bool {
        if self.contains(timezone_id) {
            return false;
        }
        self.insert(timezone_id, label);
        self.commit();
        true
    }

    /// Remove a zone; returns false if it was not present
    pub fn remove(&mut self, timezone_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.timezone_id != timezone_id);
        if self.entries.len() == before {
            return false;
        }
        self.commit();
        true
    }

    /// Register for snapshots; the current state is delivered immediately
    pub fn subscribe(&mut self) -> ChangeFeed {
        let (tx, rx) = mpsc::channel();
        // The receiver is alive here, so this send cannot fail
        let _ = tx.send(self.entries());
        self.subscribers.push(tx);
        ChangeFeed { rx }
    }

    fn insert(&mut self, timezone_id: &str, label: Option<&str>) {
        let label = match label {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => label_from_timezone(timezone_id),
        };
        let accent = Accent::for_index(self.entries.len());
        log::debug!("adding clock {} as {:?}", timezone_id, label);
        self.entries.push(ClockEntry {
            timezone_id: timezone_id.to_string(),
            label,
            accent,
        });
    }

    /// Persist, then broadcast the finished state
    fn commit(&mut self) {
        self.persist();
        let snapshot = self.entries();
        self.subscribers
            .retain(|tx| tx.send(snapshot.clone()).is_ok());
    }

    fn persist(&mut self) {
        let encoded = match serde_json::to_string(&self.entries) {
            Ok(encoded) => encoded,
            Err(e) => {
                log::warn!("could not encode clocks: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.write_slot(CLOCKS_KEY, &encoded) {
            log::warn!("could not save clocks: {}", e);
        }
    }
}

impl fmt::Debug for ClockStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockStore")
            .field("entries", &self.entries)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::MemoryStorage;

    fn store_with(raw: Option<&str>) -> (ClockStore, MemoryStorage) {
        let mut storage = MemoryStorage::new();
        if let Some(raw) = raw {
            storage.write_slot(CLOCKS_KEY, raw).unwrap();
        }
        (ClockStore::load(Box::new(storage.clone())), storage)
    }

    fn ids(store: &ClockStore) -> Vec<String> {
        store.entries().into_iter().map(|e| e.timezone_id).collect()
    }

    #[test]
    fn test_missing_slot_uses_defaults() {
        let (store, storage) = store_with(None);
        assert_eq!(store.entries(), default_entries());
        // Loading alone does not write
        assert_eq!(storage.read_slot(CLOCKS_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_slot_uses_defaults() {
        for raw in ["not json at all", "{\"tz\":\"Europe/Paris\"}", "42", "\"Europe/Paris\""] {
            let (store, _) = store_with(Some(raw));
            assert_eq!(store.entries(), default_entries(), "input {:?}", raw);
        }
    }

    #[test]
    fn test_empty_list_is_kept() {
        let (store, _) = store_with(Some("[]"));
        assert!(store.entries().is_empty());
    }

    #[test]
    fn test_damaged_elements_are_repaired() {
        let raw = r#"[
            {"tz": "Asia/Tokyo"},
            {"label": "no zone"},
            {"tz": "Europe/Paris", "label": "Paris!", "accent": "accent-lime"},
            {"tz": "Asia/Tokyo", "label": "dupe"},
            {"timezoneId": "Not/AZone", "label": "Broken", "accentId": "accent-purple"}
        ]"#;
        let (store, _) = store_with(Some(raw));
        let entries = store.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].label, "Tokyo");
        assert_eq!(entries[0].accent, Accent::Aqua);
        assert_eq!(entries[1].label, "Paris!");
        assert_eq!(entries[1].accent, Accent::Lime);
        // Unknown accent falls back to the element's index (4 -> pink)
        assert_eq!(entries[2].timezone_id, "Not/AZone");
        assert_eq!(entries[2].accent, Accent::Pink);
    }

    #[test]
    fn test_non_string_label_is_derived() {
        let raw = r#"[{"tz":"Asia/Tokyo","label":42},{"tz":"Europe/Paris","label":null}]"#;
        let (store, _) = store_with(Some(raw));
        let entries = store.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].timezone_id, "Asia/Tokyo");
        assert_eq!(entries[0].label, "Tokyo");
        assert_eq!(entries[1].label, "Paris");
    }

    #[test]
    fn test_persisted_roundtrip() {
        let (mut store, storage) = store_with(Some("[]"));
        store.add("Europe/Paris", Some("Paris"));
        store.add("America/Argentina/Buenos_Aires", None);
        store.add("Asia/Tokyo", None);
        store.add("Pacific/Auckland", None);

        let reloaded = ClockStore::load(Box::new(storage));
        assert_eq!(reloaded.entries(), store.entries());
        assert_eq!(reloaded.entries()[1].label, "Buenos Aires");
    }

    #[test]
    fn test_accents_cycle_by_insertion_index() {
        let (mut store, _) = store_with(Some("[]"));
        for tz in ["Europe/Paris", "Asia/Tokyo", "Asia/Dubai", "Africa/Cairo"] {
            store.toggle(tz, None);
        }
        let accents: Vec<Accent> = store.entries().iter().map(|e| e.accent).collect();
        assert_eq!(
            accents,
            vec![Accent::Aqua, Accent::Pink, Accent::Lime, Accent::Aqua]
        );
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let (mut store, _) = store_with(None);
        let before = store.entries();

        assert_eq!(store.toggle("Asia/Tokyo", Some("Tokyo")), Toggled::Added);
        assert!(store.contains("Asia/Tokyo"));
        assert_eq!(store.toggle("Asia/Tokyo", None), Toggled::Removed);
        assert_eq!(store.entries(), before);

        assert_eq!(store.toggle("America/New_York", None), Toggled::Removed);
        assert_eq!(ids(&store), vec!["Europe/London", "Asia/Shanghai"]);
    }

    #[test]
    fn test_add_and_remove_no_ops() {
        let (mut store, storage) = store_with(None);
        let mut feed = store.subscribe();
        assert!(feed.latest().is_some());

        assert!(!store.add("Europe/London", None));
        assert!(!store.remove("Asia/Tokyo"));
        assert!(feed.latest().is_none());
        assert_eq!(storage.read_slot(CLOCKS_KEY).unwrap(), None);

        assert!(store.remove("Europe/London"));
        assert_eq!(feed.latest().map(|s| s.len()), Some(2));
        feed = store.subscribe();
        assert_eq!(feed.latest().map(|s| s.len()), Some(2));
    }

    #[test]
    fn test_feeds_receive_full_snapshots() {
        let (mut store, _) = store_with(Some("[]"));
        let first = store.subscribe();
        let second = store.subscribe();
        assert_eq!(first.latest(), Some(vec![]));

        store.add("Asia/Tokyo", None);
        store.add("Asia/Dubai", None);

        // Only the newest snapshot matters to a renderer
        let latest = first.latest().unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(second.latest().unwrap(), latest);
        assert!(first.latest().is_none());
    }

    #[test]
    fn test_dropped_feed_is_pruned() {
        let (mut store, _) = store_with(None);
        let kept = store.subscribe();
        drop(store.subscribe());
        store.remove("Asia/Shanghai");
        assert_eq!(store.subscribers.len(), 1);
        assert!(kept.latest().is_some());
    }

    #[test]
    fn test_serialized_shape() {
        let (mut store, storage) = store_with(Some("[]"));
        store.add("Asia/Tokyo", None);
        let raw = storage.read_slot(CLOCKS_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"[{"tz":"Asia/Tokyo","label":"Tokyo","accent":"accent-aqua"}]"#);
    }
}
