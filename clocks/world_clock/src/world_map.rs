//! World map - projection, graticule, city markers and their tooltips
//!
//! All geometry here lives in a fixed 1200 x 600 logical space with y
//! growing downward; `drawing` maps it onto the window.

use std::time::Instant;

use chrono::{DateTime, Utc};
use shared::{read_zone_id, Ticker};

use crate::catalog::MapCity;
use crate::land::LandState;
use crate::store::{Accent, ChangeFeed, ClockStore, Toggled};

pub const MAP_WIDTH: f32 = 1200.0;
pub const MAP_HEIGHT: f32 = 600.0;

pub const HALO_RADIUS: f32 = 7.0;
pub const DOT_RADIUS: f32 = 3.5;
/// Pointer distance that still counts as touching a marker
pub const HIT_RADIUS: f32 = 9.0;

const LABEL_OFFSET_X: f32 = 8.0;
const LABEL_OFFSET_Y: f32 = 8.0;
const LABEL_JITTER: f32 = 6.0;

/// Equirectangular projection of (longitude, latitude) to map pixels
pub fn project(longitude: f32, latitude: f32) -> (f32, f32) {
    let x = (longitude + 180.0) / 360.0 * MAP_WIDTH;
    let y = (90.0 - latitude) / 180.0 * MAP_HEIGHT;
    (x, y)
}

/// One graticule line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub start: (f32, f32),
    pub end: (f32, f32),
    /// Equator and the 0°/±90°/180° meridians
    pub major: bool,
}

/// Meridians every 30°, parallels every 30° within ±60°
pub fn graticule() -> Vec<GridLine> {
    let meridians = (-180..=180).step_by(30).map(|lon: i32| {
        let (x, _) = project(lon as f32, 0.0);
        GridLine {
            start: (x, 0.0),
            end: (x, MAP_HEIGHT),
            major: lon % 90 == 0,
        }
    });
    let parallels = (-60..=60).step_by(30).map(|lat: i32| {
        let (_, y) = project(0.0, lat as f32);
        GridLine {
            start: (0.0, y),
            end: (MAP_WIDTH, y),
            major: lat == 0,
        }
    });
    meridians.chain(parallels).collect()
}

/// Horizontal anchoring of a marker label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAnchor {
    /// Text starts at the anchor point (left half of the map)
    Start,
    /// Text ends at the anchor point (right half of the map)
    End,
}

/// Visual state of one city marker
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerView {
    pub name: &'static str,
    pub timezone_id: &'static str,
    pub x: f32,
    pub y: f32,
    pub label_x: f32,
    pub label_y: f32,
    pub anchor: LabelAnchor,
    pub accent: Accent,
    pub selected: bool,
    pub tooltip: String,
}

impl MarkerView {
    /// Squared distance check against the hit radius
    pub fn hit(&self, x: f32, y: f32) -> bool {
        let (dx, dy) = (x - self.x, y - self.y);
        dx * dx + dy * dy <= HIT_RADIUS * HIT_RADIUS
    }
}

/// "City — HH:MM:SS (ABBR)", or just the city when the zone fails
pub fn tooltip_text(name: &str, timezone_id: &str, now: DateTime<Utc>) -> String {
    match read_zone_id(timezone_id, now) {
        Ok(reading) => format!("{} — {} ({})", name, reading.time, reading.abbreviation),
        Err(_) => name.to_string(),
    }
}

/// Place markers and labels for a city list
///
/// Labels flip sides at the map's midline and are jittered vertically in a
/// repeating three-step pattern so neighbours don't collide.
pub fn layout_markers(cities: &[MapCity]) -> Vec<MarkerView> {
    cities
        .iter()
        .enumerate()
        .map(|(i, city)| {
            let (x, y) = project(city.longitude, city.latitude);
            let jitter = ((i % 3) as f32 - 1.0) * LABEL_JITTER;
            let anchor = if x > MAP_WIDTH / 2.0 {
                LabelAnchor::End
            } else {
                LabelAnchor::Start
            };
            let label_x = match anchor {
                LabelAnchor::End => x - LABEL_OFFSET_X,
                LabelAnchor::Start => x + LABEL_OFFSET_X,
            };
            MarkerView {
                name: city.name,
                timezone_id: city.timezone_id,
                x,
                y,
                label_x,
                label_y: y - LABEL_OFFSET_Y + jitter,
                anchor,
                accent: Accent::for_index(i),
                selected: false,
                tooltip: city.name.to_string(),
            }
        })
        .collect()
}

/// Renderer state for the map region
#[derive(Debug)]
pub struct WorldMap {
    feed: ChangeFeed,
    grid: Vec<GridLine>,
    markers: Vec<MarkerView>,
    land: LandState,
    ticker: Ticker,
}

impl WorldMap {
    pub fn new(feed: ChangeFeed, cities: &[MapCity], land: LandState) -> Self {
        Self {
            feed,
            grid: graticule(),
            markers: layout_markers(cities),
            land,
            ticker: Ticker::every_second(),
        }
    }

    pub fn grid(&self) -> &[GridLine] {
        &self.grid
    }

    pub fn markers(&self) -> &[MarkerView] {
        &self.markers
    }

    pub fn land(&self) -> &LandState {
        &self.land
    }

    /// Apply the newest store broadcast to the markers' selected state
    pub fn sync(&mut self) -> bool {
        let Some(entries) = self.feed.latest() else {
            return false;
        };
        for marker in &mut self.markers {
            marker.selected = entries.iter().any(|e| e.timezone_id == marker.timezone_id);
        }
        true
    }

    /// Check on the land fetch
    pub fn poll_land(&mut self) -> bool {
        self.land.poll()
    }

    /// Recompute every tooltip when the one-second ticker fires
    pub fn tick(&mut self, instant: Instant, now: DateTime<Utc>) -> bool {
        if !self.ticker.poll(instant) {
            return false;
        }
        for marker in &mut self.markers {
            marker.tooltip = tooltip_text(marker.name, marker.timezone_id, now);
        }
        true
    }

    /// Index of the marker under a map-space point, topmost (last drawn) first
    pub fn marker_index_at(&self, x: f32, y: f32) -> Option<usize> {
        self.markers.iter().rposition(|m| m.hit(x, y))
    }

    pub fn marker_at(&self, x: f32, y: f32) -> Option<&MarkerView> {
        self.marker_index_at(x, y).map(|i| &self.markers[i])
    }

    /// Toggle the clicked marker's zone, labelled with its city name
    ///
    /// Markers are pre-vetted zones, so the form's validation is skipped.
    pub fn click(&self, x: f32, y: f32, store: &mut ClockStore) -> Option<Toggled> {
        let marker = self.marker_at(x, y)?;
        let outcome = store.toggle(marker.timezone_id, Some(marker.name));
        log::debug!("map click on {}: {:?}", marker.name, outcome);
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shared::{MemoryStorage, SlotStorage};

    use crate::catalog::MAP_CITIES;
    use crate::store::CLOCKS_KEY;

    fn store(raw: &str) -> ClockStore {
        let mut storage = MemoryStorage::new();
        storage.write_slot(CLOCKS_KEY, raw).unwrap();
        ClockStore::load(Box::new(storage))
    }

    #[test]
    fn test_projection_corners() {
        assert_eq!(project(-180.0, 90.0), (0.0, 0.0));
        assert_eq!(project(180.0, -90.0), (MAP_WIDTH, MAP_HEIGHT));
        assert_eq!(project(0.0, 0.0), (600.0, 300.0));
    }

    #[test]
    fn test_graticule_lines() {
        let grid = graticule();
        let meridians: Vec<_> = grid.iter().filter(|l| l.start.1 == 0.0).collect();
        let parallels: Vec<_> = grid.iter().filter(|l| l.start.0 == 0.0 && l.end.0 == MAP_WIDTH).collect();
        assert_eq!(meridians.len(), 13);
        assert_eq!(parallels.len(), 5);
        // -180, -90, 0, 90, 180 and the equator
        assert_eq!(grid.iter().filter(|l| l.major).count(), 6);
        let equator = parallels.iter().find(|l| l.major).unwrap();
        assert_eq!(equator.start.1, 300.0);
    }

    #[test]
    fn test_marker_layout() {
        let markers = layout_markers(MAP_CITIES);
        assert_eq!(markers.len(), MAP_CITIES.len());

        let london = &markers[0];
        assert_eq!(london.anchor, LabelAnchor::Start);
        assert_eq!(london.label_x, london.x + 8.0);
        assert_eq!(london.label_y, london.y - 8.0 - 6.0);
        assert_eq!(london.accent, Accent::Aqua);

        let new_york = &markers[1];
        assert_eq!(new_york.label_y, new_york.y - 8.0);

        let beijing = &markers[2];
        assert_eq!(beijing.anchor, LabelAnchor::End);
        assert_eq!(beijing.label_x, beijing.x - 8.0);
        assert_eq!(beijing.label_y, beijing.y - 8.0 + 6.0);
        assert_eq!(beijing.accent, Accent::Lime);
    }

    #[test]
    fn test_tooltip_text() {
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 10, 0, 0).unwrap();
        assert_eq!(
            tooltip_text("London", "Europe/London", now),
            "London — 11:00:00 (BST)"
        );
        assert_eq!(tooltip_text("Atlantis", "Ocean/Atlantis", now), "Atlantis");
    }

    #[test]
    fn test_click_toggles_membership_and_selection() {
        let mut store = store(r#"[{"tz":"Europe/London","label":"UK (London)"}]"#);
        let mut map = WorldMap::new(store.subscribe(), MAP_CITIES, LandState::Unavailable);
        map.sync();
        assert!(map.markers()[0].selected);
        assert!(!map.markers()[3].selected);

        // London is selected: a click removes it
        let (x, y) = (map.markers()[0].x + 2.0, map.markers()[0].y - 2.0);
        assert_eq!(map.click(x, y, &mut store), Some(Toggled::Removed));
        assert!(!store.contains("Europe/London"));
        assert!(map.sync());
        assert!(!map.markers()[0].selected);

        // Tokyo is not: a click adds it with the city name
        let (x, y) = (map.markers()[3].x, map.markers()[3].y);
        assert_eq!(map.click(x, y, &mut store), Some(Toggled::Added));
        let entries = store.entries();
        assert_eq!(entries[0].timezone_id, "Asia/Tokyo");
        assert_eq!(entries[0].label, "Tokyo");
        map.sync();
        assert!(map.markers()[3].selected);
    }

    #[test]
    fn test_click_on_empty_water() {
        let mut store = store("[]");
        let map = WorldMap::new(store.subscribe(), MAP_CITIES, LandState::Unavailable);
        assert_eq!(map.click(5.0, 590.0, &mut store), None);
        assert!(store.entries().is_empty());
    }

    #[test]
    fn test_tick_refreshes_tooltips() {
        let mut store = store("[]");
        let mut map = WorldMap::new(store.subscribe(), MAP_CITIES, LandState::Unavailable);
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert!(map.tick(Instant::now(), now));
        assert_eq!(map.markers()[3].tooltip, "Tokyo — 09:00:00 (JST)");
    }
}
