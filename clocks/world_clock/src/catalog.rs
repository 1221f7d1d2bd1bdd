//! Static city reference data: the autocomplete catalog and the map cities

use std::collections::HashSet;

/// A city known to the autocomplete catalog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct City {
    pub name: &'static str,
    pub timezone_id: &'static str,
}

/// A city drawn on the world map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCity {
    pub name: &'static str,
    pub timezone_id: &'static str,
    pub latitude: f32,
    pub longitude: f32,
}

const fn city(name: &'static str, timezone_id: &'static str) -> City {
    City { name, timezone_id }
}

pub const CATALOG: &[City] = &[
    city("London", "Europe/London"),
    city("New York", "America/New_York"),
    city("Beijing", "Asia/Shanghai"),
    city("Paris", "Europe/Paris"),
    city("Tokyo", "Asia/Tokyo"),
    city("Sydney", "Australia/Sydney"),
    city("Los Angeles", "America/Los_Angeles"),
    city("Chicago", "America/Chicago"),
    city("Toronto", "America/Toronto"),
    city("Mexico City", "America/Mexico_City"),
    city("São Paulo", "America/Sao_Paulo"),
    city("Buenos Aires", "America/Buenos_Aires"),
    city("Santiago", "America/Santiago"),
    city("Bogota", "America/Bogota"),
    city("Lima", "America/Lima"),
    city("Denver", "America/Denver"),
    city("Phoenix", "America/Phoenix"),
    city("Vancouver", "America/Vancouver"),
    city("Anchorage", "America/Anchorage"),
    city("Honolulu", "Pacific/Honolulu"),
    city("Berlin", "Europe/Berlin"),
    city("Madrid", "Europe/Madrid"),
    city("Rome", "Europe/Rome"),
    city("Amsterdam", "Europe/Amsterdam"),
    city("Zurich", "Europe/Zurich"),
    city("Stockholm", "Europe/Stockholm"),
    city("Oslo", "Europe/Oslo"),
    city("Copenhagen", "Europe/Copenhagen"),
    city("Dublin", "Europe/Dublin"),
    city("Lisbon", "Europe/Lisbon"),
    city("Moscow", "Europe/Moscow"),
    city("Istanbul", "Europe/Istanbul"),
    city("Athens", "Europe/Athens"),
    city("Helsinki", "Europe/Helsinki"),
    city("Vienna", "Europe/Vienna"),
    city("Prague", "Europe/Prague"),
    city("Warsaw", "Europe/Warsaw"),
    city("Budapest", "Europe/Budapest"),
    city("Brussels", "Europe/Brussels"),
    city("Mumbai", "Asia/Kolkata"),
    city("Delhi", "Asia/Kolkata"),
    city("Karachi", "Asia/Karachi"),
    city("Dubai", "Asia/Dubai"),
    city("Riyadh", "Asia/Riyadh"),
    city("Doha", "Asia/Qatar"),
    city("Tel Aviv", "Asia/Jerusalem"),
    city("Cairo", "Africa/Cairo"),
    city("Nairobi", "Africa/Nairobi"),
    city("Lagos", "Africa/Lagos"),
    city("Casablanca", "Africa/Casablanca"),
    city("Johannesburg", "Africa/Johannesburg"),
    city("Singapore", "Asia/Singapore"),
    city("Hong Kong", "Asia/Hong_Kong"),
    city("Taipei", "Asia/Taipei"),
    city("Bangkok", "Asia/Bangkok"),
    city("Kuala Lumpur", "Asia/Kuala_Lumpur"),
    city("Jakarta", "Asia/Jakarta"),
    city("Manila", "Asia/Manila"),
    city("Seoul", "Asia/Seoul"),
    city("Auckland", "Pacific/Auckland"),
    city("Melbourne", "Australia/Melbourne"),
    city("Perth", "Australia/Perth"),
];

/// Kept short so labels stay readable at map scale
pub const MAP_CITIES: &[MapCity] = &[
    MapCity { name: "London", timezone_id: "Europe/London", latitude: 51.5074, longitude: -0.1278 },
    MapCity { name: "New York", timezone_id: "America/New_York", latitude: 40.7128, longitude: -74.006 },
    MapCity { name: "Beijing", timezone_id: "Asia/Shanghai", latitude: 39.9042, longitude: 116.4074 },
    MapCity { name: "Tokyo", timezone_id: "Asia/Tokyo", latitude: 35.6895, longitude: 139.6917 },
    MapCity { name: "Sydney", timezone_id: "Australia/Sydney", latitude: -33.8688, longitude: 151.2093 },
    MapCity { name: "Paris", timezone_id: "Europe/Paris", latitude: 48.8566, longitude: 2.3522 },
    MapCity { name: "Dubai", timezone_id: "Asia/Dubai", latitude: 25.2048, longitude: 55.2708 },
    MapCity { name: "São Paulo", timezone_id: "America/Sao_Paulo", latitude: -23.5505, longitude: -46.6333 },
    MapCity { name: "Johannesburg", timezone_id: "Africa/Johannesburg", latitude: -26.2041, longitude: 28.0473 },
];

/// Upper bound on suggestions shown under the input
pub const MAX_SUGGESTIONS: usize = 12;

/// One autocomplete option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub city: String,
    pub timezone_id: String,
}

impl Suggestion {
    /// "City — Zone/Id"; zones outside the catalog show the bare id
    pub fn display(&self) -> String {
        if self.city.is_empty() {
            self.timezone_id.clone()
        } else {
            format!("{} — {}", self.city, self.timezone_id)
        }
    }
}

/// Sort key that folds the few diacritics the catalog uses
fn sort_key(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// Catalog deduplicated by timezone and sorted by city name
pub fn catalog_suggestions() -> Vec<Suggestion> {
    let mut cities: Vec<&City> = CATALOG.iter().collect();
    cities.sort_by_cached_key(|c| sort_key(c.name));

    let mut seen = HashSet::new();
    cities
        .into_iter()
        .filter(|c| seen.insert(c.timezone_id))
        .map(|c| Suggestion {
            city: c.name.to_string(),
            timezone_id: c.timezone_id.to_string(),
        })
        .collect()
}

/// Suggestions matching what the user has typed so far
///
/// Catalog entries matching by city or id come first; other IANA zones whose
/// id contains the query fill the remainder, up to `limit`.
pub fn filter_suggestions(all: &[Suggestion], query: &str, limit: usize) -> Vec<Suggestion> {
    let needle = sort_key(query.trim());
    if needle.is_empty() {
        return all.iter().take(limit).cloned().collect();
    }

    let mut matches: Vec<Suggestion> = all
        .iter()
        .filter(|s| {
            sort_key(&s.city).contains(&needle) || s.timezone_id.to_lowercase().contains(&needle)
        })
        .take(limit)
        .cloned()
        .collect();

    if matches.len() < limit {
        let known: HashSet<String> = all.iter().map(|s| s.timezone_id.clone()).collect();
        let extra = shared::search_timezones(&needle.replace(' ', "_"))
            .into_iter()
            .filter(|tz| !known.contains(tz.name()))
            .take(limit - matches.len())
            .map(|tz| Suggestion {
                city: String::new(),
                timezone_id: tz.name().to_string(),
            });
        matches.extend(extra);
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_deduplicated_and_sorted() {
        let all = catalog_suggestions();
        let ids: HashSet<&str> = all.iter().map(|s| s.timezone_id.as_str()).collect();
        assert_eq!(ids.len(), all.len());
        assert_eq!(all.first().map(|s| s.city.as_str()), Some("Amsterdam"));

        // Delhi sorts before Mumbai and claims Asia/Kolkata
        assert!(all.iter().any(|s| s.city == "Delhi"));
        assert!(!all.iter().any(|s| s.city == "Mumbai"));

        let santiago = all.iter().position(|s| s.city == "Santiago").unwrap();
        let sao_paulo = all.iter().position(|s| s.city == "São Paulo").unwrap();
        let seoul = all.iter().position(|s| s.city == "Seoul").unwrap();
        assert!(santiago < sao_paulo && sao_paulo < seoul);
    }

    #[test]
    fn test_every_catalog_zone_resolves() {
        for city in CATALOG {
            assert!(shared::is_valid_timezone(city.timezone_id), "{}", city.timezone_id);
        }
        for city in MAP_CITIES {
            assert!(shared::is_valid_timezone(city.timezone_id), "{}", city.timezone_id);
        }
    }

    #[test]
    fn test_filter_by_city_and_id() {
        let all = catalog_suggestions();
        let by_city = filter_suggestions(&all, "sao", MAX_SUGGESTIONS);
        assert_eq!(by_city[0].timezone_id, "America/Sao_Paulo");

        let by_id = filter_suggestions(&all, "asia/tok", MAX_SUGGESTIONS);
        assert_eq!(by_id[0].city, "Tokyo");
        assert_eq!(by_id[0].display(), "Tokyo — Asia/Tokyo");
    }

    #[test]
    fn test_filter_appends_zones_outside_catalog() {
        let all = catalog_suggestions();
        let results = filter_suggestions(&all, "Kathmandu", MAX_SUGGESTIONS);
        assert!(results
            .iter()
            .any(|s| s.timezone_id == "Asia/Kathmandu" && s.city.is_empty()));
    }

    #[test]
    fn test_filter_respects_limit() {
        let all = catalog_suggestions();
        assert_eq!(filter_suggestions(&all, "", 5).len(), 5);
        assert!(filter_suggestions(&all, "europe", 3).len() <= 3);
    }
}
