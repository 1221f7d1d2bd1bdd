//! Time Engine - timezone resolution and zone-local readings
//!
//! Everything that turns an instant plus an IANA identifier into display text
//! goes through here, so cards and map tooltips format time identically.

use chrono::{DateTime, Offset, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Placeholder shown in place of the time when a zone cannot be resolved
pub const INVALID_TIMEZONE: &str = "Invalid timezone";

/// 24-hour clock, zero padded
const TIME_FORMAT: &str = "%H:%M:%S";
/// Short weekday, short month, zero-padded day, full year
const DATE_FORMAT: &str = "%a, %b %d, %Y";

/// Errors raised while resolving timezones
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// The identifier is not a known IANA timezone
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Formatted zone-local view of a single instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneReading {
    /// Time of day as "HH:MM:SS"
    pub time: String,
    /// Date as "Mon, Jan 05, 2026"
    pub date: String,
    /// Short zone name in effect at the instant (e.g., "GMT", "BST")
    pub abbreviation: String,
    /// UTC offset in minutes (e.g., -300 for UTC-5)
    pub utc_offset_minutes: i32,
}

impl ZoneReading {
    /// Format the UTC offset as "UTC±hh:mm"
    pub fn format_utc_offset(&self) -> String {
        let sign = if self.utc_offset_minutes >= 0 { "+" } else { "-" };
        let abs_minutes = self.utc_offset_minutes.abs();
        format!("UTC{}{:02}:{:02}", sign, abs_minutes / 60, abs_minutes % 60)
    }
}

/// Read the zone-local time, date and abbreviation for an instant
pub fn read_zone(tz: Tz, at: DateTime<Utc>) -> ZoneReading {
    let local = at.with_timezone(&tz);

    // Abbreviations shift across DST boundaries, so they are never cached
    ZoneReading {
        time: local.format(TIME_FORMAT).to_string(),
        date: local.format(DATE_FORMAT).to_string(),
        abbreviation: local.format("%Z").to_string(),
        utc_offset_minutes: local.offset().fix().local_minus_utc() / 60,
    }
}

/// Resolve an identifier and read it, failing for unknown zones
pub fn read_zone_id(timezone_id: &str, at: DateTime<Utc>) -> Result<ZoneReading, TimeError> {
    parse_timezone(timezone_id).map(|tz| read_zone(tz, at))
}

/// Parse a timezone string into a Tz
///
/// Letter case is not significant: `asia/tokyo` resolves to `Asia/Tokyo`.
pub fn parse_timezone(tz_str: &str) -> Result<Tz, TimeError> {
    tz_str
        .parse::<Tz>()
        .or_else(|_| Tz::from_str_insensitive(tz_str))
        .map_err(|_| TimeError::UnknownTimezone(tz_str.to_string()))
}

/// Whether the identifier names a resolvable timezone
pub fn is_valid_timezone(tz_str: &str) -> bool {
    parse_timezone(tz_str).is_ok()
}

/// Human label for a zone: its last path segment with underscores as spaces
///
/// `America/New_York` becomes `New York`. An identifier with an empty
/// trailing segment falls back to the identifier itself.
pub fn label_from_timezone(timezone_id: &str) -> String {
    let city = timezone_id
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .replace('_', " ");
    if city.is_empty() {
        timezone_id.to_string()
    } else {
        city
    }
}

/// Search timezones by name (case-insensitive partial match)
pub fn search_timezones(query: &str) -> Vec<Tz> {
    let query_lower = query.to_lowercase();
    chrono_tz::TZ_VARIANTS
        .iter()
        .filter(|tz| tz.name().to_lowercase().contains(&query_lower))
        .copied()
        .collect()
}
