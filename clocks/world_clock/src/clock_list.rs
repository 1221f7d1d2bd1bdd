//! Clock list - card view models, the per-second refresh and the add form
//!
//! Cards are rebuilt wholesale when the store broadcasts and only have their
//! text refreshed on each tick.

use std::time::Instant;

use chrono::{DateTime, Utc};
use shared::{parse_timezone, read_zone_id, Ticker, INVALID_TIMEZONE};
use thiserror::Error;

use crate::catalog::{catalog_suggestions, filter_suggestions, Suggestion, MAX_SUGGESTIONS};
use crate::store::{Accent, ChangeFeed, ClockEntry, ClockStore};

/// Visual state of one clock card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub timezone_id: String,
    pub label: String,
    pub accent: Accent,
    pub time: String,
    pub date: String,
    pub abbreviation: String,
    /// "UTC±hh:mm" at the last refresh
    pub utc_offset: String,
    /// False when the zone could not be resolved
    pub valid: bool,
}

impl CardView {
    fn new(entry: &ClockEntry, now: DateTime<Utc>) -> Self {
        let mut card = Self {
            timezone_id: entry.timezone_id.clone(),
            label: entry.label.clone(),
            accent: entry.accent,
            time: String::new(),
            date: String::new(),
            abbreviation: String::new(),
            utc_offset: String::new(),
            valid: false,
        };
        card.refresh(now);
        card
    }

    /// Recompute the live text for `now`
    pub fn refresh(&mut self, now: DateTime<Utc>) {
        match read_zone_id(&self.timezone_id, now) {
            Ok(reading) => {
                self.utc_offset = reading.format_utc_offset();
                self.time = reading.time;
                self.date = reading.date;
                self.abbreviation = reading.abbreviation;
                self.valid = true;
            }
            Err(_) => {
                self.time = INVALID_TIMEZONE.to_string();
                self.date.clear();
                self.abbreviation.clear();
                self.utc_offset.clear();
                self.valid = false;
            }
        }
    }
}

/// Map the store's collection to cards, in collection order
pub fn build_cards(entries: &[ClockEntry], now: DateTime<Utc>) -> Vec<CardView> {
    entries.iter().map(|entry| CardView::new(entry, now)).collect()
}

/// Rejections raised by the add form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AddClockError {
    #[error("Enter a timezone such as Europe/Paris")]
    Empty,
    #[error("Unknown timezone. Use a valid IANA timezone like Europe/Paris")]
    UnknownTimezone,
    #[error("Clock already added")]
    Duplicate,
}

/// Check typed input before it reaches the store; returns the canonical id
pub fn validate_submission(input: &str, store: &ClockStore) -> Result<String, AddClockError> {
    let typed = input.trim();
    if typed.is_empty() {
        return Err(AddClockError::Empty);
    }
    let timezone_id = parse_timezone(typed)
        .map_err(|_| AddClockError::UnknownTimezone)?
        .name();
    if store.contains(timezone_id) {
        return Err(AddClockError::Duplicate);
    }
    Ok(timezone_id.to_string())
}

/// Free-text timezone entry with autocomplete
#[derive(Debug, Clone)]
pub struct AddForm {
    pub input: String,
    error: Option<AddClockError>,
    catalog: Vec<Suggestion>,
    suggestions: Vec<Suggestion>,
}

impl Default for AddForm {
    fn default() -> Self {
        Self::new()
    }
}

impl AddForm {
    pub fn new() -> Self {
        let catalog = catalog_suggestions();
        let suggestions = filter_suggestions(&catalog, "", MAX_SUGGESTIONS);
        Self {
            input: String::new(),
            error: None,
            catalog,
            suggestions,
        }
    }

    /// Validation message currently shown at the input
    pub fn error(&self) -> Option<AddClockError> {
        self.error
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// Called after every keystroke: clears the message and re-filters
    pub fn edited(&mut self) {
        self.error = None;
        self.suggestions = filter_suggestions(&self.catalog, &self.input, MAX_SUGGESTIONS);
    }

    /// Fill the input from a chosen suggestion
    pub fn choose(&mut self, suggestion: &Suggestion) {
        self.input = suggestion.timezone_id.clone();
        self.edited();
    }

    /// Validate and add; the input is cleared on success
    pub fn submit(&mut self, store: &mut ClockStore) -> Result<(), AddClockError> {
        match validate_submission(&self.input, store) {
            Ok(timezone_id) => {
                store.add(&timezone_id, None);
                self.input.clear();
                self.edited();
                Ok(())
            }
            Err(e) => {
                self.error = Some(e);
                Err(e)
            }
        }
    }
}

/// Renderer state for the clock list region
#[derive(Debug)]
pub struct ClockList {
    feed: ChangeFeed,
    cards: Vec<CardView>,
    ticker: Ticker,
    pub form: AddForm,
}

impl ClockList {
    pub fn new(feed: ChangeFeed) -> Self {
        Self {
            feed,
            cards: Vec::new(),
            ticker: Ticker::every_second(),
            form: AddForm::new(),
        }
    }

    pub fn cards(&self) -> &[CardView] {
        &self.cards
    }

    /// Rebuild from the newest broadcast, if any; returns true on rebuild
    pub fn sync(&mut self, now: DateTime<Utc>) -> bool {
        match self.feed.latest() {
            Some(entries) => {
                self.cards = build_cards(&entries, now);
                true
            }
            None => false,
        }
    }

    /// Refresh card text when the one-second ticker fires
    pub fn tick(&mut self, instant: Instant, now: DateTime<Utc>) -> bool {
        if !self.ticker.poll(instant) {
            return false;
        }
        for card in &mut self.cards {
            card.refresh(now);
        }
        true
    }
}
