//! Theme handling (system/light/dark) with persistence
//!
//! The manager only decides *what* should be applied; the window and the
//! drawing palette read the resulting [`AppliedTheme`].

use std::fmt;
use std::str::FromStr;

use shared::SlotStorage;

/// Storage slot holding the plain-text preference
pub const THEME_KEY: &str = "worldclock.theme";

/// Title-bar tint used for an explicit dark preference
pub const DARK_CHROME: &str = "#0d0f1a";
/// Title-bar tint used for an explicit light preference
pub const LIGHT_CHROME: &str = "#f3f7ff";

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    #[default]
    System,
    Light,
    Dark,
}

impl ThemePreference {
    /// Cycle order: system -> light -> dark -> system
    pub fn next(self) -> Self {
        match self {
            ThemePreference::System => ThemePreference::Light,
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::System,
        }
    }

    /// Text shown on the toggle control
    pub fn label(self) -> &'static str {
        match self {
            ThemePreference::System => "System",
            ThemePreference::Light => "Light",
            ThemePreference::Dark => "Dark",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ThemePreference::System => "system",
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "system" => Ok(ThemePreference::System),
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            other => Err(format!("unknown theme preference: {}", other)),
        }
    }
}

/// A concrete light or dark appearance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    pub fn chrome_color(self) -> &'static str {
        match self {
            ColorScheme::Light => LIGHT_CHROME,
            ColorScheme::Dark => DARK_CHROME,
        }
    }
}

/// Result of applying a preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedTheme {
    /// Explicit override marker; `None` lets styling follow the OS
    pub marker: Option<ColorScheme>,
    /// Appearance the palette should use right now
    pub scheme: ColorScheme,
    /// Window chrome override; absent under `system`
    pub chrome: Option<ColorScheme>,
    /// Toggle control text
    pub label: &'static str,
}

impl AppliedTheme {
    pub fn resolve(preference: ThemePreference, os_scheme: ColorScheme) -> Self {
        match preference {
            ThemePreference::System => Self {
                marker: None,
                scheme: os_scheme,
                chrome: None,
                label: preference.label(),
            },
            ThemePreference::Light | ThemePreference::Dark => {
                let scheme = if preference == ThemePreference::Dark {
                    ColorScheme::Dark
                } else {
                    ColorScheme::Light
                };
                Self {
                    marker: Some(scheme),
                    scheme,
                    chrome: Some(scheme),
                    label: preference.label(),
                }
            }
        }
    }

    /// Hover text for the toggle control
    pub fn title(&self) -> String {
        format!("Theme: {}", self.label)
    }
}

/// Holds the preference, the last OS signal and the applied result
pub struct ThemeManager {
    preference: ThemePreference,
    os_scheme: ColorScheme,
    applied: AppliedTheme,
    storage: Box<dyn SlotStorage>,
}

impl ThemeManager {
    /// Read the stored preference (default `system`) and apply it
    pub fn load(storage: Box<dyn SlotStorage>, os_scheme: ColorScheme) -> Self {
        let preference = match storage.read_slot(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
                log::warn!("{}, using system", e);
                ThemePreference::System
            }),
            Ok(None) => ThemePreference::System,
            Err(e) => {
                log::warn!("could not read theme preference: {}", e);
                ThemePreference::System
            }
        };

        Self {
            preference,
            os_scheme,
            applied: AppliedTheme::resolve(preference, os_scheme),
            storage,
        }
    }

    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    pub fn applied(&self) -> AppliedTheme {
        self.applied
    }

    /// Advance to the next preference, persist it and re-apply
    pub fn toggle(&mut self) -> AppliedTheme {
        self.preference = self.preference.next();
        if let Err(e) = self
            .storage
            .write_slot(THEME_KEY, &self.preference.to_string())
        {
            log::warn!("could not save theme preference: {}", e);
        }
        log::debug!("theme preference now {}", self.preference);
        self.applied = AppliedTheme::resolve(self.preference, self.os_scheme);
        self.applied
    }

    /// Record an OS scheme change; returns true when the applied theme moved
    ///
    /// Explicit preferences ignore the OS until the user returns to `system`.
    pub fn os_scheme_changed(&mut self, scheme: ColorScheme) -> bool {
        self.os_scheme = scheme;
        if self.preference != ThemePreference::System {
            return false;
        }
        let applied = AppliedTheme::resolve(self.preference, scheme);
        let changed = applied != self.applied;
        self.applied = applied;
        changed
    }
}

impl fmt::Debug for ThemeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeManager")
            .field("preference", &self.preference)
            .field("os_scheme", &self.os_scheme)
            .field("applied", &self.applied)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::MemoryStorage;

    fn manager(stored: Option<&str>, os: ColorScheme) -> (ThemeManager, MemoryStorage) {
        let mut storage = MemoryStorage::new();
        if let Some(stored) = stored {
            storage.write_slot(THEME_KEY, stored).unwrap();
        }
        (ThemeManager::load(Box::new(storage.clone()), os), storage)
    }

    #[test]
    fn test_defaults_to_system() {
        let (theme, _) = manager(None, ColorScheme::Dark);
        assert_eq!(theme.preference(), ThemePreference::System);
        let applied = theme.applied();
        assert_eq!(applied.scheme, ColorScheme::Dark);
        assert_eq!(applied.marker, None);
        assert_eq!(applied.chrome, None);
        assert_eq!(applied.label, "System");
    }

    #[test]
    fn test_unknown_stored_value_is_system() {
        let (theme, _) = manager(Some("sepia"), ColorScheme::Light);
        assert_eq!(theme.preference(), ThemePreference::System);
    }

    #[test]
    fn test_three_toggles_return_to_system() {
        let (mut theme, storage) = manager(None, ColorScheme::Light);

        let light = theme.toggle();
        assert_eq!(light.label, "Light");
        assert_eq!(light.chrome, Some(ColorScheme::Light));
        assert_eq!(storage.read_slot(THEME_KEY).unwrap().as_deref(), Some("light"));

        let dark = theme.toggle();
        assert_eq!(dark.marker, Some(ColorScheme::Dark));
        assert_eq!(dark.chrome.map(ColorScheme::chrome_color), Some(DARK_CHROME));
        assert_eq!(dark.title(), "Theme: Dark");

        let system = theme.toggle();
        assert_eq!(system.label, "System");
        assert_eq!(system.chrome, None);
        assert_eq!(theme.preference(), ThemePreference::System);
        assert_eq!(storage.read_slot(THEME_KEY).unwrap().as_deref(), Some("system"));
    }

    #[test]
    fn test_os_change_under_system_reapplies() {
        let (mut theme, _) = manager(Some("system"), ColorScheme::Light);
        assert!(theme.os_scheme_changed(ColorScheme::Dark));
        assert_eq!(theme.applied().scheme, ColorScheme::Dark);
        assert!(!theme.os_scheme_changed(ColorScheme::Dark));
    }

    #[test]
    fn test_os_change_ignored_when_explicit() {
        for stored in ["light", "dark"] {
            let (mut theme, _) = manager(Some(stored), ColorScheme::Light);
            let before = theme.applied();
            assert!(!theme.os_scheme_changed(ColorScheme::Dark));
            assert!(!theme.os_scheme_changed(ColorScheme::Light));
            assert_eq!(theme.applied(), before);
        }
    }

    #[test]
    fn test_returning_to_system_uses_latest_os_scheme() {
        let (mut theme, _) = manager(Some("dark"), ColorScheme::Light);
        theme.os_scheme_changed(ColorScheme::Dark);
        // dark -> system
        let applied = theme.toggle();
        assert_eq!(applied.scheme, ColorScheme::Dark);
        assert_eq!(applied.marker, None);
    }
}
