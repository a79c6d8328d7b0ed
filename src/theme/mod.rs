//! Theme vocabulary shared by every layer of the toggle.
//!
//! `Mode` is the only value that is ever persisted or written to the page.
//! `ThemePreference` adds `Auto`, which defers to stored, page and OS signals.

use serde::{Deserialize, Serialize};

/// Key of the persisted choice in origin-scoped storage
pub const STORAGE_KEY: &str = "dm:theme";

/// Name of the cross-context broadcast channel
pub const CHANNEL_NAME: &str = "dm:theme";

/// Attribute written on the root under the attribute strategy
pub const THEME_ATTRIBUTE: &str = "data-theme";

/// Class toggled on the root under the class strategy (unless configured)
pub const DEFAULT_DARK_CLASS: &str = "dark";

/// Accessible name used when no label is configured
pub const DEFAULT_LABEL: &str = "Toggle dark mode";

/// Page-wide event fired after a user toggle
pub const THEME_CHANGE_EVENT: &str = "themechange";

/// Local event fired on the widget after every apply
pub const CHANGE_EVENT: &str = "change";

/// Resolved light/dark value applied to the page
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Light,
    Dark,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Light => "light",
            Mode::Dark => "dark",
        }
    }

    /// Exact parse: anything other than "light" or "dark" is rejected,
    /// including other casings and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Mode::Light),
            "dark" => Some(Mode::Dark),
            _ => None,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Mode::Light => Mode::Dark,
            Mode::Dark => Mode::Light,
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Mode::Dark)
    }

    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Mode::Dark
        } else {
            Mode::Light
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing configuration intent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ThemePreference {
    #[default]
    Auto,
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Auto => "auto",
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    /// Lenient parse of a configuration value: unknown values fall back
    /// to `Auto`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => ThemePreference::Light,
            "dark" => ThemePreference::Dark,
            _ => ThemePreference::Auto,
        }
    }

    /// The explicit override, if any
    pub fn explicit(&self) -> Option<Mode> {
        match self {
            ThemePreference::Auto => None,
            ThemePreference::Light => Some(Mode::Light),
            ThemePreference::Dark => Some(Mode::Dark),
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, ThemePreference::Auto)
    }
}

impl From<Mode> for ThemePreference {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Light => ThemePreference::Light,
            Mode::Dark => ThemePreference::Dark,
        }
    }
}

/// How the resolved mode is marked on the root element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Strategy {
    /// `data-theme="light|dark"`
    #[default]
    Attribute,
    /// A named class present for dark, absent for light
    Class,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Attribute => "attr",
            Strategy::Class => "class",
        }
    }

    /// Lenient parse: anything but "class" is the attribute strategy.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "class" => Strategy::Class,
            _ => Strategy::Attribute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parse_is_strict() {
        assert_eq!(Mode::parse("dark"), Some(Mode::Dark));
        assert_eq!(Mode::parse("light"), Some(Mode::Light));
        assert_eq!(Mode::parse(" Light "), None);
        assert_eq!(Mode::parse("DARK"), None);
        assert_eq!(Mode::parse("  dark\n"), None);
        assert_eq!(Mode::parse("auto"), None);
        assert_eq!(Mode::parse("drak"), None);
        assert_eq!(Mode::parse(""), None);
    }

    #[test]
    fn preference_parse_defaults_to_auto() {
        assert_eq!(ThemePreference::parse("DARK"), ThemePreference::Dark);
        assert_eq!(ThemePreference::parse("auto"), ThemePreference::Auto);
        assert_eq!(ThemePreference::parse("sepia"), ThemePreference::Auto);
        assert_eq!(ThemePreference::Auto.explicit(), None);
        assert_eq!(ThemePreference::Light.explicit(), Some(Mode::Light));
    }

    #[test]
    fn strategy_parse_defaults_to_attribute() {
        assert_eq!(Strategy::parse("class"), Strategy::Class);
        assert_eq!(Strategy::parse("attr"), Strategy::Attribute);
        assert_eq!(Strategy::parse("attribute"), Strategy::Attribute);
        assert_eq!(Strategy::parse("bogus"), Strategy::Attribute);
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Dark).unwrap(), "\"dark\"");
        assert_eq!(Mode::Light.opposite(), Mode::Dark);
    }
}
