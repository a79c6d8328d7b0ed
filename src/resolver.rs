//! Effective mode resolution.
//!
//! Precedence, highest first:
//! 1. explicit preference (`light` / `dark`)
//! 2. persisted choice in the Preference Store
//! 3. marker already present on the root (server-rendered or set by a script)
//! 4. OS `prefers-color-scheme`
//!
//! The chain is total: some mode is always returned.

use crate::dom::{read_marker, ColorSchemeQuery, RootElement};
use crate::store::{read_choice, PreferenceStore};
use crate::theme::{Mode, Strategy, ThemePreference};

/// The precedence chain over already-gathered signals.
pub fn resolve_signals(
    preference: ThemePreference,
    persisted: Option<Mode>,
    root_marker: Option<Mode>,
    os_prefers_dark: bool,
) -> Mode {
    preference
        .explicit()
        .or(persisted)
        .or(root_marker)
        .unwrap_or_else(|| Mode::from_dark(os_prefers_dark))
}

/// Resolve against the live store, root and OS signal.
///
/// Signals below an explicit preference are only read when needed.
pub fn resolve(
    preference: ThemePreference,
    root: &dyn RootElement,
    strategy: Strategy,
    dark_class: &str,
    store: &dyn PreferenceStore,
    os: &dyn ColorSchemeQuery,
) -> Mode {
    if let Some(mode) = preference.explicit() {
        return mode;
    }
    if let Some(mode) = read_choice(store) {
        return mode;
    }
    if let Some(mode) = read_marker(root, strategy, dark_class) {
        return mode;
    }
    Mode::from_dark(os.prefers_dark())
}
