//! Precedence of the signals that decide the effective mode.
//!
//! Exercised two ways: the pure chain in `resolver`, and end to end through
//! a freshly attached toggle in a simulated page.

mod harness;

use dark_mode_toggle::dom::{FixedColorScheme, MemoryDocument, MemoryElement, Mutation, RootElement};
use dark_mode_toggle::resolver::{resolve, resolve_signals};
use dark_mode_toggle::store::MemoryStore;
use dark_mode_toggle::theme::{STORAGE_KEY, THEME_ATTRIBUTE};
use dark_mode_toggle::{Mode, Strategy, ThemePreference};
use harness::Origin;

const MODES: [Option<Mode>; 3] = [None, Some(Mode::Light), Some(Mode::Dark)];

#[test]
fn test_explicit_preference_dominates() {
    for explicit in [Mode::Light, Mode::Dark] {
        for persisted in MODES {
            for marker in MODES {
                for os_dark in [false, true] {
                    assert_eq!(
                        resolve_signals(explicit.into(), persisted, marker, os_dark),
                        explicit,
                        "persisted={:?} marker={:?} os_dark={}",
                        persisted,
                        marker,
                        os_dark
                    );
                }
            }
        }
    }
}

#[test]
fn test_persisted_choice_beats_root_and_os() {
    for persisted in [Mode::Light, Mode::Dark] {
        for marker in MODES {
            for os_dark in [false, true] {
                assert_eq!(
                    resolve_signals(ThemePreference::Auto, Some(persisted), marker, os_dark),
                    persisted
                );
            }
        }
    }
}

#[test]
fn test_root_marker_beats_os() {
    for os_dark in [false, true] {
        assert_eq!(
            resolve_signals(ThemePreference::Auto, None, Some(Mode::Dark), os_dark),
            Mode::Dark
        );
        assert_eq!(
            resolve_signals(ThemePreference::Auto, None, Some(Mode::Light), os_dark),
            Mode::Light
        );
    }
}

#[test]
fn test_os_is_the_fallback() {
    assert_eq!(resolve_signals(ThemePreference::Auto, None, None, true), Mode::Dark);
    assert_eq!(resolve_signals(ThemePreference::Auto, None, None, false), Mode::Light);
}

#[test]
fn test_live_resolution_ignores_corrupt_store_value() {
    let store = MemoryStore::with_choice("purple");
    let root = MemoryElement::new();
    root.external_set_attribute(THEME_ATTRIBUTE, "dark");

    let mode = resolve(
        ThemePreference::Auto,
        &root,
        Strategy::Attribute,
        "dark",
        &store,
        &FixedColorScheme::new(false),
    );
    assert_eq!(mode, Mode::Dark);
}

#[test]
fn test_stored_value_in_other_casing_falls_through() {
    let os = FixedColorScheme::new(false);

    // Root marker takes over
    let store = MemoryStore::with_choice("DARK");
    let root = MemoryElement::new();
    root.external_set_attribute(THEME_ATTRIBUTE, "light");
    assert_eq!(
        resolve(ThemePreference::Auto, &root, Strategy::Attribute, "dark", &store, &os),
        Mode::Light
    );

    // No marker either: the OS decides
    let store = MemoryStore::with_choice("  dark\n");
    let root = MemoryElement::new();
    assert_eq!(
        resolve(ThemePreference::Auto, &root, Strategy::Attribute, "dark", &store, &os),
        Mode::Light
    );

    // A marker in another casing is no marker
    let store = MemoryStore::new();
    let root = MemoryElement::new();
    root.external_set_attribute(THEME_ATTRIBUTE, "Dark");
    assert_eq!(
        resolve(ThemePreference::Auto, &root, Strategy::Attribute, "dark", &store, &os),
        Mode::Light
    );
}

#[test]
fn test_marker_only_counts_under_active_strategy() {
    let store = MemoryStore::new();
    let root = MemoryElement::new();
    root.external_set_class("dark", true);
    let os = FixedColorScheme::new(false);

    assert_eq!(
        resolve(ThemePreference::Auto, &root, Strategy::Class, "dark", &store, &os),
        Mode::Dark
    );
    assert_eq!(
        resolve(ThemePreference::Auto, &root, Strategy::Attribute, "dark", &store, &os),
        Mode::Light
    );
}

#[test]
fn test_attach_with_persisted_dark_marks_unmarked_root() {
    let mut origin = Origin::new(false);
    origin.store.put(STORAGE_KEY, "dark");

    let tab = origin.open(&[("strategy", "attr")]);

    let tab = origin.tab(tab);
    assert_eq!(tab.toggle.mode(), Mode::Dark);
    assert_eq!(tab.toggle.displayed(), Mode::Dark);
    assert_eq!(tab.root().attribute(THEME_ATTRIBUTE).as_deref(), Some("dark"));
    assert_eq!(tab.root().color_scheme(), Some(Mode::Dark));
}

#[test]
fn test_server_rendered_marker_wins_over_os() {
    let mut origin = Origin::new(true);
    let document = MemoryDocument::new();
    document.root().external_set_attribute(THEME_ATTRIBUTE, "light");

    let tab = origin.open_with(document, &[]);

    assert_eq!(origin.tab(tab).toggle.displayed(), Mode::Light);
    // A light marker is not taken as an explicit choice
    assert_eq!(origin.store.peek(STORAGE_KEY), None);
}

#[test]
fn test_explicit_theme_attribute_ignores_everything_else() {
    let mut origin = Origin::new(true);
    origin.store.put(STORAGE_KEY, "dark");
    let document = MemoryDocument::new();
    document.root().external_set_class("dark", true);

    let tab = origin.open_with(document, &[("theme", "light"), ("strategy", "class")]);

    let tab = origin.tab(tab);
    assert_eq!(tab.toggle.displayed(), Mode::Light);
    assert!(!tab.root().has_class("dark"));
}

#[test]
fn test_apply_is_idempotent() {
    let mut origin = Origin::new(false);
    let index = origin.open(&[("theme", "dark"), ("strategy", "class")]);
    let root = origin.tab(index).root();
    let first = root.take_mutations();
    assert!(first.contains(&Mutation::AddClass("dark".into())));

    // Re-applying the same configuration changes nothing on the root
    let config = origin.tab(index).toggle.config().clone();
    origin.tab_mut(index).toggle.reconfigure(config);

    assert!(root.take_mutations().is_empty());
    assert_eq!(root.classes(), vec!["dark".to_string()]);
    assert_eq!(root.attribute(THEME_ATTRIBUTE), None);
}
