//! Shared UI components for the Dioxus fullstack web UI.

pub mod toggle;

pub use toggle::{DarkModeToggle, DarkModeToggleProps, TOGGLE_STYLES};
