//! Dark Mode Toggle
//!
//! A light/dark theme switch that persists the user's choice and keeps every
//! tab and instance of the same origin in sync.
//!
//! This library provides:
//! - Theme resolution (explicit choice > stored choice > page markup > OS)
//! - Synchronization to the Preference Store, other contexts and the page root
//! - A Dioxus `DarkModeToggle` component with browser bindings (wasm32)
//! - A server-rendered demo page (server feature)

pub mod app;
pub mod bus;
pub mod config;
pub mod dom;
pub mod resolver;
pub mod store;
pub mod theme;
pub mod toggle;
#[cfg(feature = "server")]
pub mod ui;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::ToggleConfig;
pub use theme::{Mode, Strategy, ThemePreference};
pub use toggle::{ExternalSource, Platform, ThemeEvent, ThemeToggle};
