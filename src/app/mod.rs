//! Dioxus application entry point.
//!
//! The same `Demo` content is rendered by the server (SSR) and hydrated on
//! the client, where the toggle binds to the live page.

use dioxus::prelude::*;

pub mod components;

use crate::config::ToggleConfig;
use crate::theme::Mode;
use components::DarkModeToggle;

/// Root app component for the client build. Starts from the configuration
/// the server rendered into the page, if any.
#[component]
pub fn App() -> Element {
    let config = use_hook(page_config);

    rsx! {
        Demo { config }
    }
}

#[cfg(target_arch = "wasm32")]
fn page_config() -> ToggleConfig {
    crate::web::page_config().unwrap_or_default()
}

#[cfg(not(target_arch = "wasm32"))]
fn page_config() -> ToggleConfig {
    ToggleConfig::default()
}

/// Demo content: a toggle plus a readout of its last change notification.
#[component]
pub fn Demo(config: ToggleConfig) -> Element {
    let mut last_change = use_signal(|| None::<Mode>);

    let status = match last_change() {
        Some(mode) => format!("Last change: {mode}"),
        None => "No change yet".to_string(),
    };
    let root = config.root.clone().unwrap_or_else(|| "html".to_string());
    let persist = if config.persist { "on" } else { "off" }.to_string();

    rsx! {
        header { class: "container demo-header",
            h1 { "Dark mode toggle" }
            DarkModeToggle {
                theme: config.theme.as_str().to_string(),
                strategy: config.strategy.as_str().to_string(),
                root: root,
                dark_class: config.dark_class.clone(),
                persist: persist,
                disabled: config.disabled,
                label: config.label.clone(),
                onchange: move |mode: Mode| last_change.set(Some(mode)),
            }
        }
        main { class: "container",
            p { "The choice is saved in this browser and shared with other open tabs." }
            p { id: "theme-status", "{status}" }
        }
    }
}
