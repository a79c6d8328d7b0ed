//! Demo page: the toggle inside the shared layout.

use dioxus::prelude::*;

use crate::app::Demo;
use crate::config::ToggleConfig;
use crate::ui::components::Layout;

/// Mirrors the switch's `change` notifications into the status line.
const STATUS_SCRIPT: &str = r#"
document.addEventListener('change', function(e) {
    if (!e.target.classList || !e.target.classList.contains('dm-toggle')) return;
    var el = document.getElementById('theme-status');
    if (el && e.detail) el.textContent = 'Last change: ' + e.detail.mode;
});
"#;

#[component]
pub fn DemoPage(config: ToggleConfig) -> Element {
    rsx! {
        Layout { title: "Dark mode toggle", toggle: config.clone(),
            Demo { config: config.clone() }
            script { dangerous_inner_html: STATUS_SCRIPT }
        }
    }
}
