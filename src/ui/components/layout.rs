//! Layout component wrapping server-rendered pages.

use dioxus::prelude::*;

use super::theme::{theme_script, toggle_script};
use crate::app::components::TOGGLE_STYLES;
use crate::config::ToggleConfig;

/// Page styles, driven by whichever theme marker the toggle writes.
const PAGE_STYLES: &str = r#"
:root { color-scheme: light dark; --bg: #fff; --fg: #1d1d1f; --muted: #6e6e73; }
:root[data-theme="dark"], :root.dark { --bg: #1c1c1e; --fg: #f5f5f7; --muted: #a1a1a6; }
body { margin: 0; font-family: system-ui, sans-serif; background: var(--bg); color: var(--fg); }
.container { max-width: 720px; margin: 0 auto; padding: 1rem; }
.demo-header { display: flex; justify-content: space-between; align-items: center; }
footer small { color: var(--muted); }
"#;

#[derive(Props, Clone, PartialEq)]
pub struct LayoutProps {
    /// Page title (shown in browser tab)
    pub title: String,
    /// Toggle configuration the pre-paint script mirrors
    pub toggle: ToggleConfig,
    /// Page content
    pub children: Element,
}

#[component]
pub fn Layout(props: LayoutProps) -> Element {
    let version = env!("DMT_VERSION");
    let git_sha = env!("DMT_GIT_SHA");
    let script = theme_script(&props.toggle);
    let toggle_js = toggle_script();

    rsx! {
        head {
            meta { charset: "utf-8" }
            meta { name: "viewport", content: "width=device-width, initial-scale=1" }
            title { "{props.title}" }
            style { dangerous_inner_html: PAGE_STYLES }
            style { dangerous_inner_html: TOGGLE_STYLES }
            if !script.is_empty() {
                script { dangerous_inner_html: "{script}" }
            }
        }
        body {
            {props.children}
            footer { class: "container",
                small { "dark-mode-toggle v{version} ({git_sha})" }
            }
            script { dangerous_inner_html: "{toggle_js}" }
        }
    }
}
