//! The `DarkModeToggle` switch component.
//!
//! Props mirror the element attributes (`theme`, `strategy`, `root`,
//! `dark-class`, `persist`, `disabled`, `label`). On the client the component
//! owns a [`crate::web::ToggleBinding`]; during SSR it renders the explicit
//! theme, or light, until hydration.

use dioxus::prelude::*;

use crate::config::ToggleConfig;
use crate::theme::Mode;

#[cfg(target_arch = "wasm32")]
use crate::bus::ChangeRelay;
#[cfg(target_arch = "wasm32")]
use crate::toggle::ThemeEvent;
#[cfg(target_arch = "wasm32")]
use crate::web::ToggleBinding;
#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

const SUN_SVG: &str = r#"<svg viewBox="0 0 24 24" aria-hidden="true"><path d="M12 4.5a1.5 1.5 0 0 1 1.5 1.5v1.5a1.5 1.5 0 1 1-3 0V6A1.5 1.5 0 0 1 12 4.5Zm0 10.5a1.5 1.5 0 0 1 1.5 1.5V18a1.5 1.5 0 1 1-3 0v-1.5A1.5 1.5 0 0 1 12 15ZM18 10.5A1.5 1.5 0 0 1 19.5 12 1.5 1.5 0 0 1 18 13.5H16.5A1.5 1.5 0 0 1 15 12a1.5 1.5 0 0 1 1.5-1.5H18ZM7.5 10.5A1.5 1.5 0 0 1 9 12a1.5 1.5 0 0 1-1.5 1.5H6A1.5 1.5 0 0 1 4.5 12 1.5 1.5 0 0 1 6 10.5h1.5Z"/></svg>"#;

const MOON_SVG: &str = r#"<svg viewBox="0 0 24 24" aria-hidden="true"><path fill-rule="evenodd" d="M11.58 2.151a7.28 7.28 0 1 0 7.279 7.279A7.279 7.279 0 0 0 11.58 2.151Z" clip-rule="evenodd"/></svg>"#;

/// Switch styles, keyed on `data-state`. Override the custom properties
/// (`--track-width`, `--track-bg-dark`, ...) to restyle.
pub const TOGGLE_STYLES: &str = r#"
.dm-toggle{cursor:pointer;display:inline-flex;align-items:center;justify-content:space-around;padding:0 4px;
  width:var(--track-width,60px);height:var(--track-height,30px);margin:0;
  background:var(--track-bg-light,#E9E9EA);border-radius:30px;position:relative;border:0;
  transition:background-color .25s ease;color-scheme:light dark;}
.dm-toggle:disabled{cursor:not-allowed;opacity:.5}
.dm-toggle .thumb{position:absolute;top:2px;left:2px;width:calc(var(--track-height,30px) - 4px);height:calc(var(--track-height,30px) - 4px);
  background:var(--thumb-bg,white);border-radius:50%;box-shadow:0 1px 3px rgba(0,0,0,.2);
  transition:transform .25s cubic-bezier(.25,.46,.45,.94),background-color .25s ease;}
.dm-toggle .icon{display:inline-flex;width:calc(var(--track-height,30px) - 8px);height:calc(var(--track-height,30px) - 8px);pointer-events:none;z-index:1}
.dm-toggle .icon svg{width:100%;height:100%;fill:currentColor}
.dm-toggle .sun{color:var(--icon-sun-color,#000)}
.dm-toggle .moon{color:var(--icon-moon-color,#8E8E93)}
.dm-toggle[data-state="dark"]{background:var(--track-bg-dark,#4D4D52)}
.dm-toggle[data-state="dark"] .thumb{transform:translateX(calc(var(--track-width,60px) - var(--track-height,30px)));background:var(--thumb-bg-dark,#6E6E73)}
.dm-toggle[data-state="dark"] .sun{color:var(--icon-sun-color-inactive,#8E8E93)}
.dm-toggle[data-state="dark"] .moon{color:var(--icon-moon-color-active,#fff)}
@media (prefers-reduced-motion: reduce){.dm-toggle,.dm-toggle .thumb{transition:none}}
"#;

#[derive(Props, Clone, PartialEq)]
pub struct DarkModeToggleProps {
    /// `auto` | `light` | `dark`
    pub theme: Option<String>,
    /// `attr` | `class`
    pub strategy: Option<String>,
    /// CSS selector of the root target (default: document root)
    pub root: Option<String>,
    pub dark_class: Option<String>,
    /// `off` disables persistence
    pub persist: Option<String>,
    #[props(default)]
    pub disabled: bool,
    /// Accessible name
    pub label: Option<String>,
    /// Local "change" notification, fired after every apply
    pub onchange: Option<EventHandler<Mode>>,
}

impl DarkModeToggleProps {
    pub fn to_config(&self) -> ToggleConfig {
        let pairs = [
            ("theme", self.theme.as_deref()),
            ("strategy", self.strategy.as_deref()),
            ("root", self.root.as_deref()),
            ("dark-class", self.dark_class.as_deref()),
            ("persist", self.persist.as_deref()),
            ("label", self.label.as_deref()),
            ("disabled", self.disabled.then_some("")),
        ];
        ToggleConfig::from_attributes(
            pairs
                .into_iter()
                .filter_map(|(name, value)| value.map(|v| (name, v))),
        )
    }
}

#[component]
pub fn DarkModeToggle(props: DarkModeToggleProps) -> Element {
    let config = props.to_config();
    let displayed = use_signal(|| config.theme.explicit().unwrap_or(Mode::Light));

    #[cfg(target_arch = "wasm32")]
    let binding = use_toggle_binding(config.clone(), displayed, props.onchange);

    let onclick = move |_: MouseEvent| {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(binding) = binding.borrow().as_ref() {
                binding.dispatch(ThemeEvent::UserToggle);
            }
        }
    };

    let mode = displayed();
    let checked = if mode.is_dark() { "true" } else { "false" };
    let label = config.label.clone();
    let persist = if config.persist { "on" } else { "off" };

    rsx! {
        button {
            class: "dm-toggle",
            r#type: "button",
            role: "switch",
            "aria-checked": checked,
            "aria-label": "{label}",
            "data-state": mode.as_str(),
            "data-config-theme": config.theme.as_str(),
            "data-config-strategy": config.strategy.as_str(),
            "data-config-root": config.root.clone(),
            "data-config-dark-class": config.dark_class.clone(),
            "data-config-persist": persist,
            disabled: config.disabled,
            onclick: onclick,
            span { class: "icon sun", "aria-hidden": "true", dangerous_inner_html: SUN_SVG }
            span { class: "icon moon", "aria-hidden": "true", dangerous_inner_html: MOON_SVG }
            span { class: "thumb", "aria-hidden": "true" }
        }
    }
}

/// Attach once on the client, then forward prop changes as reconfigurations.
#[cfg(target_arch = "wasm32")]
fn use_toggle_binding(
    config: ToggleConfig,
    displayed: Signal<Mode>,
    onchange: Option<EventHandler<Mode>>,
) -> Rc<RefCell<Option<ToggleBinding>>> {
    let binding: Rc<RefCell<Option<ToggleBinding>>> = use_hook(|| Rc::new(RefCell::new(None)));

    let relay = use_hook(ChangeRelay::new);
    relay.set(onchange.map(|handler| {
        Rc::new(move |mode: Mode| handler.call(mode)) as Rc<dyn Fn(Mode)>
    }));

    let slot = binding.clone();
    use_effect(use_reactive!(|(config,)| {
        let mut slot = slot.borrow_mut();
        if let Some(existing) = slot.as_ref() {
            existing.reconfigure(config);
            return;
        }
        *slot = ToggleBinding::attach(
            config,
            move |mode| {
                let mut displayed = displayed;
                displayed.set(mode);
            },
            {
                let relay = relay.clone();
                move |mode| relay.notify(mode)
            },
        );
        if slot.is_none() {
            tracing::warn!("Dark mode toggle: no document to attach to");
        }
    }));

    binding
}
