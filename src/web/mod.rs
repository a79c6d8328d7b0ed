//! Browser adapters for the toggle (wasm32 only).
//!
//! Each platform trait gets a web-sys implementation, and [`ToggleBinding`]
//! owns the event listeners that feed a [`ThemeToggle`].

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::bus::{BroadcastChannel, BroadcastError, ChannelMessage, Notifier};
use crate::config::ToggleConfig;
use crate::dom::{ColorSchemeQuery, Document, RootElement};
use crate::store::{PreferenceStore, StoreError};
use crate::theme::{
    Mode, Strategy, CHANGE_EVENT, CHANNEL_NAME, THEME_ATTRIBUTE, THEME_CHANGE_EVENT,
};
use crate::toggle::{Platform, ThemeEvent, ThemeToggle};

const DARK_QUERY: &str = "(prefers-color-scheme: dark)";

// ============ Preference Store ============

/// `window.localStorage`
pub struct LocalStorageStore;

fn local_storage() -> Result<web_sys::Storage, StoreError> {
    let window = web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".into()))?;
    match window.local_storage() {
        Ok(Some(storage)) => Ok(storage),
        Ok(None) => Err(StoreError::Unavailable("localStorage missing".into())),
        Err(e) => Err(StoreError::Unavailable(format!("{:?}", e))),
    }
}

impl PreferenceStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        local_storage()?
            .get_item(key)
            .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        local_storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::Rejected(format!("{:?}", e)))
    }
}

// ============ Broadcast channel ============

/// Named `BroadcastChannel`; closed on drop
pub struct WebBroadcastChannel {
    channel: web_sys::BroadcastChannel,
}

impl WebBroadcastChannel {
    /// `None` when the runtime has no BroadcastChannel
    pub fn open() -> Option<Self> {
        match web_sys::BroadcastChannel::new(CHANNEL_NAME) {
            Ok(channel) => Some(Self { channel }),
            Err(e) => {
                tracing::debug!("BroadcastChannel unavailable, same-tab sync only: {:?}", e);
                None
            }
        }
    }

    fn target(&self) -> &web_sys::EventTarget {
        self.channel.unchecked_ref()
    }
}

impl Drop for WebBroadcastChannel {
    fn drop(&mut self) {
        self.channel.close();
    }
}

impl BroadcastChannel for WebBroadcastChannel {
    fn post(&self, message: &ChannelMessage) -> Result<(), BroadcastError> {
        let value = message
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| BroadcastError::Post(e.to_string()))?;
        self.channel
            .post_message(&value)
            .map_err(|e| BroadcastError::Post(format!("{:?}", e)))
    }
}

// ============ DOM ============

#[derive(Clone)]
pub struct WebElement {
    element: web_sys::Element,
}

impl WebElement {
    pub fn new(element: web_sys::Element) -> Self {
        Self { element }
    }

    fn style(&self) -> Option<web_sys::CssStyleDeclaration> {
        self.element
            .dyn_ref::<web_sys::HtmlElement>()
            .map(|el| el.style())
    }
}

impl RootElement for WebElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let _ = self.element.set_attribute(name, value);
    }

    fn remove_attribute(&self, name: &str) {
        let _ = self.element.remove_attribute(name);
    }

    fn has_class(&self, class: &str) -> bool {
        self.element.class_list().contains(class)
    }

    fn set_class(&self, class: &str, present: bool) {
        let _ = self.element.class_list().toggle_with_force(class, present);
    }

    fn color_scheme(&self) -> Option<Mode> {
        self.style()
            .and_then(|style| style.get_property_value("color-scheme").ok())
            .and_then(|value| Mode::parse(&value))
    }

    fn set_color_scheme(&self, mode: Mode) {
        if let Some(style) = self.style() {
            let _ = style.set_property("color-scheme", mode.as_str());
        }
    }

    fn is_document_element(&self) -> bool {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
            .is_some_and(|root| root == self.element)
    }
}

pub struct WebDocument {
    document: web_sys::Document,
    root: web_sys::Element,
}

impl WebDocument {
    pub fn current() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let root = document.document_element()?;
        Some(Self { document, root })
    }

    /// The element a root selector resolves to, with the same fallbacks as
    /// [`crate::dom::resolve_root`]
    pub fn root_element(&self, selector: Option<&str>) -> web_sys::Element {
        match selector.map(str::trim) {
            None | Some("") | Some("html") => self.root.clone(),
            Some(sel) => self
                .document
                .query_selector(sel)
                .ok()
                .flatten()
                .unwrap_or_else(|| self.root.clone()),
        }
    }
}

impl Document for WebDocument {
    fn document_element(&self) -> Rc<dyn RootElement> {
        Rc::new(WebElement::new(self.root.clone()))
    }

    fn query_selector(&self, selector: &str) -> Option<Rc<dyn RootElement>> {
        // Invalid selectors throw; treat them as no match
        let element = self.document.query_selector(selector).ok().flatten()?;
        Some(Rc::new(WebElement::new(element)))
    }
}

/// `matchMedia('(prefers-color-scheme: dark)')`
pub struct MediaQuery {
    list: Option<web_sys::MediaQueryList>,
}

impl MediaQuery {
    pub fn dark() -> Self {
        let list = web_sys::window().and_then(|w| w.match_media(DARK_QUERY).ok().flatten());
        Self { list }
    }
}

impl ColorSchemeQuery for MediaQuery {
    fn prefers_dark(&self) -> bool {
        self.list.as_ref().is_some_and(|l| l.matches())
    }
}

// ============ Notifications ============

#[derive(Serialize)]
struct ThemeDetail {
    mode: Mode,
}

/// Local change goes to a callback; the page-wide event is a
/// `themechange` CustomEvent on `window` with `{ mode }` as detail.
pub struct WindowNotifier {
    on_change: Box<dyn Fn(Mode)>,
}

impl WindowNotifier {
    pub fn new(on_change: impl Fn(Mode) + 'static) -> Self {
        Self {
            on_change: Box::new(on_change),
        }
    }
}

impl Notifier for WindowNotifier {
    fn change(&self, mode: Mode) {
        tracing::trace!("Toggle {} event: {}", CHANGE_EVENT, mode);
        (self.on_change)(mode);
    }

    fn theme_changed(&self, mode: Mode) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let detail = match (ThemeDetail { mode })
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        {
            Ok(detail) => detail,
            Err(e) => {
                tracing::debug!("Failed to encode themechange detail: {}", e);
                return;
            }
        };
        let init = web_sys::CustomEventInit::new();
        init.set_detail(&detail);
        if let Ok(event) =
            web_sys::CustomEvent::new_with_event_init_dict(THEME_CHANGE_EVENT, &init)
        {
            let _ = window.dispatch_event(&event);
        }
    }
}

// ============ Page configuration ============

const CONFIG_ATTRIBUTES: &[&str] = &["theme", "strategy", "root", "dark-class", "persist"];

/// Configuration the server rendered into the first switch on the page,
/// so the client toggle starts from the same settings.
pub fn page_config() -> Option<ToggleConfig> {
    let document = web_sys::window()?.document()?;
    let button = document.query_selector(".dm-toggle").ok().flatten()?;

    let values: Vec<(&str, String)> = CONFIG_ATTRIBUTES
        .iter()
        .filter_map(|name| {
            button
                .get_attribute(&format!("data-config-{}", name))
                .map(|value| (*name, value))
        })
        .collect();
    let mut config =
        ToggleConfig::from_attributes(values.iter().map(|(name, value)| (*name, value.as_str())));
    if let Some(label) = button.get_attribute("aria-label") {
        config = config.with_attribute("label", Some(label.as_str()));
    }
    config.disabled = button.has_attribute("disabled");
    tracing::debug!("Page toggle config: {:?}", config);
    Some(config)
}

// ============ Binding ============

type Dispatch = Rc<dyn Fn(ThemeEvent)>;

/// A toggle wired to the browser. Listeners are removed on drop.
pub struct ToggleBinding {
    dispatch: Dispatch,
    document: Rc<WebDocument>,
    channel: Option<Rc<WebBroadcastChannel>>,
    media: Option<web_sys::MediaQueryList>,
    observer: Option<web_sys::MutationObserver>,
    on_storage: Closure<dyn FnMut(web_sys::StorageEvent)>,
    on_media: Closure<dyn FnMut(web_sys::MediaQueryListEvent)>,
    on_message: Closure<dyn FnMut(web_sys::MessageEvent)>,
    _on_mutation: Closure<dyn FnMut(js_sys::Array, web_sys::MutationObserver)>,
}

impl ToggleBinding {
    /// Attach a toggle to the current page.
    ///
    /// `on_state` receives the displayed mode after every event; `on_change`
    /// is the local "change" notification.
    pub fn attach(
        config: ToggleConfig,
        on_state: impl Fn(Mode) + 'static,
        on_change: impl Fn(Mode) + 'static,
    ) -> Option<Self> {
        let document = Rc::new(WebDocument::current()?);
        let channel = WebBroadcastChannel::open().map(Rc::new);

        let platform = Platform {
            document: document.clone(),
            store: Rc::new(LocalStorageStore),
            channel: channel
                .clone()
                .map(|c| c as Rc<dyn BroadcastChannel>),
            color_scheme: Rc::new(MediaQuery::dark()),
            notifier: Rc::new(WindowNotifier::new(on_change)),
        };

        let toggle = Rc::new(RefCell::new(ThemeToggle::attach(config, platform)));
        let on_state: Rc<dyn Fn(Mode)> = Rc::new(on_state);
        on_state(toggle.borrow().displayed());

        let dispatch: Dispatch = {
            let toggle = toggle.clone();
            Rc::new(move |event: ThemeEvent| {
                let displayed = {
                    let Ok(mut toggle) = toggle.try_borrow_mut() else {
                        tracing::debug!("Theme event arrived during dispatch, dropped");
                        return;
                    };
                    toggle.dispatch(event);
                    toggle.displayed()
                };
                on_state(displayed);
            })
        };

        let window = web_sys::window()?;

        let on_storage = {
            let dispatch = dispatch.clone();
            Closure::wrap(Box::new(move |e: web_sys::StorageEvent| {
                if let Some(event) = ThemeEvent::from_storage(e.key().as_deref(), e.new_value()) {
                    dispatch(event);
                }
            }) as Box<dyn FnMut(_)>)
        };
        let _ = window
            .add_event_listener_with_callback("storage", on_storage.as_ref().unchecked_ref());

        let media = window.match_media(DARK_QUERY).ok().flatten();
        let on_media = {
            let dispatch = dispatch.clone();
            Closure::wrap(Box::new(move |e: web_sys::MediaQueryListEvent| {
                dispatch(ThemeEvent::OsPreferenceChanged {
                    prefers_dark: e.matches(),
                });
            }) as Box<dyn FnMut(_)>)
        };
        if let Some(list) = &media {
            let _ = list
                .add_event_listener_with_callback("change", on_media.as_ref().unchecked_ref());
        }

        let on_message = {
            let dispatch = dispatch.clone();
            Closure::wrap(Box::new(move |e: web_sys::MessageEvent| {
                let data = e.data();
                // Older senders post the JSON text instead of an object
                let message = match data.as_string() {
                    Some(text) => ChannelMessage::from_json(&text),
                    None => serde_wasm_bindgen::from_value::<ChannelMessage>(data).ok(),
                };
                match message {
                    Some(message) => dispatch(ThemeEvent::from_message(&message)),
                    None => tracing::trace!("Ignoring unrelated channel message"),
                }
            }) as Box<dyn FnMut(_)>)
        };
        if let Some(channel) = &channel {
            let _ = channel
                .target()
                .add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref());
        }

        let on_mutation = {
            let dispatch = dispatch.clone();
            Closure::wrap(Box::new(move |_: js_sys::Array, _: web_sys::MutationObserver| {
                dispatch(ThemeEvent::RootMutated);
            }) as Box<dyn FnMut(_, _)>)
        };
        let observer = web_sys::MutationObserver::new(on_mutation.as_ref().unchecked_ref()).ok();

        let binding = Self {
            dispatch,
            document,
            channel,
            media,
            observer,
            on_storage,
            on_media,
            on_message,
            _on_mutation: on_mutation,
        };
        binding.observe(&toggle.borrow().config().clone());
        Some(binding)
    }

    /// Feed an event (e.g. `UserToggle` from a click) to the toggle
    pub fn dispatch(&self, event: ThemeEvent) {
        (self.dispatch)(event);
    }

    /// New configuration from the host; re-targets the root observer.
    pub fn reconfigure(&self, config: ToggleConfig) {
        self.observe(&config);
        self.dispatch(ThemeEvent::ConfigChanged(config));
    }

    fn observe(&self, config: &ToggleConfig) {
        let Some(observer) = &self.observer else {
            return;
        };
        observer.disconnect();

        let attribute = match config.strategy {
            Strategy::Class => "class",
            Strategy::Attribute => THEME_ATTRIBUTE,
        };
        let filter = js_sys::Array::of1(&JsValue::from_str(attribute));
        let init = web_sys::MutationObserverInit::new();
        init.set_attributes(true);
        init.set_attribute_filter(&filter);

        let root = self.document.root_element(config.root.as_deref());
        if let Err(e) = observer.observe_with_options(&root, &init) {
            tracing::debug!("Failed to observe theme root: {:?}", e);
        }
    }
}

impl Drop for ToggleBinding {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback(
                "storage",
                self.on_storage.as_ref().unchecked_ref(),
            );
        }
        if let Some(list) = &self.media {
            let _ = list.remove_event_listener_with_callback(
                "change",
                self.on_media.as_ref().unchecked_ref(),
            );
        }
        if let Some(channel) = &self.channel {
            let _ = channel.target().remove_event_listener_with_callback(
                "message",
                self.on_message.as_ref().unchecked_ref(),
            );
        }
        if let Some(observer) = &self.observer {
            observer.disconnect();
        }
    }
}
