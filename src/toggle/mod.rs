//! The toggle controller: one dispatcher over [`ThemeEvent`]s.
//!
//! User interaction goes through [`ThemeToggle::commit_user_choice`], the only
//! path that broadcasts. Signals from other contexts go through
//! [`ThemeToggle::receive_external`], and outside writes to the root through
//! [`ThemeToggle::reflect_from_root`].

mod events;

pub use events::{ExternalSource, ThemeEvent};

use std::rc::Rc;

use crate::bus::{BroadcastChannel, ChannelMessage, Notifier};
use crate::config::ToggleConfig;
use crate::dom::{self, ColorSchemeQuery, Document, RootElement};
use crate::resolver::{resolve, resolve_signals};
use crate::store::{persist_choice, read_choice, PreferenceStore};
use crate::theme::{Mode, Strategy, ThemePreference};

/// Injected platform capabilities
#[derive(Clone)]
pub struct Platform {
    pub document: Rc<dyn Document>,
    pub store: Rc<dyn PreferenceStore>,
    /// `None` when the runtime has no cross-context channel (same-tab sync only)
    pub channel: Option<Rc<dyn BroadcastChannel>>,
    pub color_scheme: Rc<dyn ColorSchemeQuery>,
    pub notifier: Rc<dyn Notifier>,
}

pub struct ThemeToggle {
    /// Effective configuration; `theme` follows user commits
    config: ToggleConfig,
    /// Configuration as last supplied by the host
    host: ToggleConfig,
    platform: Platform,
    root: Rc<dyn RootElement>,
    /// Mode shown by the widget itself (switch position, aria-checked)
    displayed: Mode,
    /// Mode this instance last wrote onto the root
    applied: Option<Mode>,
}

impl ThemeToggle {
    /// Attach to the page: pick the root, resolve, apply and announce.
    pub fn attach(config: ToggleConfig, platform: Platform) -> Self {
        let root = dom::resolve_root(&*platform.document, config.root.as_deref());
        let mut toggle = Self {
            host: config.clone(),
            config,
            platform,
            root,
            displayed: Mode::Light,
            applied: None,
        };
        toggle.seed_store_from_root();
        let mode = toggle.apply();
        tracing::debug!(
            "Theme toggle attached: preference={}, strategy={}, mode={}",
            toggle.config.theme.as_str(),
            toggle.config.strategy.as_str(),
            mode
        );
        toggle
    }

    pub fn config(&self) -> &ToggleConfig {
        &self.config
    }

    pub fn preference(&self) -> ThemePreference {
        self.config.theme
    }

    pub fn displayed(&self) -> Mode {
        self.displayed
    }

    /// Effective mode per the resolution chain
    pub fn mode(&self) -> Mode {
        resolve(
            self.config.theme,
            &*self.root,
            self.config.strategy,
            &self.config.dark_class,
            &*self.platform.store,
            &*self.platform.color_scheme,
        )
    }

    pub fn dispatch(&mut self, event: ThemeEvent) {
        tracing::trace!("Theme event: {:?}", event);
        match event {
            ThemeEvent::UserToggle => self.toggle(),
            ThemeEvent::ExternalModeReceived { source, mode } => {
                self.receive_external(source, mode.as_deref())
            }
            ThemeEvent::OsPreferenceChanged { prefers_dark } => {
                self.os_preference_changed(prefers_dark)
            }
            ThemeEvent::RootMutated => self.reflect_from_root(),
            ThemeEvent::ConfigChanged(config) => self.reconfigure(config),
        }
    }

    /// Flip to the opposite of what the widget currently shows.
    pub fn toggle(&mut self) {
        if self.config.disabled {
            tracing::debug!("Theme toggle is disabled, ignoring interaction");
            return;
        }
        let next = self.displayed.opposite();
        self.commit_user_choice(next);
    }

    /// Direct user choice: preference, persist, broadcast, apply, notify.
    pub fn commit_user_choice(&mut self, mode: Mode) {
        self.config.theme = mode.into();
        if self.config.persist {
            persist_choice(&*self.platform.store, mode);
        }
        self.broadcast(mode);
        self.apply();
    }

    /// Mode reported by another context. Never re-broadcasts.
    pub fn receive_external(&mut self, source: ExternalSource, raw: Option<&str>) {
        let Some(raw) = raw else {
            if source == ExternalSource::Storage {
                // Stored choice cleared elsewhere: back to auto
                self.config.theme = ThemePreference::Auto;
                self.apply();
            }
            return;
        };
        let Some(mode) = Mode::parse(raw) else {
            tracing::debug!("Ignoring external theme value {:?}", raw);
            return;
        };

        self.config.theme = mode.into();
        // A storage event means the value is already stored
        if source == ExternalSource::Broadcast && self.config.persist {
            persist_choice(&*self.platform.store, mode);
        }
        self.apply();
    }

    /// Outside write to the root's marker. Only followed in auto, and only
    /// the widget's own state and the UA hint are updated.
    pub fn reflect_from_root(&mut self) {
        if !self.config.theme.is_auto() {
            return;
        }
        let marker = dom::read_marker(&*self.root, self.config.strategy, &self.config.dark_class);
        let mode = Mode::from_dark(marker == Some(Mode::Dark));
        self.displayed = mode;
        dom::apply_color_scheme(&*self.platform.document, &*self.root, mode);
    }

    fn os_preference_changed(&mut self, prefers_dark: bool) {
        if !self.config.theme.is_auto() {
            return;
        }
        let persisted = read_choice(&*self.platform.store);
        let marker = dom::read_marker(&*self.root, self.config.strategy, &self.config.dark_class)
            .filter(|m| Some(*m) != self.applied);
        let mode = resolve_signals(ThemePreference::Auto, persisted, marker, prefers_dark);
        self.apply_resolved(mode);
    }

    /// Switch to a new host configuration. A committed choice survives
    /// unless the host changed `theme` itself. The root marker is carried
    /// across strategy and dark-class changes so the page keeps its theme.
    pub fn reconfigure(&mut self, config: ToggleConfig) {
        let mut next = config.clone();
        if config.theme == self.host.theme {
            next.theme = self.config.theme;
        }
        self.host = config;
        let old = std::mem::replace(&mut self.config, next);
        let root_changed = old.root != self.config.root;
        let marker_changed = root_changed
            || old.strategy != self.config.strategy
            || old.dark_class != self.config.dark_class;

        if !marker_changed {
            self.apply();
            return;
        }

        let carried = if root_changed {
            self.root =
                dom::resolve_root(&*self.platform.document, self.config.root.as_deref());
            self.applied = None;
            None
        } else {
            let carried = dom::read_marker(&*self.root, old.strategy, &old.dark_class);
            if old.strategy == Strategy::Class
                && old.dark_class != self.config.dark_class
                && self.root.has_class(&old.dark_class)
            {
                self.root.set_class(&old.dark_class, false);
            }
            carried
        };

        let persisted = if self.config.theme.is_auto() {
            read_choice(&*self.platform.store)
        } else {
            None
        };
        let marker = carried.or_else(|| {
            dom::read_marker(&*self.root, self.config.strategy, &self.config.dark_class)
        });
        let mode = resolve_signals(
            self.config.theme,
            persisted,
            marker,
            self.platform.color_scheme.prefers_dark(),
        );
        self.apply_resolved(mode);
    }

    fn broadcast(&self, mode: Mode) {
        if let Some(channel) = &self.platform.channel {
            if let Err(e) = channel.post(&ChannelMessage::theme_change(mode)) {
                tracing::debug!("Theme broadcast failed: {}", e);
            }
        }
        self.platform.notifier.theme_changed(mode);
    }

    fn seed_store_from_root(&self) {
        if !self.config.persist || read_choice(&*self.platform.store).is_some() {
            return;
        }
        // Only a dark marker is taken as an explicit page choice
        if dom::read_marker(&*self.root, self.config.strategy, &self.config.dark_class)
            == Some(Mode::Dark)
        {
            persist_choice(&*self.platform.store, Mode::Dark);
        }
    }

    fn apply(&mut self) -> Mode {
        let mode = self.mode();
        self.apply_resolved(mode);
        mode
    }

    fn apply_resolved(&mut self, mode: Mode) {
        dom::apply_mode(
            &*self.platform.document,
            &*self.root,
            self.config.strategy,
            &self.config.dark_class,
            mode,
        );
        self.displayed = mode;
        self.applied = Some(mode);
        self.platform.notifier.change(mode);
    }
}
