//! Multi-context harness for toggle integration tests.
//!
//! An [`Origin`] owns what browser contexts of one origin share: the
//! Preference Store, the theme channel and the OS color-scheme signal.
//! Each [`Tab`] is one page with its own document and toggle. Delivery of
//! channel messages and storage notifications is explicit via
//! [`Origin::settle`], so tests control ordering.

#![allow(dead_code)]

use std::rc::Rc;

use dark_mode_toggle::bus::{MemoryChannel, MemoryHub, RecordingNotifier};
use dark_mode_toggle::dom::{FixedColorScheme, MemoryDocument, MemoryElement};
use dark_mode_toggle::store::MemoryStore;
use dark_mode_toggle::theme::STORAGE_KEY;
use dark_mode_toggle::{Platform, ThemeEvent, ThemeToggle, ToggleConfig};

pub struct Origin {
    pub store: MemoryStore,
    pub hub: MemoryHub,
    pub os: FixedColorScheme,
    tabs: Vec<Tab>,
    /// Store value each tab last saw a storage notification for
    seen: Vec<Option<String>>,
}

pub struct Tab {
    pub document: MemoryDocument,
    pub channel: MemoryChannel,
    pub notifier: RecordingNotifier,
    pub toggle: ThemeToggle,
}

impl Tab {
    pub fn root(&self) -> MemoryElement {
        self.document.root()
    }
}

impl Origin {
    pub fn new(os_dark: bool) -> Self {
        Self {
            store: MemoryStore::new(),
            hub: MemoryHub::new(),
            os: FixedColorScheme::new(os_dark),
            tabs: Vec::new(),
            seen: Vec::new(),
        }
    }

    /// Open a page with a pristine document. Returns its index.
    pub fn open(&mut self, attrs: &[(&str, &str)]) -> usize {
        self.open_with(MemoryDocument::new(), attrs)
    }

    /// Open a page over a prepared document (server-rendered markers etc).
    pub fn open_with(&mut self, document: MemoryDocument, attrs: &[(&str, &str)]) -> usize {
        let channel = self.hub.open();
        let notifier = RecordingNotifier::new();
        let platform = Platform {
            document: Rc::new(document.clone()),
            store: Rc::new(self.store.clone()),
            channel: Some(Rc::new(channel.clone())),
            color_scheme: Rc::new(self.os.clone()),
            notifier: Rc::new(notifier.clone()),
        };
        let toggle = ThemeToggle::attach(
            ToggleConfig::from_attributes(attrs.iter().copied()),
            platform,
        );
        self.tabs.push(Tab {
            document,
            channel,
            notifier,
            toggle,
        });
        self.seen.push(self.store.peek(STORAGE_KEY));
        self.tabs.len() - 1
    }

    /// Close a page: its channel endpoint stops receiving.
    pub fn close(&mut self, index: usize) {
        self.tabs[index].channel.close();
    }

    pub fn tab(&self, index: usize) -> &Tab {
        &self.tabs[index]
    }

    pub fn tab_mut(&mut self, index: usize) -> &mut Tab {
        &mut self.tabs[index]
    }

    pub fn dispatch(&mut self, index: usize, event: ThemeEvent) {
        self.tabs[index].toggle.dispatch(event);
    }

    /// Total messages posted on the channel by every tab
    pub fn broadcasts(&self) -> usize {
        self.tabs.iter().map(|t| t.channel.sent_count()).sum()
    }

    /// Deliver pending channel messages, then storage notifications, to
    /// every tab. `writer` is the tab whose store write triggered this round;
    /// browsers never fire a storage event in the writing context.
    pub fn settle(&mut self, writer: usize) {
        for tab in &mut self.tabs {
            for message in tab.channel.drain() {
                tab.toggle.dispatch(ThemeEvent::from_message(&message));
            }
        }

        let current = self.store.peek(STORAGE_KEY);
        for (index, tab) in self.tabs.iter_mut().enumerate() {
            if self.seen[index] == current {
                continue;
            }
            self.seen[index] = current.clone();
            if index == writer {
                continue;
            }
            if let Some(event) = ThemeEvent::from_storage(Some(STORAGE_KEY), current.clone()) {
                tab.toggle.dispatch(event);
            }
        }
    }

    /// Redeliver a channel message to one tab, as a flaky transport might.
    pub fn deliver_raw(&mut self, index: usize, event: ThemeEvent) {
        self.tabs[index].toggle.dispatch(event);
    }
}
