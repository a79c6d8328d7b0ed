//! Cross-context signalling and local notifications
//!
//! A user toggle is announced to other same-origin contexts over a named
//! broadcast channel. Messages are typed and serialized as
//! `{"type":"themechange","mode":"dark"}`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::theme::Mode;

/// Messages carried on the theme channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChannelMessage {
    /// `mode` stays a raw string: receivers validate it themselves
    ThemeChange { mode: String },
}

impl ChannelMessage {
    pub fn theme_change(mode: Mode) -> Self {
        ChannelMessage::ThemeChange {
            mode: mode.as_str().to_string(),
        }
    }

    /// Raw mode payload of a theme change
    pub fn mode(&self) -> &str {
        match self {
            ChannelMessage::ThemeChange { mode } => mode,
        }
    }

    /// Decode a JSON payload. Unknown message types yield `None`.
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BroadcastError {
    #[error("channel closed")]
    Closed,
    #[error("failed to post message: {0}")]
    Post(String),
}

/// Same-origin publish side of the theme channel
pub trait BroadcastChannel {
    fn post(&self, message: &ChannelMessage) -> Result<(), BroadcastError>;
}

/// Receivers of local and page-wide theme notifications
pub trait Notifier {
    /// "change" on the widget itself, after every apply
    fn change(&self, mode: Mode);
    /// "themechange" on the page-wide scope, after a user toggle
    fn theme_changed(&self, mode: Mode);
}

/// Local "change" listener that the host can replace at any time.
/// Clones share the slot; the listener is looked up per notification.
#[derive(Clone, Default)]
pub struct ChangeRelay {
    listener: Rc<RefCell<Option<Rc<dyn Fn(Mode)>>>>,
}

impl ChangeRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, listener: Option<Rc<dyn Fn(Mode)>>) {
        *self.listener.borrow_mut() = listener;
    }

    pub fn notify(&self, mode: Mode) {
        // Release the borrow before calling out, the listener may replace itself
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(mode);
        }
    }
}

/// Notification captured by [`RecordingNotifier`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    Change(Mode),
    ThemeChanged(Mode),
}

/// Notifier that keeps every notification, in order
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    log: Rc<RefCell<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    pub fn changes(&self) -> Vec<Mode> {
        self.log
            .borrow()
            .iter()
            .filter_map(|n| match n {
                Notification::Change(mode) => Some(*mode),
                Notification::ThemeChanged(_) => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn change(&self, mode: Mode) {
        self.log.borrow_mut().push(Notification::Change(mode));
    }

    fn theme_changed(&self, mode: Mode) {
        self.log.borrow_mut().push(Notification::ThemeChanged(mode));
    }
}

struct Endpoint {
    id: usize,
    inbox: VecDeque<ChannelMessage>,
    sent: usize,
    closed: bool,
}

/// In-process stand-in for a named channel shared by several contexts
#[derive(Clone, Default)]
pub struct MemoryHub {
    endpoints: Rc<RefCell<Vec<Endpoint>>>,
}

impl MemoryHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new endpoint (one per context)
    pub fn open(&self) -> MemoryChannel {
        let mut endpoints = self.endpoints.borrow_mut();
        let id = endpoints.len();
        endpoints.push(Endpoint {
            id,
            inbox: VecDeque::new(),
            sent: 0,
            closed: false,
        });
        MemoryChannel {
            hub: self.clone(),
            id,
        }
    }
}

/// One context's handle on a [`MemoryHub`]
#[derive(Clone)]
pub struct MemoryChannel {
    hub: MemoryHub,
    id: usize,
}

impl MemoryChannel {
    /// Drain messages delivered to this endpoint
    pub fn drain(&self) -> Vec<ChannelMessage> {
        let mut endpoints = self.hub.endpoints.borrow_mut();
        endpoints[self.id].inbox.drain(..).collect()
    }

    /// Number of messages this endpoint has posted
    pub fn sent_count(&self) -> usize {
        self.hub.endpoints.borrow()[self.id].sent
    }

    pub fn close(&self) {
        self.hub.endpoints.borrow_mut()[self.id].closed = true;
    }
}

impl BroadcastChannel for MemoryChannel {
    fn post(&self, message: &ChannelMessage) -> Result<(), BroadcastError> {
        let mut endpoints = self.hub.endpoints.borrow_mut();
        if endpoints[self.id].closed {
            return Err(BroadcastError::Closed);
        }
        endpoints[self.id].sent += 1;
        // Never delivered back to the sender
        for endpoint in endpoints.iter_mut() {
            if endpoint.id != self.id && !endpoint.closed {
                endpoint.inbox.push_back(message.clone());
            }
        }
        Ok(())
    }
}
