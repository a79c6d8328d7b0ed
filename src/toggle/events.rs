//! Inputs the toggle reacts to.
//!
//! Every browser callback (click, storage, media query, broadcast message,
//! mutation observer, attribute change) is translated into one of these and
//! handed to [`super::ThemeToggle::dispatch`].

use crate::bus::ChannelMessage;
use crate::config::ToggleConfig;
use crate::theme::STORAGE_KEY;

/// Where an externally reported mode came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalSource {
    /// Another context posted on the theme channel
    Broadcast,
    /// Another context wrote the Preference Store
    Storage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThemeEvent {
    /// Click or keyboard activation
    UserToggle,
    /// Mode reported by another context. `mode` is unvalidated; `None`
    /// from storage means the key was cleared.
    ExternalModeReceived {
        source: ExternalSource,
        mode: Option<String>,
    },
    OsPreferenceChanged { prefers_dark: bool },
    /// The root's class or theme attribute changed
    RootMutated,
    ConfigChanged(ToggleConfig),
}

impl ThemeEvent {
    /// Translate a channel message
    pub fn from_message(message: &ChannelMessage) -> Self {
        ThemeEvent::ExternalModeReceived {
            source: ExternalSource::Broadcast,
            mode: Some(message.mode().to_string()),
        }
    }

    /// Translate a storage notification. Other keys are not ours.
    pub fn from_storage(key: Option<&str>, new_value: Option<String>) -> Option<Self> {
        match key {
            Some(STORAGE_KEY) => Some(ThemeEvent::ExternalModeReceived {
                source: ExternalSource::Storage,
                mode: new_value,
            }),
            _ => None,
        }
    }
}
