//! Server-rendered page chrome.

pub mod layout;
pub mod theme;

pub use layout::Layout;
pub use theme::{theme_script, toggle_script};
