//! Configuration management
//!
//! Two layers:
//! - [`ToggleConfig`]: the typed configuration of one toggle, normalized from
//!   element-style attributes once at construction and again on every change.
//! - [`Config`]: the demo server configuration (server builds only).

use crate::theme::{Strategy, ThemePreference, DEFAULT_DARK_CLASS, DEFAULT_LABEL};

/// Normalized toggle configuration. Invalid values never fail: each
/// falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleConfig {
    pub theme: ThemePreference,
    pub strategy: Strategy,
    /// Root selector; `None` is the document element
    pub root: Option<String>,
    pub dark_class: String,
    pub persist: bool,
    pub disabled: bool,
    pub label: String,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            theme: ThemePreference::Auto,
            strategy: Strategy::Attribute,
            root: None,
            dark_class: DEFAULT_DARK_CLASS.to_string(),
            persist: true,
            disabled: false,
            label: DEFAULT_LABEL.to_string(),
        }
    }
}

impl ToggleConfig {
    /// Build from name/value pairs. Unknown names are ignored.
    pub fn from_attributes<'a, I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        attributes
            .into_iter()
            .fold(Self::default(), |config, (name, value)| {
                config.with_attribute(name, Some(value))
            })
    }

    /// Apply one attribute change. `None` means the attribute was removed,
    /// which restores that field's default.
    pub fn with_attribute(mut self, name: &str, value: Option<&str>) -> Self {
        let defaults = Self::default();
        match name {
            "theme" => {
                self.theme = value.map(ThemePreference::parse).unwrap_or_default();
            }
            "strategy" => {
                self.strategy = value.map(Strategy::parse).unwrap_or_default();
            }
            "root" => {
                self.root = value
                    .map(str::trim)
                    .filter(|s| !s.is_empty() && *s != "html")
                    .map(str::to_string);
            }
            "dark-class" => {
                self.dark_class = value
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .unwrap_or(defaults.dark_class);
            }
            "persist" => {
                self.persist = value.map_or(true, |v| !v.trim().eq_ignore_ascii_case("off"));
            }
            "disabled" => {
                self.disabled = value.is_some_and(|v| !v.trim().eq_ignore_ascii_case("false"));
            }
            "label" => {
                self.label = value
                    .filter(|s| !s.trim().is_empty())
                    .map(str::to_string)
                    .unwrap_or(defaults.label);
            }
            other => {
                tracing::trace!("Ignoring unknown toggle attribute {:?}", other);
            }
        }
        self
    }

    /// Attribute form of this configuration (inverse of `from_attributes`)
    pub fn to_attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![
            ("theme", self.theme.as_str().to_string()),
            ("strategy", self.strategy.as_str().to_string()),
            ("dark-class", self.dark_class.clone()),
            ("persist", if self.persist { "on" } else { "off" }.to_string()),
            ("label", self.label.clone()),
        ];
        if let Some(root) = &self.root {
            attrs.push(("root", root.clone()));
        }
        if self.disabled {
            attrs.push(("disabled", String::new()));
        }
        attrs
    }
}

#[cfg(feature = "server")]
pub use server::*;

#[cfg(feature = "server")]
mod server {
    use std::path::PathBuf;

    use anyhow::Result;
    use serde::Deserialize;

    use super::ToggleConfig;

    #[derive(Debug, Deserialize)]
    pub struct Config {
        #[serde(default = "default_port")]
        pub port: u16,

        /// Defaults for the toggle rendered on the demo page
        #[serde(default)]
        pub toggle: ToggleDefaults,
    }

    fn default_port() -> u16 {
        8089
    }

    /// Attribute values as written in config files or env vars
    #[derive(Debug, Default, Clone, Deserialize)]
    pub struct ToggleDefaults {
        pub theme: Option<String>,
        pub strategy: Option<String>,
        pub root: Option<String>,
        pub dark_class: Option<String>,
        pub persist: Option<String>,
        pub label: Option<String>,
    }

    impl ToggleDefaults {
        pub fn to_config(&self) -> ToggleConfig {
            let pairs = [
                ("theme", &self.theme),
                ("strategy", &self.strategy),
                ("root", &self.root),
                ("dark-class", &self.dark_class),
                ("persist", &self.persist),
                ("label", &self.label),
            ];
            ToggleConfig::from_attributes(
                pairs
                    .into_iter()
                    .filter_map(|(name, value)| value.as_deref().map(|v| (name, v))),
            )
        }
    }

    const APP_DIR: &str = "dark-mode-toggle";

    /// Directory holding `config.toml`
    pub fn get_config_dir() -> PathBuf {
        config_dir_from(|var| std::env::var(var).ok())
    }

    /// `DMT_CONFIG_DIR` wins outright; otherwise the per-OS user config
    /// location, then the working directory.
    pub(super) fn config_dir_from(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        if let Some(dir) = env("DMT_CONFIG_DIR") {
            return PathBuf::from(dir);
        }
        platform_base(&env)
            .map(|base| base.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    #[cfg(target_os = "macos")]
    fn platform_base(env: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
        env("HOME").map(|home| PathBuf::from(home).join("Library/Application Support"))
    }

    #[cfg(target_os = "windows")]
    fn platform_base(env: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
        env("APPDATA").map(PathBuf::from)
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    fn platform_base(env: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
        env("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env("HOME").map(|home| PathBuf::from(home).join(".config")))
    }

    pub fn load_config() -> Result<Config> {
        let config_dir = get_config_dir();

        let mut builder = ::config::Config::builder()
            .set_default("port", default_port() as i64)?
            // Load from config file if it exists
            .add_source(
                ::config::File::with_name(&config_dir.join("config").to_string_lossy())
                    .required(false),
            )
            // Override with environment variables (DMT_PORT, DMT_TOGGLE__STRATEGY, etc.)
            .add_source(
                ::config::Environment::with_prefix("DMT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        // Precedence: DMT_PORT > PORT > config file > default
        if let Ok(port) = std::env::var("DMT_PORT") {
            if let Ok(port_num) = port.parse::<u16>() {
                builder = builder.set_override("port", port_num as i64)?;
            }
        } else if let Ok(port) = std::env::var("PORT") {
            if let Ok(port_num) = port.parse::<u16>() {
                builder = builder.set_override("port", port_num as i64)?;
            }
        }

        let config = builder.build()?;

        Ok(config.try_deserialize()?)
    }
}
