//! Remote store configuration.

use crate::core::debounce::DEFAULT_QUIET_WINDOW;
use serde::Deserialize;
use std::time::Duration;

/// Remote document store settings from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the hosted document store API
    pub base_url: String,
    /// Optional bearer token sent with every request
    #[serde(default)]
    pub api_token: Option<String>,
    /// Collection names, one per page
    #[serde(default)]
    pub collections: Collections,
    /// Quiet window of the debounced writer, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl RemoteConfig {
    /// Quiet window as a [`Duration`].
    #[must_use]
    pub const fn quiet_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// The three collection names.
#[derive(Debug, Clone, Deserialize)]
pub struct Collections {
    /// Sunday-school attendance sheets
    #[serde(default = "default_attendance")]
    pub attendance: String,
    /// Mass attendance sheets
    #[serde(default = "default_mass")]
    pub mass: String,
    /// Children roster
    #[serde(default = "default_children")]
    pub children: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            attendance: default_attendance(),
            mass: default_mass(),
            children: default_children(),
        }
    }
}

fn default_attendance() -> String {
    "attendance".to_string()
}

fn default_mass() -> String {
    "mass".to_string()
}

fn default_children() -> String {
    "children".to_string()
}

#[allow(clippy::cast_possible_truncation)] // well under u64::MAX milliseconds
fn default_debounce_ms() -> u64 {
    DEFAULT_QUIET_WINDOW.as_millis() as u64
}
