//! Admin login configuration.
//!
//! Reads `ADMIN_USERNAME`, `ADMIN_PASSWORD` and `SESSION_TTL_HOURS` from
//! the environment on top of whatever `config.toml` carries, so deployments
//! can keep the credential pair out of the file entirely.

use crate::core::session::{Credentials, DEFAULT_SESSION_TTL_HOURS};
use serde::Deserialize;
use tracing::warn;

/// Admin login settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Expected username
    #[serde(default)]
    pub username: String,
    /// Expected password
    #[serde(default)]
    pub password: String,
    /// Hours a session stays valid after login
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            session_ttl_hours: default_session_ttl_hours(),
        }
    }
}

impl AuthConfig {
    /// Applies environment overrides on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(username) = std::env::var("ADMIN_USERNAME") {
            self.username = username;
        }
        if let Ok(password) = std::env::var("ADMIN_PASSWORD") {
            self.password = password;
        }
        if let Ok(ttl) = std::env::var("SESSION_TTL_HOURS") {
            match ttl.parse() {
                Ok(hours) => self.session_ttl_hours = hours,
                Err(_) => warn!("ignoring unparseable SESSION_TTL_HOURS value {ttl:?}"),
            }
        }
    }

    /// The credential pair the session gate checks against.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

fn default_session_ttl_hours() -> i64 {
    DEFAULT_SESSION_TTL_HOURS
}
