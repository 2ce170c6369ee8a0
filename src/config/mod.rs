//! Configuration management.
//!
//! Settings live in `config.toml`; the admin credential pair and session
//! TTL can be overridden from the environment (a `.env` file is loaded at
//! startup), so the checked-in file never needs to carry a real password.

/// Admin credentials and session TTL
pub mod auth;
/// Remote store endpoint and collection names
pub mod remote;

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

pub use auth::AuthConfig;
pub use remote::{Collections, RemoteConfig};

/// Environment variable overriding the configuration file path.
pub const CONFIG_PATH_VAR: &str = "ATTENDANCE_BUDDY_CONFIG";

/// The entire configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Remote document store settings
    pub remote: RemoteConfig,
    /// Admin login settings; may be omitted and supplied via environment
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Loads configuration from a TOML file and applies environment overrides.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;
    let mut config: AppConfig = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.auth.apply_env_overrides();
    Ok(config)
}

/// Loads configuration from `$ATTENDANCE_BUDDY_CONFIG`, falling back to
/// `./config.toml`.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn parses_a_full_config_file() {
        let toml_str = r#"
            [remote]
            base_url = "https://store.example.com/v1/"
            api_token = "token-123"
            debounce_ms = 500

            [remote.collections]
            attendance = "attendance"
            mass = "mass"
            children = "children"

            [auth]
            username = "admin"
            password = "s3cret"
            session_ttl_hours = 8
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.remote.base_url, "https://store.example.com/v1/");
        assert_eq!(config.remote.api_token.as_deref(), Some("token-123"));
        assert_eq!(config.remote.debounce_ms, 500);
        assert_eq!(config.auth.username, "admin");
        assert_eq!(config.auth.session_ttl_hours, 8);
    }

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let toml_str = r#"
            [remote]
            base_url = "https://store.example.com/v1/"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!(config.remote.api_token.is_none());
        assert_eq!(config.remote.collections.attendance, "attendance");
        assert_eq!(config.remote.collections.mass, "mass");
        assert_eq!(config.remote.collections.children, "children");
        assert_eq!(config.remote.debounce_ms, 300);
        assert_eq!(config.auth.session_ttl_hours, 12);
        assert!(config.auth.username.is_empty());
    }
}
