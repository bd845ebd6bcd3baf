//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server, loaded
//! via the `config` crate from environment variables (`API__BASE_URL`,
//! `OAUTH__KAKAO__CLIENT_ID`, ...).

use saerok_admin_backend::{ApiProps, InvalidApiProps};
use serde::Deserialize;

/// Server configuration composed from section configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Backend API connection settings.
    pub api: ApiConfig,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// Social login (Kakao/Apple) settings.
    pub oauth: SocialLoginConfig,
}

/// Backend API connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Saerok backend API.
    pub base_url: String,

    /// API path prefix to inject when the base URL does not already end
    /// with it (e.g. `/api/v1`).
    #[serde(default)]
    pub prefix: Option<String>,
}

impl ApiConfig {
    /// Validates and normalizes the connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank or unparseable base URL.
    pub fn to_props(&self) -> Result<ApiProps, InvalidApiProps> {
        ApiProps::new(&self.base_url, self.prefix.as_deref())
    }
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Idle session lifetime in minutes.
    #[serde(default = "default_session_duration_minutes")]
    pub duration_minutes: i64,

    /// Interval between session cleanup runs, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP
    /// development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_session_duration_minutes() -> i64 {
    30
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_minutes: default_session_duration_minutes(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
            secure_cookies: default_secure_cookies(),
        }
    }
}

/// Social login provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SocialLoginConfig {
    /// Kakao OAuth settings.
    pub kakao: ProviderConfig,
    /// Apple OAuth settings.
    pub apple: ProviderConfig,
}

/// One social provider's OAuth client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// The OAuth client ID registered with the provider.
    pub client_id: String,
    /// The redirect URI the provider sends the callback to.
    pub redirect_uri: String,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_has_correct_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.duration_minutes, 30);
        assert_eq!(config.cleanup_interval_seconds, 300);
        assert!(config.secure_cookies);
    }

    #[test]
    fn api_config_validates_base_url() {
        let valid = ApiConfig {
            base_url: "https://api.example.com/api/v1".to_string(),
            prefix: Some("/api/v1".to_string()),
        };
        assert!(valid.to_props().is_ok());

        let invalid = ApiConfig {
            base_url: String::new(),
            prefix: None,
        };
        assert!(invalid.to_props().is_err());
    }
}
