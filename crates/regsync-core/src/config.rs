//! Configuration types for the regsync system
//!
//! This module defines all configuration structures used throughout the crate.

use crate::reconciler::NameserverPolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

/// Default registrar API endpoint
pub const DEFAULT_API_URL: &str = "https://api.zone.eu/v2";

/// Default per-call timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Main regsync configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegsyncConfig {
    /// Registrar client configuration
    pub client: ClientConfig,

    /// State store configuration
    #[serde(default)]
    pub state_store: StateStoreConfig,

    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl RegsyncConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.client.validate()?;
        self.state_store.validate()?;
        self.engine.validate()
    }
}

/// Registrar client configuration
///
/// Credentials are passed as HTTP Basic auth on every request.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base API URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Account username
    #[serde(default)]
    pub username: String,

    /// API key (secret)
    #[serde(default)]
    pub api_key: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Create a configuration for the default endpoint
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: default_api_url(),
            username: username.into(),
            api_key: api_key.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Override the API URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Override the per-call timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Load the configuration from environment variables
    ///
    /// - `ZONE_API_URL` (default `https://api.zone.eu/v2`)
    /// - `ZONE_USERNAME`
    /// - `ZONE_API_KEY`
    /// - `ZONE_TIMEOUT_SECS` (default 60)
    pub fn from_env() -> Result<Self, crate::Error> {
        let timeout_secs = match env::var("ZONE_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                crate::Error::config(format!(
                    "ZONE_TIMEOUT_SECS must be a number of seconds. Got: {}",
                    raw
                ))
            })?,
            Err(_) => default_timeout_secs(),
        };

        Ok(Self {
            api_url: String::new(),
            username: String::new(),
            api_key: String::new(),
            timeout_secs,
        }
        .with_env_fallback())
    }

    /// Fill fields that were not set explicitly from `ZONE_*` environment variables
    pub fn with_env_fallback(self) -> Self {
        self.with_fallback(|name| env::var(name).ok())
    }

    /// Fill empty fields from `lookup`, keyed by the `ZONE_*` variable names
    ///
    /// An empty `api_url` with no fallback becomes the production endpoint.
    pub fn with_fallback(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.username.is_empty() {
            self.username = lookup("ZONE_USERNAME").unwrap_or_default();
        }
        if self.api_key.is_empty() {
            self.api_key = lookup("ZONE_API_KEY").unwrap_or_default();
        }
        if self.api_url.is_empty() {
            self.api_url = lookup("ZONE_API_URL").unwrap_or_else(default_api_url);
        }
        self
    }

    /// Validate the client configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.username.is_empty() {
            return Err(crate::Error::config(
                "Registrar username cannot be empty. Set it via: export ZONE_USERNAME=your_user",
            ));
        }

        if self.api_key.is_empty() {
            return Err(crate::Error::config(
                "Registrar API key cannot be empty. Set it via: export ZONE_API_KEY=your_key",
            ));
        }

        if !self.api_url.starts_with("https://") && !self.api_url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "API URL must use HTTP or HTTPS scheme. Got: {}",
                self.api_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Client timeout must be > 0"));
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field("api_key", &"<REDACTED>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// State store configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateStoreConfig {
    /// File-based state store
    File {
        /// Path to the state file
        path: String,
    },

    /// In-memory state store (not persistent)
    #[default]
    Memory,
}

impl StateStoreConfig {
    /// Validate the state store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StateStoreConfig::File { path } if path.is_empty() => Err(crate::Error::config(
                "State store path cannot be empty for the file store",
            )),
            _ => Ok(()),
        }
    }

    /// Store type name
    pub fn type_name(&self) -> &'static str {
        match self {
            StateStoreConfig::File { .. } => "file",
            StateStoreConfig::Memory => "memory",
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Log operations instead of sending them
    #[serde(default)]
    pub dry_run: bool,

    /// How nameserver sets are converged
    #[serde(default)]
    pub nameserver_policy: NameserverPolicy,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped (with a warning log).
    ///
    /// Default: 1000 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            nameserver_policy: NameserverPolicy::default(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_event_channel_capacity() -> usize {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_config_debug_redacts_api_key() {
        let config = ClientConfig::new("alice", "super-secret-key");
        let debug = format!("{:?}", config);
        assert!(debug.contains("<REDACTED>"));
        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains("https://api.zone.eu/v2"));
    }

    #[test]
    fn client_config_validation() {
        assert!(ClientConfig::new("alice", "key").validate().is_ok());
        assert!(ClientConfig::new("", "key").validate().is_err());
        assert!(ClientConfig::new("alice", "").validate().is_err());
        assert!(
            ClientConfig::new("alice", "key")
                .with_api_url("ftp://api.zone.eu")
                .validate()
                .is_err()
        );
        assert!(
            ClientConfig::new("alice", "key")
                .with_timeout_secs(0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn client_config_defaults_from_json() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"username":"alice","api_key":"key"}"#).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn explicit_values_win_over_fallback() {
        let lookup = |name: &str| match name {
            "ZONE_USERNAME" => Some("env-user".to_string()),
            "ZONE_API_KEY" => Some("env-key".to_string()),
            "ZONE_API_URL" => Some("http://localhost:8080/v2".to_string()),
            _ => None,
        };

        let config = ClientConfig::new("alice", "").with_fallback(lookup);
        assert_eq!(config.username, "alice");
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.api_url, DEFAULT_API_URL);

        let mut config = ClientConfig::new("", "key");
        config.api_url = String::new();
        let config = config.with_fallback(lookup);
        assert_eq!(config.username, "env-user");
        assert_eq!(config.api_key, "key");
        assert_eq!(config.api_url, "http://localhost:8080/v2");
    }

    #[test]
    fn missing_fallback_leaves_credentials_empty() {
        let mut config = ClientConfig::new("", "");
        config.api_url = String::new();
        let config = config.with_fallback(|_| None);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.validate().is_err());
    }

    #[test]
    fn engine_config_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert!(!config.dry_run);
        assert_eq!(config.nameserver_policy, NameserverPolicy::FullReplace);
        assert_eq!(config.event_channel_capacity, 1000);

        let config: EngineConfig =
            serde_json::from_str(r#"{"nameserver_policy":"set-diff","dry_run":true}"#).unwrap();
        assert_eq!(config.nameserver_policy, NameserverPolicy::SetDiff);
        assert!(config.dry_run);
    }

    #[test]
    fn state_store_config_tagged() {
        let config: StateStoreConfig =
            serde_json::from_str(r#"{"type":"file","path":"/var/lib/regsync/state.json"}"#)
                .unwrap();
        assert_eq!(config.type_name(), "file");
        assert!(StateStoreConfig::File { path: String::new() }.validate().is_err());
    }
}
