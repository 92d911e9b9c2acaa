//! Connector Framework configuration types
//!
//! Base trait and common configuration structures.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConnectorResult;

/// Trait for connector-specific configuration.
///
/// Each connector implements this trait to define its validation rules and
/// how it is shown in logs.
pub trait ConnectorConfig: Clone + Send + Sync {
    /// Validate the configuration.
    ///
    /// Returns an error if the configuration is invalid.
    fn validate(&self) -> ConnectorResult<()>;

    /// Create a redacted version of this config (for logging/display).
    ///
    /// Sensitive fields should be replaced with placeholders.
    fn redacted(&self) -> Self;
}

/// Common HTTP connection settings shared across connector types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Connection timeout in seconds.
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// User-Agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    60
}

fn default_user_agent() -> String {
    concat!("xavyo-connector/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connection_timeout_secs: default_connection_timeout(),
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl ConnectionSettings {
    /// Create new connection settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn with_connection_timeout(mut self, secs: u64) -> Self {
        self.connection_timeout_secs = secs;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Get connection timeout as Duration.
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    /// Get request timeout as Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_settings_defaults() {
        let settings = ConnectionSettings::default();
        assert_eq!(settings.connection_timeout_secs, 30);
        assert_eq!(settings.request_timeout(), Duration::from_secs(60));
        assert!(settings.user_agent.starts_with("xavyo-connector/"));
    }

    #[test]
    fn test_connection_settings_builder() {
        let settings = ConnectionSettings::new()
            .with_connection_timeout(5)
            .with_request_timeout(10)
            .with_user_agent("opsgenie-sync/test");

        assert_eq!(settings.connection_timeout(), Duration::from_secs(5));
        assert_eq!(settings.request_timeout_secs, 10);
        assert_eq!(settings.user_agent, "opsgenie-sync/test");
    }

    #[test]
    fn test_connection_settings_partial_deserialize() {
        let settings: ConnectionSettings =
            serde_json::from_str(r#"{"request_timeout_secs": 15}"#).unwrap();
        assert_eq!(settings.request_timeout_secs, 15);
        assert_eq!(settings.connection_timeout_secs, 30);
    }
}
