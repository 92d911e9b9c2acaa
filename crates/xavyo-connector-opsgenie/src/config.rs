//! Opsgenie connector configuration.

use std::env::VarError;
use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use url::Url;
use xavyo_connector::config::{ConnectionSettings, ConnectorConfig};
use xavyo_connector::error::{ConnectorError, ConnectorResult};
use xavyo_connector::resilience::RetryConfig;

/// Default public API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.opsgenie.com";

/// Largest page the users endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

const REDACTED: &str = "***REDACTED***";

/// A role that exists in every Opsgenie account but is not returned by the
/// custom roles endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinRole {
    pub id: String,
    pub name: String,
}

impl BuiltinRole {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Built-in roles added to every role listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinRoles(Vec<BuiltinRole>);

impl BuiltinRoles {
    pub fn new(roles: Vec<BuiltinRole>) -> Self {
        Self(roles)
    }

    /// No built-in roles.
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuiltinRole> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for BuiltinRoles {
    /// Admin, User, Owner and Stakeholder with their fixed upstream ids.
    fn default() -> Self {
        Self(vec![
            BuiltinRole::new("2DonQtHeOOxwfe5muls9Cx18fzL", "Admin"),
            BuiltinRole::new("2DonSZzqzbnAWBeWhKl6lNSTTzh", "User"),
            BuiltinRole::new("2Dp2qL0NvHVku3cghi6rJSsvfXJ", "Owner"),
            BuiltinRole::new("2Dp2txbavgGagm2sFtl7voULpf2", "Stakeholder"),
        ])
    }
}

/// Configuration for the Opsgenie connector.
#[derive(Clone)]
pub struct OpsgenieConfig {
    /// API integration key, sent as `Authorization: GenieKey {key}`.
    pub api_key: SecretString,
    /// API base URL (without the `/v2` prefix).
    pub base_url: String,
    /// Users fetched per page.
    pub page_size: u32,
    /// Retry policy for rate limits and server errors.
    pub retry: RetryConfig,
    /// HTTP timeouts and user agent.
    pub connection: ConnectionSettings,
    /// Roles merged into every role listing.
    pub builtin_roles: BuiltinRoles,
}

impl fmt::Debug for OpsgenieConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpsgenieConfig")
            .field("api_key", &REDACTED)
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("retry", &self.retry)
            .field("connection", &self.connection)
            .field("builtin_roles", &self.builtin_roles.len())
            .finish()
    }
}

/// Retry policy matching Opsgenie's rate-limit guidance: up to 20 retries,
/// 200ms doubling.
pub fn default_retry_config() -> RetryConfig {
    RetryConfig::new(20)
        .with_initial_backoff(200)
        .with_max_backoff(60_000)
}

impl OpsgenieConfig {
    /// Start building a configuration around an API key.
    pub fn builder(api_key: impl Into<String>) -> OpsgenieConfigBuilder {
        OpsgenieConfigBuilder {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: MAX_PAGE_SIZE,
            retry: default_retry_config(),
            connection: ConnectionSettings::default(),
            builtin_roles: BuiltinRoles::default(),
        }
    }

    /// Load configuration from a variable reader.
    ///
    /// Pass `|key| std::env::var(key)` for the process environment; callers
    /// layer their own overrides in front of it.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let api_key = reader("OPSGENIE_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("OPSGENIE_API_KEY".into()))?;

        let base_url = reader("OPSGENIE_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidValue("OPSGENIE_BASE_URL".into(), e.to_string()))?;

        let page_size = reader("OPSGENIE_PAGE_SIZE")
            .unwrap_or_else(|_| MAX_PAGE_SIZE.to_string())
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidValue("OPSGENIE_PAGE_SIZE".into(), e.to_string()))?;
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ConfigError::InvalidValue(
                "OPSGENIE_PAGE_SIZE".into(),
                format!("{page_size} is outside 1..={MAX_PAGE_SIZE}"),
            ));
        }

        let mut builder = Self::builder(api_key).base_url(base_url).page_size(page_size);

        if let Ok(raw) = reader("OPSGENIE_MAX_RETRIES") {
            let max_retries = raw.parse::<u32>().map_err(|e| {
                ConfigError::InvalidValue("OPSGENIE_MAX_RETRIES".into(), e.to_string())
            })?;
            builder = builder.max_retries(max_retries);
        }

        if let Ok(raw) = reader("OPSGENIE_REQUEST_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("OPSGENIE_REQUEST_TIMEOUT_SECS".into(), e.to_string())
            })?;
            builder = builder.request_timeout_secs(secs);
        }

        Ok(builder.build())
    }

    /// Parsed base URL.
    pub fn parsed_base_url(&self) -> ConnectorResult<Url> {
        Url::parse(&self.base_url).map_err(|e| ConnectorError::InvalidConfiguration {
            message: format!("invalid base_url '{}': {e}", self.base_url),
        })
    }
}

impl ConnectorConfig for OpsgenieConfig {
    fn validate(&self) -> ConnectorResult<()> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(ConnectorError::InvalidConfiguration {
                message: "api_key is required".to_string(),
            });
        }

        let url = self.parsed_base_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConnectorError::InvalidConfiguration {
                message: format!("base_url must be http(s), got '{}'", url.scheme()),
            });
        }

        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ConnectorError::InvalidConfiguration {
                message: format!("page_size must be within 1..={MAX_PAGE_SIZE}"),
            });
        }

        self.retry
            .validate()
            .map_err(|message| ConnectorError::InvalidConfiguration { message })?;

        Ok(())
    }

    fn redacted(&self) -> Self {
        Self {
            api_key: SecretString::new(REDACTED.to_string()),
            ..self.clone()
        }
    }
}

/// Builder for [`OpsgenieConfig`].
#[derive(Debug)]
pub struct OpsgenieConfigBuilder {
    api_key: String,
    base_url: String,
    page_size: u32,
    retry: RetryConfig,
    connection: ConnectionSettings,
    builtin_roles: BuiltinRoles,
}

impl OpsgenieConfigBuilder {
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.connection = self.connection.with_request_timeout(secs);
        self
    }

    #[must_use]
    pub fn connection(mut self, connection: ConnectionSettings) -> Self {
        self.connection = connection;
        self
    }

    #[must_use]
    pub fn builtin_roles(mut self, builtin_roles: BuiltinRoles) -> Self {
        self.builtin_roles = builtin_roles;
        self
    }

    pub fn build(self) -> OpsgenieConfig {
        OpsgenieConfig {
            api_key: SecretString::new(self.api_key),
            base_url: self.base_url,
            page_size: self.page_size,
            retry: self.retry,
            connection: self.connection,
            builtin_roles: self.builtin_roles,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl From<ConfigError> for ConnectorError {
    fn from(err: ConfigError) -> Self {
        ConnectorError::InvalidConfiguration {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Create a reader closure from a HashMap (no global env mutation).
    fn make_reader(vars: HashMap<&str, &str>) -> impl Fn(&str) -> Result<String, VarError> {
        let owned: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| owned.get(key).cloned().ok_or(VarError::NotPresent)
    }

    #[test]
    fn test_missing_api_key() {
        let err = OpsgenieConfig::from_reader(make_reader(HashMap::new())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(_)));
        assert!(err.to_string().contains("OPSGENIE_API_KEY"));
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let reader = make_reader(HashMap::from([("OPSGENIE_API_KEY", "   ")]));
        let err = OpsgenieConfig::from_reader(reader).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(_)));
    }

    #[test]
    fn test_defaults() {
        let reader = make_reader(HashMap::from([("OPSGENIE_API_KEY", "key-123")]));
        let config = OpsgenieConfig::from_reader(reader).expect("should succeed with defaults");

        assert_eq!(config.api_key.expose_secret(), "key-123");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.retry.max_retries, 20);
        assert_eq!(config.retry.initial_backoff_ms, 200);
        assert_eq!(config.connection.request_timeout_secs, 60);
        assert_eq!(config.builtin_roles.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reader_defaults_match_builder() {
        let reader = make_reader(HashMap::from([("OPSGENIE_API_KEY", "key-123")]));
        let loaded = OpsgenieConfig::from_reader(reader).unwrap();
        let built = OpsgenieConfig::builder("key-123").build();

        assert_eq!(loaded.retry.max_retries, built.retry.max_retries);
        assert_eq!(loaded.retry.max_backoff_ms, built.retry.max_backoff_ms);
        assert_eq!(
            loaded.connection.request_timeout_secs,
            built.connection.request_timeout_secs
        );
    }

    #[test]
    fn test_config_error_is_invalid_configuration() {
        let err = ConnectorError::from(ConfigError::MissingVar("OPSGENIE_API_KEY".into()));
        assert!(matches!(err, ConnectorError::InvalidConfiguration { ref message }
            if message.contains("OPSGENIE_API_KEY")));
    }

    #[test]
    fn test_overrides() {
        let reader = make_reader(HashMap::from([
            ("OPSGENIE_API_KEY", "key-123"),
            ("OPSGENIE_BASE_URL", "https://api.eu.opsgenie.com"),
            ("OPSGENIE_PAGE_SIZE", "25"),
            ("OPSGENIE_MAX_RETRIES", "3"),
            ("OPSGENIE_REQUEST_TIMEOUT_SECS", "5"),
        ]));
        let config = OpsgenieConfig::from_reader(reader).unwrap();

        assert_eq!(config.base_url, "https://api.eu.opsgenie.com");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.connection.request_timeout_secs, 5);
    }

    #[test]
    fn test_page_size_out_of_range() {
        for bad in ["0", "101", "lots"] {
            let reader = make_reader(HashMap::from([
                ("OPSGENIE_API_KEY", "key-123"),
                ("OPSGENIE_PAGE_SIZE", bad),
            ]));
            let err = OpsgenieConfig::from_reader(reader).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue(ref var, _) if var == "OPSGENIE_PAGE_SIZE"),
                "value {bad}"
            );
        }
    }

    #[test]
    fn test_invalid_base_url() {
        let reader = make_reader(HashMap::from([
            ("OPSGENIE_API_KEY", "key-123"),
            ("OPSGENIE_BASE_URL", "not a url"),
        ]));
        let err = OpsgenieConfig::from_reader(reader).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(..)));
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let config = OpsgenieConfig::builder("key")
            .base_url("ftp://api.opsgenie.com")
            .build();
        assert!(matches!(
            config.validate(),
            Err(ConnectorError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_redacted_hides_key() {
        let config = OpsgenieConfig::builder("super-secret").build();
        let redacted = config.redacted();
        assert_eq!(redacted.api_key.expose_secret(), REDACTED);

        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_builtin_roles_default_table() {
        let roles = BuiltinRoles::default();
        let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Admin", "User", "Owner", "Stakeholder"]);
        assert!(roles.iter().all(|r| !r.id.is_empty()));
    }
}
