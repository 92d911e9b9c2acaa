//! Retry policy with exponential backoff.
//!
//! The policy is shared configuration: connectors hand one `RetryConfig` to
//! their HTTP client and every request is retried under it.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for retry behavior with exponential backoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds (default: 100).
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds (default: 30000).
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Backoff multiplier (default: 2.0).
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Whether to add up to 25% jitter to backoff (default: true).
    #[serde(default = "default_use_jitter")]
    pub use_jitter: bool,

    /// HTTP status codes that should trigger a retry.
    #[serde(default = "default_retry_status_codes")]
    pub retry_status_codes: Vec<u16>,
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_use_jitter() -> bool {
    true
}

fn default_retry_status_codes() -> Vec<u16> {
    vec![429, 500, 502, 503, 504]
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            use_jitter: default_use_jitter(),
            retry_status_codes: default_retry_status_codes(),
        }
    }
}

impl RetryConfig {
    /// Create a retry config with the given number of retries.
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Disable retries entirely.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_initial_backoff(mut self, ms: u64) -> Self {
        self.initial_backoff_ms = ms;
        self
    }

    #[must_use]
    pub fn with_max_backoff(mut self, ms: u64) -> Self {
        self.max_backoff_ms = ms;
        self
    }

    #[must_use]
    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// Check if a status code should be retried.
    #[must_use]
    pub fn should_retry(&self, status: u16) -> bool {
        self.retry_status_codes.contains(&status)
    }

    /// Backoff before retry number `attempt` (0-indexed):
    /// `initial * multiplier^attempt`, capped at `max_backoff_ms`.
    #[must_use]
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base = self.initial_backoff_ms as f64 * self.backoff_multiplier.powi(exponent);
        let delay_ms = base.min(self.max_backoff_ms as f64);

        let final_ms = if self.use_jitter && delay_ms > 0.0 {
            let jitter = rand::thread_rng().gen_range(0.0..=delay_ms * 0.25);
            delay_ms + jitter
        } else {
            delay_ms
        };

        Duration::from_millis(final_ms as u64)
    }

    /// Validate the configuration.
    /// Delay to honor for a server-supplied Retry-After, capped at the
    /// maximum backoff.
    pub fn retry_after_delay(&self, requested: Duration) -> Duration {
        requested.min(Duration::from_millis(self.max_backoff_ms))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.backoff_multiplier < 1.0 {
            return Err("backoff_multiplier must be >= 1.0".to_string());
        }
        if self.max_backoff_ms < self.initial_backoff_ms {
            return Err("max_backoff_ms must be >= initial_backoff_ms".to_string());
        }
        Ok(())
    }
}

/// Parse a `Retry-After` header given in seconds.
///
/// HTTP-date values are not supported and yield `None`.
#[must_use]
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
