//! Opsgenie REST v2 HTTP client with retry handling.

use std::fmt;
use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;
use xavyo_connector::context::SyncContext;
use xavyo_connector::resilience::{parse_retry_after, RetryConfig};

use crate::config::OpsgenieConfig;
use crate::error::{OpsgenieError, OpsgenieResult};

/// Opsgenie API client.
///
/// Read-only after construction; share it behind an `Arc`.
pub struct OpsgenieClient {
    http_client: reqwest::Client,
    base_url: Url,
    auth_header: HeaderValue,
    retry: RetryConfig,
}

impl fmt::Debug for OpsgenieClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpsgenieClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl OpsgenieClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid, the API key cannot be
    /// sent as a header, or the HTTP client cannot be created.
    pub fn new(config: &OpsgenieConfig) -> OpsgenieResult<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(OpsgenieError::Config(format!(
                "base_url '{}' cannot be a base URL",
                config.base_url
            )));
        }

        let mut auth_header =
            HeaderValue::from_str(&format!("GenieKey {}", config.api_key.expose_secret()))
                .map_err(|_| {
                    OpsgenieError::Config("API key contains invalid header characters".into())
                })?;
        auth_header.set_sensitive(true);

        let http_client = reqwest::Client::builder()
            .connect_timeout(config.connection.connection_timeout())
            .timeout(config.connection.request_timeout())
            .user_agent(config.connection.user_agent.clone())
            .build()
            .map_err(|e| OpsgenieError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url,
            auth_header,
            retry: config.retry.clone(),
        })
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the retry policy.
    #[must_use]
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Builds an endpoint URL from path segments.
    ///
    /// Each segment is percent-encoded, so user-controlled names (schedule
    /// names) cannot change the path structure.
    pub fn endpoint(&self, segments: &[&str]) -> OpsgenieResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                OpsgenieError::Config(format!("base_url '{}' cannot be a base URL", self.base_url))
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    /// Performs a GET request with retry handling and decodes the JSON body.
    #[instrument(skip(self, ctx, url), fields(url = %url))]
    pub async fn get<T: DeserializeOwned>(&self, ctx: &SyncContext, url: Url) -> OpsgenieResult<T> {
        let body = self.request_with_retry(ctx, &url).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Internal method that performs the request with retry logic.
    ///
    /// Retries statuses from the retry policy (429 and 5xx by default) and
    /// connection-level failures. A 429 with a `Retry-After` header waits as
    /// long as the server asks.
    async fn request_with_retry(&self, ctx: &SyncContext, url: &Url) -> OpsgenieResult<Vec<u8>> {
        let mut attempt = 0u32;

        loop {
            ctx.check()?;
            debug!(attempt, "Sending Opsgenie request");

            let request = self
                .http_client
                .get(url.clone())
                .header(AUTHORIZATION, self.auth_header.clone())
                .header(ACCEPT, "application/json")
                .send();

            let response = match ctx.run(async { request.await.map_err(OpsgenieError::from) }).await
            {
                Ok(response) => response,
                Err(OpsgenieError::Http(err))
                    if (err.is_connect() || err.is_timeout()) && attempt < self.retry.max_retries =>
                {
                    let delay = self.retry.calculate_backoff(attempt);
                    warn!(
                        error = %err,
                        attempt = attempt + 1,
                        max_retries = self.retry.max_retries,
                        delay_ms = delay_ms(delay),
                        "Transport error, retrying"
                    );
                    self.sleep(ctx, delay).await?;
                    attempt += 1;
                    continue;
                }
                Err(err) => return Err(err),
            };

            let status = response.status();

            if status.is_success() {
                let body = ctx
                    .run(async { response.bytes().await.map_err(OpsgenieError::from) })
                    .await?;
                return Ok(body.to_vec());
            }

            if self.retry.should_retry(status.as_u16()) && attempt < self.retry.max_retries {
                let retry_after = (status == StatusCode::TOO_MANY_REQUESTS)
                    .then(|| response.headers().get(RETRY_AFTER))
                    .flatten()
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_retry_after)
                    .map(|requested| self.retry.retry_after_delay(requested));
                let delay = retry_after.unwrap_or_else(|| self.retry.calculate_backoff(attempt));

                warn!(
                    status = status.as_u16(),
                    attempt = attempt + 1,
                    max_retries = self.retry.max_retries,
                    delay_ms = delay_ms(delay),
                    "Retryable status from Opsgenie, retrying"
                );
                self.sleep(ctx, delay).await?;
                attempt += 1;
                continue;
            }

            if attempt > 0 && self.retry.should_retry(status.as_u16()) {
                warn!(
                    status = status.as_u16(),
                    attempts = attempt + 1,
                    "Retry budget exhausted"
                );
            }

            // The body is diagnostic only; a failed read still reports the status.
            let body = match ctx
                .run(async { response.text().await.map_err(OpsgenieError::from) })
                .await
            {
                Ok(text) => text,
                Err(OpsgenieError::Http(_)) => String::new(),
                Err(err) => return Err(err),
            };
            return Err(OpsgenieError::from_response(status.as_u16(), &body));
        }
    }

    /// Backoff sleep that aborts on cancellation or deadline.
    async fn sleep(&self, ctx: &SyncContext, delay: Duration) -> OpsgenieResult<()> {
        ctx.run(async {
            tokio::time::sleep(delay).await;
            Ok::<(), OpsgenieError>(())
        })
        .await
    }
}

fn delay_ms(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> OpsgenieClient {
        let config = OpsgenieConfig::builder("test-key").base_url(base_url).build();
        OpsgenieClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let client = client("https://api.opsgenie.com");
        let url = client.endpoint(&["v2", "users"]).unwrap();
        assert_eq!(url.as_str(), "https://api.opsgenie.com/v2/users");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client("http://127.0.0.1:8080/proxy/");
        let url = client.endpoint(&["v2", "teams", "t1"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/proxy/v2/teams/t1");
    }

    #[test]
    fn test_endpoint_encodes_names() {
        let client = client("https://api.opsgenie.com");
        let url = client
            .endpoint(&["v2", "schedules", "Ops / Night shift", "on-calls"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.opsgenie.com/v2/schedules/Ops%20%2F%20Night%20shift/on-calls"
        );
    }

    #[test]
    fn test_debug_hides_key() {
        let client = client("https://api.opsgenie.com");
        let debug = format!("{client:?}");
        assert!(!debug.contains("test-key"));
    }

    #[test]
    fn test_invalid_key_rejected() {
        let config = OpsgenieConfig::builder("bad\nkey").build();
        assert!(matches!(
            OpsgenieClient::new(&config),
            Err(OpsgenieError::Config(_))
        ));
    }
}
