//! HTTP retrieval of the published schedule page.

use std::time::{Duration, Instant};

use rand::Rng;
use reqwest::Client;
use tracing::{error, info, warn};

use super::error::FetchError;

/// Configuration for the schedule fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Full-request (read) timeout
    pub read_timeout: Duration,
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry
    pub retry_base_delay: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            max_attempts: 3,
            retry_base_delay: Duration::from_secs(2),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
        }
    }
}

/// Fetches raw schedule markup with bounded timeouts and retries.
pub struct ScheduleFetcher {
    client: Client,
    config: FetcherConfig,
}

impl ScheduleFetcher {
    /// Creates a fetcher with default configuration.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(FetcherConfig::default())
    }

    /// Creates a fetcher with custom configuration.
    pub fn with_config(config: FetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .build()
            .map_err(|e| FetchError::Network {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client, config })
    }

    /// Fetches the schedule page for `group` from `url`.
    ///
    /// Transient failures (timeout, connection error, non-2xx) are retried
    /// with exponential backoff; the backoff sleep suspends only this task.
    pub async fn fetch(&self, group: &str, url: &str) -> Result<String, FetchError> {
        let correlation_id = generate_correlation_id();
        let start = Instant::now();
        let mut delay = self.config.retry_base_delay;
        let mut last_error = FetchError::Network {
            message: "no attempts made".to_string(),
        };

        for attempt in 1..=self.config.max_attempts {
            info!(
                correlation_id = %correlation_id,
                group,
                url,
                attempt,
                "requesting schedule page"
            );

            match self.try_fetch(url).await {
                Ok(body) => {
                    info!(
                        correlation_id = %correlation_id,
                        group,
                        bytes = body.len(),
                        duration_ms = start.elapsed().as_millis() as u64,
                        "schedule page fetched"
                    );
                    return Ok(body);
                }
                Err(e) => {
                    warn!(
                        correlation_id = %correlation_id,
                        group,
                        attempt,
                        error = %e,
                        "fetch attempt failed"
                    );
                    last_error = e;
                    if attempt < self.config.max_attempts && last_error.is_retryable() {
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }

        error!(
            correlation_id = %correlation_id,
            group,
            attempts = self.config.max_attempts,
            error = %last_error,
            "retry budget exhausted"
        );
        Err(last_error)
    }

    async fn try_fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

/// Generates a unique correlation ID for request tracing.
fn generate_correlation_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    let random: u32 = rand::thread_rng().gen();
    format!("{:x}-{:08x}", timestamp & 0xFFFFFFFF, random)
}
