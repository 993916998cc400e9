//! HTTP access to arXiv with `retry-after` aware retry logic.
//!
//! # Architecture
//!
//! - [`FetchAsync`]: one GET per call, classifying 503 as transient
//! - [`HttpFetch`]: the `reqwest` implementation
//! - [`Sleep`]: how the retry loop waits ([`TokioSleep`] in production)
//! - [`RetryFetch`]: decorator that retries transient failures on any [`FetchAsync`]
//!
//! # Retry Strategy
//!
//! - At most `max_attempts` requests in total (5 by default)
//! - Only `503 Service Unavailable` is retried; anything else fails at once
//! - The wait is the server's `Retry-After` (seconds) or `default_wait` (30s)
//! - No wait after the last attempt; the loop reports [`FetchError::Exhausted`]

use crate::error::FetchError;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument, warn};
use url::Url;

/// Trait for a single HTTP GET returning the response body.
pub trait FetchAsync {
    /// Fetch `url` once.
    ///
    /// # Errors
    ///
    /// [`FetchError::Unavailable`] for a 503, [`FetchError::Status`] for any
    /// other non-success status, [`FetchError::Http`] for transport failures.
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Trait for the wait between attempts.
pub trait Sleep {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer, suspending only the calling task.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleep;

impl Sleep for TokioSleep {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// `reqwest`-backed [`FetchAsync`].
#[derive(Debug, Clone)]
pub struct HttpFetch {
    client: reqwest::Client,
}

impl HttpFetch {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl FetchAsync for HttpFetch {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), elapsed_ms = t0.elapsed().as_millis() as u64, "Response received");

        if status == StatusCode::SERVICE_UNAVAILABLE {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            return Err(FetchError::Unavailable { retry_after });
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

/// Parse a `Retry-After` header given in delta-seconds.
///
/// The HTTP-date form is not supported and yields `None`, which makes the
/// caller fall back to its default wait.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Bounds for [`RetryFetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of requests, first one included.
    pub max_attempts: usize,
    /// Wait used when the server sends no usable `Retry-After`.
    pub default_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            default_wait: Duration::from_secs(30),
        }
    }
}

/// Wrapper that retries 503 responses of any [`FetchAsync`] implementation.
pub struct RetryFetch<T, S = TokioSleep> {
    inner: T,
    sleeper: S,
    policy: RetryPolicy,
}

impl<T, S> RetryFetch<T, S>
where
    T: FetchAsync,
    S: Sleep,
{
    pub fn new(inner: T, sleeper: S, policy: RetryPolicy) -> Self {
        Self {
            inner,
            sleeper,
            policy,
        }
    }

    /// Fetch `url`, retrying while the service reports itself unavailable.
    ///
    /// # Errors
    ///
    /// [`FetchError::Exhausted`] once `max_attempts` requests all returned 503;
    /// any non-transient error is returned unchanged from the attempt that hit it.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let total_t0 = Instant::now();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0usize;

        loop {
            attempt += 1;
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(FetchError::Unavailable { retry_after }) => {
                    if attempt >= max_attempts {
                        error!(
                            attempt,
                            max = max_attempts,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                            "fetch() exhausted retries"
                        );
                        return Err(FetchError::Exhausted { attempts: attempt });
                    }
                    let delay = retry_after.unwrap_or(self.policy.default_wait);
                    warn!(
                        attempt,
                        max = max_attempts,
                        ?delay,
                        hinted = retry_after.is_some(),
                        "Service unavailable; backing off"
                    );
                    self.sleeper.sleep(delay).await;
                }
                Err(e) => {
                    error!(attempt, error = %e, "fetch() failed with a non-retryable error");
                    return Err(e);
                }
            }
        }
    }
}

impl<T, S> fmt::Debug for RetryFetch<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("policy", &self.policy)
            .finish()
    }
}
