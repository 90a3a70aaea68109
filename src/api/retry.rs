use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Anything carrying an HTTP status the retry loop can inspect.
pub trait HasStatus {
    fn status(&self) -> StatusCode;
}

impl HasStatus for reqwest::Response {
    fn status(&self) -> StatusCode {
        reqwest::Response::status(self)
    }
}

/// Statuses worth retrying: rate limiting and transient server errors.
pub fn is_transient(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

/// Capped exponential backoff around a provider call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub retryable: fn(StatusCode) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(400),
            max_delay: Duration::from_secs(4),
            retryable: is_transient,
        }
    }
}

impl RetryPolicy {
    /// Wait before the attempt following `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    /// Run `call` until it yields a non-retryable status or attempts run out.
    ///
    /// Returns the last response whatever its status; the caller decides what a
    /// failure means. Errors from `call` itself end the loop immediately.
    pub async fn run<R, E, F, Fut>(&self, mut call: F) -> Result<R, E>
    where
        R: HasStatus,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let response = call().await?;
            let status = response.status();

            if status.is_success() || !(self.retryable)(status) || attempt + 1 >= attempts {
                return Ok(response);
            }

            let wait = self.delay_for(attempt);
            warn!(
                %status,
                attempt = attempt + 1,
                max_attempts = attempts,
                wait_ms = wait.as_millis() as u64,
                "Routing provider busy, retrying"
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}
