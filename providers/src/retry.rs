//! HTTP retry policy with exponential backoff.
//!
//! Retry lives here and nowhere else: the orchestration engine above this
//! crate degrades gracefully instead of retrying, so a request that reaches
//! the engine has already used up its attempts.
//!
//! Policy:
//! - max 2 retries (3 total attempts)
//! - exponential backoff from 500ms, capped at 8s
//! - down-jitter up to 25%
//! - `Retry-After` honored when present and under a minute
//! - retries on HTTP 408, 409, 429, 5xx and on transport errors
//! - one `Idempotency-Key` across all attempts of a logical request

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode, header::HeaderMap};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Down-jitter fraction: delay is scaled by a factor in
    /// [1 - jitter_factor, 1].
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            jitter_factor: 0.25,
        }
    }
}

/// Terminal result of a retried request.
///
/// Success and failure are separate variants so a caller cannot mistake an
/// error response for a good one.
#[derive(Debug)]
pub enum RetryOutcome {
    /// 2xx response.
    Success(Response),
    /// Non-2xx response after retries were exhausted or declined.
    HttpError(Response),
    /// Transport failure after retries were exhausted or declined.
    ConnectionError { attempts: u32, source: reqwest::Error },
}

/// Whether a status is worth another attempt.
#[must_use]
pub fn should_retry(status: StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 409 | 429 | 500..=599)
}

/// `Retry-After` in seconds, accepted when positive and under a minute.
#[must_use]
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let secs = headers.get("retry-after")?.to_str().ok()?.parse::<u64>().ok()?;
    (secs > 0 && secs < 60).then(|| Duration::from_secs(secs))
}

/// Delay before retry number `backoff_step + 1`, honoring `Retry-After`.
#[must_use]
pub fn backoff_delay(
    backoff_step: u32,
    config: &RetryConfig,
    headers: Option<&HeaderMap>,
) -> Duration {
    if let Some(delay) = headers.and_then(parse_retry_after) {
        return delay;
    }

    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(backoff_step as i32);
    let capped = base.min(config.max_delay.as_secs_f64());
    let jitter = 1.0 - rand::random::<f64>() * config.jitter_factor;
    Duration::from_secs_f64(capped * jitter)
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout() || error.is_request()
}

/// Send a request, retrying on retryable statuses and transport errors.
///
/// `build_request` is called once per attempt; every attempt carries the
/// same `Idempotency-Key` so the server can deduplicate.
pub async fn send_with_retry<F>(build_request: F, config: &RetryConfig) -> RetryOutcome
where
    F: Fn() -> RequestBuilder,
{
    let idempotency_key = format!("hearth-retry-{}", Uuid::new_v4());
    let mut attempt: u32 = 0;

    loop {
        let retries_left = attempt < config.max_retries;
        let request = build_request().header("Idempotency-Key", &idempotency_key);

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return RetryOutcome::Success(response);
                }
                if retries_left && should_retry(status) {
                    let delay = backoff_delay(attempt, config, Some(response.headers()));
                    tracing::debug!(
                        status = %status,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis(),
                        "retrying request after error status"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    continue;
                }
                return RetryOutcome::HttpError(response);
            }
            Err(e) => {
                if retries_left && is_retryable_error(&e) {
                    let delay = backoff_delay(attempt, config, None);
                    tracing::debug!(
                        error = %e,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis(),
                        "retrying request after transport error"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    continue;
                }
                return RetryOutcome::ConnectionError {
                    attempts: attempt + 1,
                    source: e,
                };
            }
        }
    }
}
