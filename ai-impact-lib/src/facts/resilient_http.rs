//! HTTP GET with retries for transient failures.
//!
//! Connection errors, per-attempt timeouts and 5xx responses are retried with
//! exponential backoff. Every other response, including 403 and 429, is handed
//! back to the caller, which knows how the particular API signals rate limits.

use core::time::Duration;
use ohno::app_err;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;

const LOG_TARGET: &str = "      http";

/// Timeout applied to each attempt when the caller has no configured value.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Retries on top of the original request.
const MAX_RETRY_ATTEMPTS: usize = 3;

/// Backoff is `2^n * RETRY_FACTOR_MS` milliseconds: 1s, 2s, 4s.
const RETRY_FACTOR_MS: u64 = 500;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug)]
enum Failure {
    Transient(ohno::AppError),
    Permanent(ohno::AppError),
}

/// Send a GET request, retrying transient failures.
pub async fn resilient_get(client: &reqwest::Client, url: &str, timeout: Duration) -> crate::Result<reqwest::Response> {
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(RETRY_FACTOR_MS)
        .max_delay(MAX_RETRY_DELAY)
        .take(MAX_RETRY_ATTEMPTS);

    let mut attempt = 0_u32;
    let action = || {
        attempt += 1;
        let current = attempt;
        let request = client.get(url);

        async move {
            if current > 1 {
                log::debug!(target: LOG_TARGET, "Retrying GET {url} (attempt {current})");
            }

            match tokio::time::timeout(timeout, request.send()).await {
                Err(_elapsed) => Err(Failure::Transient(app_err!("GET {url} timed out after {}s", timeout.as_secs()))),
                Ok(Err(e)) if e.is_builder() => Err(Failure::Permanent(e.into())),
                Ok(Err(e)) => Err(Failure::Transient(e.into())),
                Ok(Ok(response)) if response.status().is_server_error() => {
                    Err(Failure::Transient(app_err!("GET {url} failed with status {}", response.status())))
                }
                Ok(Ok(response)) => Ok(response),
            }
        }
    };

    RetryIf::start(strategy, action, |failure: &Failure| matches!(failure, Failure::Transient(_)))
        .await
        .map_err(|failure| match failure {
            Failure::Transient(e) | Failure::Permanent(e) => e,
        })
}
