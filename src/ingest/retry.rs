/// JSON fetching with bounded exponential backoff.
///
/// The upstream feed occasionally answers with 5xx or drops connections.
/// `fetch_json_with_retry` makes up to `max_attempts` requests, waiting
/// `base_delay * 2^attempt` between them (no jitter, no wait after the final
/// attempt), and returns the last failure once attempts are exhausted.
///
/// # Seams
/// Transport and waiting are both traits so the policy can be tested without
/// a network or a real clock:
/// - `JsonFetcher` is implemented for `reqwest::blocking::Client`.
/// - `Sleeper` is implemented by `ThreadSleeper` (blocks the calling thread).

use std::time::Duration;

use crate::logging::{self, DataSource};
use crate::model::{AqError, TransportError};

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// Something that can GET a URL and decode the body as JSON.
pub trait JsonFetcher {
    fn fetch_json(&self, url: &str) -> Result<serde_json::Value, TransportError>;
}

impl JsonFetcher for reqwest::blocking::Client {
    fn fetch_json(&self, url: &str) -> Result<serde_json::Value, TransportError> {
        let response = self
            .get(url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        response
            .json::<serde_json::Value>()
            .map_err(|e| TransportError::Body(e.to_string()))
    }
}

impl<T: JsonFetcher + ?Sized> JsonFetcher for &T {
    fn fetch_json(&self, url: &str) -> Result<serde_json::Value, TransportError> {
        (**self).fetch_json(url)
    }
}

/// Suspends the caller between attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Real sleeper: blocks the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<T: Sleeper + ?Sized> Sleeper for &T {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Wait after the failed attempt `attempt_index` (0-based).
    pub fn delay_after(&self, attempt_index: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt_index).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

// ---------------------------------------------------------------------------
// Retrying fetch
// ---------------------------------------------------------------------------

/// GETs `url` as JSON, retrying transport failures and non-2xx responses.
///
/// Returns `AqError::Fetch` carrying the last transport failure after
/// `policy.max_attempts` attempts.
pub fn fetch_json_with_retry<F, S>(
    fetcher: &F,
    sleeper: &S,
    url: &str,
    policy: &RetryPolicy,
) -> Result<serde_json::Value, AqError>
where
    F: JsonFetcher + ?Sized,
    S: Sleeper + ?Sized,
{
    let attempts = policy.attempts();
    let mut attempt = 0;

    loop {
        match fetcher.fetch_json(url) {
            Ok(value) => return Ok(value),
            Err(cause) => {
                if attempt + 1 >= attempts {
                    return Err(AqError::Fetch {
                        url: url.to_string(),
                        attempts,
                        cause,
                    });
                }

                let delay = policy.delay_after(attempt);
                logging::debug(
                    DataSource::OpenMeteo,
                    None,
                    &format!(
                        "attempt {}/{} failed ({}), retrying in {} ms",
                        attempt + 1,
                        attempts,
                        cause,
                        delay.as_millis()
                    ),
                );
                sleeper.sleep(delay);
                attempt += 1;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
