// Rate limiting for Twitter API calls with backoff on 429.
//
// Twitter's app-auth limits are per 15-minute window (300 user lookups,
// 1500 timeline reads). This module provides a sliding-window limiter that
// throttles requests to stay under a budget, plus a retry wrapper that
// handles 429 (Too Many Requests) responses. When the response advertises
// `x-rate-limit-reset` we sleep until then; otherwise we back off
// exponentially with jitter.
//
// The limiter is owned by the client and uses interior mutability so
// callers only need `&self`.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use anyhow::Result;
use thiserror::Error;
use tracing::{info, warn};

/// Requests allowed per window (the tighter user-lookup budget).
pub const DEFAULT_MAX_REQUESTS: u32 = 300;

/// Twitter's rate-limit window: 15 minutes.
pub const DEFAULT_WINDOW_SECS: u64 = 15 * 60;

/// Minimum gap between consecutive requests.
pub const DEFAULT_MIN_DELAY_MS: u64 = 250;

/// Maximum number of retry attempts on rate-limit (429) errors.
const MAX_RETRIES: u32 = 5;

/// Base delay for exponential backoff (doubles each retry).
const BASE_BACKOFF: Duration = Duration::from_secs(2);

/// Maximum backoff delay when no reset time is known.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Never wait longer than one full window for an advertised reset.
const MAX_RESET_WAIT: Duration = Duration::from_secs(DEFAULT_WINDOW_SECS + 1);

/// The platform answered 429.
#[derive(Debug, Error)]
#[error("rate limited by the platform (429)")]
pub struct RateLimited {
    /// Time until the window resets, when the response said so.
    pub reset_after: Option<Duration>,
}

/// How long to wait for a reset advertised as a unix timestamp.
///
/// A reset that is already in the past still waits one second, so a retry
/// never races the platform's own clock.
pub fn delay_until_reset(reset_epoch: i64, now_epoch: i64) -> Duration {
    let secs = reset_epoch.saturating_sub(now_epoch).max(1) as u64;
    Duration::from_secs(secs).min(MAX_RESET_WAIT)
}

struct Window {
    /// Timestamps of recent requests within the current window.
    requests: VecDeque<Instant>,
    /// Timestamp of the last request (for enforcing min_delay).
    last_request: Option<Instant>,
}

/// A sliding-window rate limiter for API calls.
pub struct RateLimiter {
    window_state: Mutex<Window>,
    /// Maximum number of requests allowed per window.
    max_requests: u32,
    /// Duration of the sliding window.
    window: Duration,
    /// Minimum delay between consecutive requests to avoid bursts.
    min_delay: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_REQUESTS,
            Duration::from_secs(DEFAULT_WINDOW_SECS),
            Duration::from_millis(DEFAULT_MIN_DELAY_MS),
        )
    }
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration, min_delay: Duration) -> Self {
        Self {
            window_state: Mutex::new(Window {
                requests: VecDeque::new(),
                last_request: None,
            }),
            max_requests,
            window,
            min_delay,
        }
    }

    fn state(&self) -> MutexGuard<'_, Window> {
        // A panic while holding the lock can't leave the window inconsistent.
        self.window_state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Wait if necessary before making a request.
    ///
    /// Enforces the minimum delay between consecutive requests, then, if the
    /// sliding window is full, sleeps until the oldest request expires.
    pub async fn acquire(&self) {
        // Compute the wait while holding the lock, sleep after dropping it.
        let min_delay_wait = {
            let state = self.state();
            state
                .last_request
                .map(|last| last.elapsed())
                .filter(|elapsed| *elapsed < self.min_delay)
                .map(|elapsed| self.min_delay - elapsed)
        };

        if let Some(wait) = min_delay_wait {
            tokio::time::sleep(wait).await;
        }

        loop {
            let wait = {
                let now = Instant::now();
                let mut state = self.state();

                while let Some(&oldest) = state.requests.front() {
                    if now.duration_since(oldest) > self.window {
                        state.requests.pop_front();
                    } else {
                        break;
                    }
                }

                if (state.requests.len() as u32) < self.max_requests {
                    // Room in the window: record this request and proceed
                    state.requests.push_back(now);
                    state.last_request = Some(now);
                    None
                } else {
                    // Full: wait until the oldest request expires
                    state
                        .requests
                        .front()
                        .map(|&oldest| (oldest + self.window).saturating_duration_since(now))
                }
            };

            match wait {
                None => return,
                Some(wait) => {
                    info!(
                        delay_ms = wait.as_millis() as u64,
                        "Rate limit: waiting {}ms before next request",
                        wait.as_millis()
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    #[cfg(test)]
    fn recorded(&self) -> usize {
        self.state().requests.len()
    }
}

fn backoff_for(attempt: u32) -> Duration {
    let backoff = BASE_BACKOFF
        .saturating_mul(1u32 << attempt)
        .min(MAX_BACKOFF);

    // +/- 25% jitter from the clock's nanosecond component.
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    let jitter_factor = 0.75 + (nanos % 500) as f64 / 1000.0;
    Duration::from_secs_f64(backoff.as_secs_f64() * jitter_factor)
}

/// Retry an async operation when it fails with `RateLimited`.
///
/// Other errors are returned immediately. The limiter's `acquire()` runs
/// before every attempt so retries still respect the sliding window.
pub async fn with_retry<F, Fut, T>(rate_limiter: &RateLimiter, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0u32;

    loop {
        rate_limiter.acquire().await;

        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let reset_after = match err.downcast_ref::<RateLimited>() {
                    Some(limited) if attempt < MAX_RETRIES => limited.reset_after,
                    _ => return Err(err),
                };

                attempt += 1;
                let wait = reset_after.unwrap_or_else(|| backoff_for(attempt));

                warn!(
                    attempt = attempt,
                    max_retries = MAX_RETRIES,
                    wait_secs = wait.as_secs_f64(),
                    "Rate limited (429), retrying in {:.1}s (attempt {}/{})",
                    wait.as_secs_f64(),
                    attempt,
                    MAX_RETRIES,
                );

                tokio::time::sleep(wait).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn unthrottled() -> RateLimiter {
        RateLimiter::new(1000, Duration::from_secs(60), Duration::ZERO)
    }

    #[test]
    fn reset_in_future_waits_the_difference() {
        assert_eq!(delay_until_reset(1_000_030, 1_000_000), Duration::from_secs(30));
    }

    #[test]
    fn reset_in_past_waits_one_second() {
        assert_eq!(delay_until_reset(999_000, 1_000_000), Duration::from_secs(1));
    }

    #[test]
    fn reset_far_away_is_capped() {
        assert_eq!(delay_until_reset(i64::MAX, 0), MAX_RESET_WAIT);
    }

    #[tokio::test]
    async fn acquire_records_requests_under_limit() {
        let limiter = unthrottled();
        for _ in 0..10 {
            limiter.acquire().await;
        }
        assert_eq!(limiter.recorded(), 10);
    }

    #[tokio::test]
    async fn acquire_blocks_when_window_full() {
        let limiter = RateLimiter::new(2, Duration::from_millis(100), Duration::ZERO);

        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        // Third request waits for the first to leave the window
        limiter.acquire().await;
        let elapsed = start.elapsed();

        assert!(
            elapsed >= Duration::from_millis(90),
            "Expected at least ~100ms wait for window expiry, got {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn acquire_enforces_min_delay() {
        let limiter = RateLimiter::new(1000, Duration::from_secs(60), Duration::from_millis(50));

        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        let elapsed = start.elapsed();

        assert!(
            elapsed >= Duration::from_millis(45),
            "Expected at least ~50ms delay, got {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn retry_returns_first_success() {
        let limiter = unthrottled();
        let result = with_retry(&limiter, || async { Ok::<_, anyhow::Error>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn retry_passes_through_other_errors() {
        let limiter = unthrottled();
        let calls = AtomicU32::new(0);

        let result: Result<i32> = with_retry(&limiter, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(anyhow::anyhow!("timeline request returned 500")) }
        })
        .await;

        assert!(result.is_err());
        // Only 429s are retried
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_waits_for_advertised_reset() {
        let limiter = unthrottled();
        let calls = AtomicU32::new(0);

        let start = Instant::now();
        let result = with_retry(&limiter, || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(anyhow::Error::new(RateLimited {
                        reset_after: Some(Duration::from_millis(30)),
                    }))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(start.elapsed() >= Duration::from_millis(25));
    }

    #[tokio::test]
    async fn retry_gives_up_after_max_retries() {
        let limiter = unthrottled();
        let calls = AtomicU32::new(0);

        let result: Result<i32> = with_retry(&limiter, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(anyhow::Error::new(RateLimited {
                    reset_after: Some(Duration::from_millis(1)),
                }))
            }
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.downcast_ref::<RateLimited>().is_some());
        // 1 initial + MAX_RETRIES
        assert_eq!(calls.load(Ordering::SeqCst), MAX_RETRIES + 1);
    }
}
