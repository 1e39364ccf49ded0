//! Fixed-delay retry applied at orchestrator boundaries.
//!
//! Unlike HTTP backoff, every retry here waits the same fixed delay: the
//! failures being retried (an empty first render, an injection that raced
//! hydration) clear up on a timescale unrelated to how often they happened.

use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// One attempt plus a single retry after `delay`.
    #[must_use]
    pub const fn once(delay: Duration) -> Self {
        Self {
            max_attempts: 2,
            delay,
        }
    }

    #[must_use]
    pub const fn never() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Runs `operation` until `should_retry` rejects its output or attempts
    /// run out, then returns the last output.
    ///
    /// `operation` receives the 1-based attempt number.
    pub async fn run<O, F, Fut>(
        &self,
        label: &'static str,
        mut operation: F,
        should_retry: impl Fn(&O) -> bool,
    ) -> O
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = O>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1u32;
        loop {
            let output = operation(attempt).await;
            if attempt >= attempts || !should_retry(&output) {
                return output;
            }
            tracing::debug!(
                label,
                attempt,
                delay_ms = u64::try_from(self.delay.as_millis()).unwrap_or(u64::MAX),
                "retrying after fixed delay"
            );
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            attempt += 1;
        }
    }
}
