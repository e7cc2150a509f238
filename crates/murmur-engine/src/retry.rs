// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exponential backoff for per-target retries.

use std::time::Duration;

use async_trait::async_trait;
use murmur_config::model::EngineConfig;

/// Delay before retry number `retry` (1-based): `base * 2^(retry - 1)`.
///
/// Retry 0 is the first attempt and never waits. Saturates instead of overflowing.
pub fn backoff_delay(retry: u32, base: Duration) -> Duration {
    if retry == 0 {
        return Duration::ZERO;
    }
    let factor = 1u32.checked_shl(retry - 1).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

/// How many times and how patiently a target is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.backoff_base_ms),
        }
    }

    pub fn delay_for(&self, retry: u32) -> Duration {
        backoff_delay(retry, self.base_delay)
    }
}

/// Source of backoff sleeps, swappable so tests can observe delays without waiting.
#[async_trait]
pub trait Sleeper: Send + Sync + 'static {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_attempt_never_waits() {
        assert_eq!(backoff_delay(0, Duration::from_secs(1)), Duration::ZERO);
    }

    #[test]
    fn doubles_per_retry() {
        let base = Duration::from_secs(1);
        let delays: Vec<u64> = (1..=5).map(|k| backoff_delay(k, base).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16]);
    }

    #[test]
    fn policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
    }

    #[test]
    fn saturates_on_huge_retry_counts() {
        assert_eq!(
            backoff_delay(64, Duration::from_secs(1)),
            Duration::from_secs(u32::MAX as u64)
        );
    }

    proptest! {
        #[test]
        fn matches_closed_form(retry in 1u32..20, base_ms in 1u64..5000) {
            let base = Duration::from_millis(base_ms);
            let expected = Duration::from_millis(base_ms * (1u64 << (retry - 1)));
            prop_assert_eq!(backoff_delay(retry, base), expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_sleeper_advances_virtual_time() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_secs(8)).await;
        assert!(start.elapsed() >= Duration::from_secs(8));
    }
}
