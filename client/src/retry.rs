//! Fixed-delay retry for operations that have no useful fallback.

use log::warn;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause between a failed attempt and the next one.
    pub delay: Duration,
    /// `None` retries until the operation succeeds.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn forever(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    pub fn limited(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: Some(max_attempts.max(1)),
        }
    }

    fn exhausted(&self, attempt: u32) -> bool {
        self.max_attempts.map_or(false, |max| attempt >= max)
    }
}

/// Runs `operation` until it succeeds or the policy gives up, in which case
/// the last error is returned.
///
/// The returned future only sleeps between attempts, so dropping it (or
/// aborting the task that drives it) cancels the retry loop.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if policy.exhausted(attempt) => return Err(e),
            Err(e) => {
                warn!(
                    "Attempt {} failed: {}; retrying in {:?}",
                    attempt, e, policy.delay
                );
                sleep(policy.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_succeeds_after_failures() {
        let policy = RetryPolicy::forever(Duration::from_millis(5));
        let result: Result<u32, String> = retry(&policy, |attempt| async move {
            if attempt < 4 {
                Err(format!("attempt {} refused", attempt))
            } else {
                Ok(attempt)
            }
        })
        .await;

        assert_eq!(result, Ok(4));
    }

    #[tokio::test]
    async fn test_limited_policy_returns_last_error() {
        let policy = RetryPolicy::limited(Duration::from_millis(1), 3);
        let mut calls = 0;
        let result: Result<(), String> = retry(&policy, |attempt| {
            calls += 1;
            async move { Err(format!("failure {}", attempt)) }
        })
        .await;

        assert_eq!(result, Err("failure 3".to_string()));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_waits_between_attempts() {
        let policy = RetryPolicy::limited(Duration::from_millis(30), 3);
        let start = Instant::now();
        let _: Result<(), &str> = retry(&policy, |_| async { Err("down") }).await;

        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_forever_policy_can_be_cancelled() {
        let policy = RetryPolicy::forever(Duration::from_millis(10));
        let attempt = retry(&policy, |_| async { Err::<(), _>("unreachable") });

        let outcome = tokio::time::timeout(Duration::from_millis(50), attempt).await;
        assert!(outcome.is_err());
    }

    #[test]
    fn test_limited_policy_needs_at_least_one_attempt() {
        let policy = RetryPolicy::limited(Duration::from_millis(1), 0);
        assert_eq!(policy.max_attempts, Some(1));
        assert!(policy.exhausted(1));
    }
}
