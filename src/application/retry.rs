use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use crate::domain::DomainError;

pub type RetryPredicate = fn(&DomainError) -> bool;

/// Exponential backoff around a fallible async call.
///
/// Attempt `n` (1-based) that fails with a retryable error is followed by a wait of
/// `base_delay * 2^(n-1)`, capped at `max_delay`. Each attempt is bounded by
/// `attempt_timeout` and no wait may cross the overall `deadline`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub attempt_timeout: Duration,
    pub deadline: Duration,
    retry_on: RetryPredicate,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(16),
            attempt_timeout: Duration::from_secs(60),
            deadline: Duration::from_secs(120),
            retry_on: DomainError::is_rate_limited,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_retry_on(mut self, predicate: RetryPredicate) -> Self {
        self.retry_on = predicate;
        self
    }

    pub fn should_retry(&self, error: &DomainError) -> bool {
        (self.retry_on)(error)
    }

    /// Wait after the given failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, DomainError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        let started = Instant::now();
        let mut attempt = 1;

        loop {
            let budget = self
                .attempt_timeout
                .min(self.deadline.saturating_sub(started.elapsed()));

            let error = match tokio::time::timeout(budget, operation(attempt)).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => e,
                Err(_) => {
                    return Err(DomainError::timeout(format!(
                        "attempt {attempt} exceeded {}ms",
                        budget.as_millis()
                    )))
                }
            };

            if !self.should_retry(&error) || attempt >= self.max_attempts {
                return Err(error);
            }

            let delay = self.delay_for(attempt);
            if started.elapsed() + delay > self.deadline {
                warn!(attempt, error = %error, "retry deadline exhausted");
                return Err(error);
            }

            warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "transient failure, backing off"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_schedule_doubles_from_base() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = (1..=5).map(|a| policy.delay_for(a).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16]);
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy::default().with_max_delay(Duration::from_secs(3));
        assert_eq!(policy.delay_for(3), Duration::from_secs(3));
        assert_eq!(policy.delay_for(40), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhausts_five_attempts() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let started = Instant::now();

        let result: Result<(), _> = RetryPolicy::default()
            .run(move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(DomainError::rate_limited("429"))
            })
            .await;

        assert!(matches!(result, Err(DomainError::RateLimited(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        // 1 + 2 + 4 + 8 seconds of backoff between five attempts
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(15));
        assert!(elapsed < Duration::from_secs(16));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result = RetryPolicy::default()
            .run(move |attempt| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 3 {
                        Err(DomainError::rate_limited("slow down"))
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let started = Instant::now();

        let result: Result<(), _> = RetryPolicy::default()
            .run(move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(DomainError::external("401 unauthorized"))
            })
            .await;

        assert!(matches!(result, Err(DomainError::ExternalService(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_predicate() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), _> = RetryPolicy::default()
            .with_max_attempts(2)
            .with_retry_on(|e| matches!(e, DomainError::Validation(_)))
            .run(move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ValidationError::MissingQuery.into())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_timeout() {
        let result: Result<(), _> = RetryPolicy::default()
            .with_attempt_timeout(Duration::from_secs(2))
            .run(|_| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(DomainError::Timeout(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_stops_backoff_early() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), _> = RetryPolicy::default()
            .with_deadline(Duration::from_secs(5))
            .run(move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(DomainError::rate_limited("429"))
            })
            .await;

        assert!(matches!(result, Err(DomainError::RateLimited(_))));
        // waits of 1s and 2s fit, the 4s wait would cross the 5s deadline
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
