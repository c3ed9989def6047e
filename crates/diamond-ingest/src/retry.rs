//! Bounded timeout and exponential-backoff retry around store calls.
//!
//! Every directive is idempotent (MERGE semantics), so a call that failed for
//! a transient reason can simply be issued again. Non-transient errors, such
//! as constraint violations, are returned immediately.

use std::future::Future;
use std::time::Duration;

use diamond_graph::GraphError;

/// Retry and timeout settings for store calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Bound on each individual attempt.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(2000),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Run `operation` under the policy's timeout, retrying transient failures.
///
/// Backoff starts at `initial_backoff` and doubles per retry, capped at
/// `max_backoff`.
pub async fn with_retry<F, Fut, T>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, GraphError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GraphError>>,
{
    let mut attempt: u32 = 0;
    let mut backoff = policy.initial_backoff;

    loop {
        attempt += 1;

        let result = match tokio::time::timeout(policy.timeout, operation()).await {
            Ok(result) => result,
            Err(_) => Err(GraphError::Timeout {
                millis: policy.timeout.as_millis() as u64,
            }),
        };

        match result {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        "Store call succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(err) if err.is_transient() && attempt <= policy.max_retries => {
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "Transient store failure, will retry after backoff"
                );
                tokio::time::sleep(backoff).await;
                backoff = next_backoff(backoff, policy.max_backoff);
            }
            Err(err) => {
                if err.is_transient() {
                    tracing::error!(
                        operation = operation_name,
                        attempt,
                        error = %err,
                        "Store call failed: retries exhausted"
                    );
                }
                return Err(err);
            }
        }
    }
}

/// Double `current`, capped at `max`.
fn next_backoff(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(4),
            timeout: Duration::from_millis(200),
        }
    }

    #[tokio::test]
    async fn test_retry_succeeds_first_attempt() {
        let result = with_retry(&fast_policy(3), "test_op", || async { Ok::<i32, GraphError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&fast_policy(3), "test_op", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(GraphError::Connection("connection reset".to_string()))
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&fast_policy(2), "test_op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(GraphError::Connection("refused".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(GraphError::Connection(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_constraint_violation_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&fast_policy(5), "test_op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(GraphError::ConstraintViolation("Player already exists".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(GraphError::ConstraintViolation(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let max = Duration::from_millis(2000);
        assert_eq!(next_backoff(Duration::from_millis(100), max), Duration::from_millis(200));
        assert_eq!(next_backoff(Duration::from_millis(1500), max), max);

        let huge = Duration::from_millis(u64::MAX);
        assert_eq!(next_backoff(huge, huge), huge);
        assert_eq!(next_backoff(Duration::MAX, Duration::MAX), Duration::MAX);
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let policy = RetryPolicy {
            max_retries: 0,
            timeout: Duration::from_millis(10),
            ..fast_policy(0)
        };
        let result = with_retry(&policy, "test_op", || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<(), GraphError>(())
        })
        .await;

        assert!(matches!(result, Err(GraphError::Timeout { millis: 10 })));
    }
}
