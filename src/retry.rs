use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::error::SyncError;

/// Upload attempts per file, including the first one.
pub const MAX_ATTEMPTS: u32 = 3;

/// Delay before retry number `attempt + 1`: 1s, 2s, 4s, ...
pub fn exponential_backoff(attempt: u32) -> Duration {
    Duration::from_millis(1000 * 2u64.pow(attempt.saturating_sub(1)))
}

/// Runs `op` up to `max_attempts` times, sleeping `backoff(attempt)` between
/// attempts. The last error is returned once the budget is exhausted.
///
/// `op` receives the 1-based attempt number. The loop is sequential and holds
/// no state beyond the attempt counter, so it can be reused unchanged should
/// uploads ever move to a worker pool.
pub async fn retry_with_backoff<T, F, Fut, B>(
    max_attempts: u32,
    backoff: B,
    mut op: F,
) -> Result<T, SyncError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, SyncError>>,
    B: Fn(u32) -> Duration,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts => {
                let delay = backoff(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    error = %err,
                    "attempt failed, retrying in {}ms",
                    delay.as_millis()
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio::time::Instant;

    #[test]
    fn backoff_doubles_from_one_second() {
        assert_eq!(exponential_backoff(1), Duration::from_millis(1000));
        assert_eq!(exponential_backoff(2), Duration::from_millis(2000));
        assert_eq!(exponential_backoff(3), Duration::from_millis(4000));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_max_attempts_and_returns_last_error() {
        let calls = Cell::new(0u32);
        let start = Instant::now();

        let result: Result<(), _> = retry_with_backoff(MAX_ATTEMPTS, exponential_backoff, |n| {
            calls.set(calls.get() + 1);
            async move {
                Err(SyncError::StorageError {
                    message: format!("boom {}", n),
                })
            }
        })
        .await;

        assert_eq!(calls.get(), 3);
        // 1s after the first failure, 2s after the second.
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
        assert!(matches!(
            result,
            Err(SyncError::StorageError { message }) if message == "boom 3"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_without_sleeping_when_first_attempt_works() {
        let start = Instant::now();
        let result =
            retry_with_backoff(MAX_ATTEMPTS, exponential_backoff, |_| async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_when_a_later_attempt_succeeds() {
        let calls = Cell::new(0u32);
        let result = retry_with_backoff(MAX_ATTEMPTS, exponential_backoff, |n| {
            calls.set(calls.get() + 1);
            async move {
                if n < 3 {
                    Err(SyncError::StorageError {
                        message: "transient".into(),
                    })
                } else {
                    Ok("done")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 3);
    }
}
