//! Resilience helpers for calls that leave the process

pub mod timeout {
    //! Deadlines for persistence calls

    use std::future::Future;
    use std::time::Duration;

    use crate::{Error, Result};

    /// Default deadline for a single persistence operation
    pub const PERSISTENCE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Run `fut` under `limit`.
    ///
    /// On expiry the future is dropped and `Error::Timeout(operation)` is
    /// returned. Dropping does not undo work the store already committed.
    pub async fn bounded<T, F>(limit: Duration, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = limit.as_millis() as u64,
                    "Persistence call timed out"
                );
                Err(Error::Timeout(operation))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::timeout::bounded;
    use crate::Error;
    use std::time::Duration;

    #[tokio::test]
    async fn test_bounded_passes_through_result() {
        let value = bounded(Duration::from_secs(1), "noop", async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);

        let err = bounded::<(), _>(Duration::from_secs(1), "noop", async {
            Err(Error::NotHost)
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Error::NotHost));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let err = bounded(Duration::from_millis(50), "slow load", async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Timeout("slow load")));
        assert!(err.is_retryable());
    }
}
