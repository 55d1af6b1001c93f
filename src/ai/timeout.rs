//! Provider Call Timeouts
//!
//! Wraps a single provider call in a deadline. Expiry becomes a
//! `ProviderErrorKind::Timeout`; whether to retry is the chain's decision.
//!
//! Dropping the returned future (for instance when a caller cancels the
//! whole request) drops the wrapped call with it.

use std::future::Future;
use std::time::Duration;

use crate::types::{ProviderError, ProviderResult};

/// Execute a provider call with a timeout
///
/// # Arguments
///
/// * `timeout` - Maximum duration to wait
/// * `future` - The provider call to execute
/// * `operation_name` - Description of the operation (for error messages)
pub async fn with_timeout<T, F>(
    timeout: Duration,
    future: F,
    operation_name: &str,
) -> ProviderResult<T>
where
    F: Future<Output = ProviderResult<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::timeout(format!(
            "{} timed out after {}ms",
            operation_name,
            timeout.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProviderErrorKind;

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, ProviderError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, ProviderError>(42)
            },
            "slow operation",
        )
        .await;
        let err = result.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Timeout);
        assert!(err.message.contains("slow operation"));
    }

    #[tokio::test]
    async fn test_with_timeout_passes_inner_error() {
        let result: ProviderResult<()> = with_timeout(
            Duration::from_secs(1),
            async { Err(ProviderError::unavailable("down")) },
            "op",
        )
        .await;
        assert_eq!(result.unwrap_err().kind, ProviderErrorKind::Unavailable);
    }
}
