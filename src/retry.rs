//! Retry combinators for asynchronous widget initialization.
//!
//! The portal's client-side widgets render with no reliable "ready" signal, so
//! several steps are polled until they succeed. These combinators make that
//! policy an explicit unit instead of catch-all exception handling scattered
//! through the call sites.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::{Error, Result};

/// How often and how long to keep retrying an operation.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Delay between attempts.
    pub delay: Duration,
    /// Maximum number of attempts; `None` retries until the operation succeeds.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Retry forever, pausing `delay` between attempts.
    pub fn unbounded(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// Retry at most `attempts` times, pausing `delay` between attempts.
    pub fn bounded(delay: Duration, attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: Some(attempts),
        }
    }
}

/// Run `op` until it succeeds, retrying transient failures (`NotFound`,
/// `Stale`). Any other error propagates immediately; exhausting a bounded
/// policy returns the last error.
pub async fn transient<T, F, Fut>(policy: &RetryPolicy, op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_while(policy, |e| e.is_transient(), op).await
}

/// Run `op` until it succeeds, retrying on every error. This is the policy for
/// widget interactions where any failure just means "not rendered yet".
pub async fn any<T, F, Fut>(policy: &RetryPolicy, op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_while(policy, |_| true, op).await
}

async fn retry_while<T, F, Fut, P>(policy: &RetryPolicy, should_retry: P, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&Error) -> bool,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if should_retry(&e) => {
                if let Some(max) = policy.max_attempts {
                    if attempt >= max {
                        return Err(e);
                    }
                }
                debug!(attempt, error = %e, "retrying");
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy() -> RetryPolicy {
        RetryPolicy::unbounded(Duration::from_millis(100))
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_retries_until_success() {
        let calls = AtomicU32::new(0);
        let result = transient(&policy(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 4 {
                    Err(Error::NotFound("button".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_propagates_fatal_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = transient(&policy(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::Parse("bad clock".into())) }
        })
        .await;
        assert!(matches!(result, Err(Error::Parse(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_returns_last_error() {
        let bounded = RetryPolicy::bounded(Duration::from_millis(10), 3);
        let calls = AtomicU32::new(0);
        let result: Result<()> = transient(&bounded, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::Stale("row".into())) }
        })
        .await;
        assert!(matches!(result, Err(Error::Stale(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_any_swallows_every_error() {
        let calls = AtomicU32::new(0);
        let result = any(&policy(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                match n {
                    1 => Err(Error::Parse("menu not rendered".into())),
                    2 => Err(Error::NotFound("speed option".into())),
                    _ => Ok("2.0x"),
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "2.0x");
    }
}
