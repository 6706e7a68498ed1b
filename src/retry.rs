//! Bounded, immediate retry for async operations.
//!
//! The policy only decides how many attempts are allowed; which errors are
//! worth retrying and what to reset between attempts is supplied by the
//! caller, so the same helper serves the embedding and chat flows.

use std::future::Future;

/// How many times an operation may run in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// At least one attempt is always made.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

/// Run `operation` until it succeeds, fails with a non-retriable error, or
/// the attempt budget is spent.
///
/// `operation` receives the 1-based attempt number. `on_retry` runs after
/// each retriable failure that is followed by another attempt. There is no
/// delay between attempts. The last error is returned on exhaustion.
pub async fn retry<T, E, F, Fut>(
    policy: RetryPolicy,
    is_retriable: impl Fn(&E) -> bool,
    mut on_retry: impl FnMut(u32, &E),
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && is_retriable(&err) => {
                on_retry(attempt, &err);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
