// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::mailer::MailError;
use crate::repository::{RepositoryError, RepositoryErrorKind};
use std::time::Duration;
use tracing::warn;

/// Errors that may succeed when the operation is repeated.
pub trait Retryable {
    fn is_transient(&self) -> bool;
}

// Only an unavailable store is retried. A failed statement, such as a
// CHECK or foreign key violation, fails the same way every time.
impl Retryable for RepositoryError {
    fn is_transient(&self) -> bool {
        matches!(self.kind(), RepositoryErrorKind::Unavailable)
    }
}

impl Retryable for MailError {
    fn is_transient(&self) -> bool {
        matches!(self, MailError::Unavailable(_))
    }
}

/// Bounded linear backoff for repository and mail calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before attempt `n + 1` is `base_delay * n`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// A policy that retries without sleeping.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::ZERO,
        }
    }
}

/// Runs `operation`, retrying transient failures per `policy`.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted, or the first
/// non-transient error.
pub fn with_retry<T, E, F>(policy: &RetryPolicy, what: &str, mut operation: F) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut() -> Result<T, E>,
{
    let mut attempt: u32 = 1;
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                warn!(
                    operation = what,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %err,
                    "Transient failure, retrying"
                );
                std::thread::sleep(policy.base_delay * attempt);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_failures_are_retried() {
        let mut calls: u32 = 0;
        let result: Result<u32, RepositoryError> =
            with_retry(&RetryPolicy::immediate(), "test", || {
                calls += 1;
                if calls < 3 {
                    Err(RepositoryError::unavailable("busy"))
                } else {
                    Ok(calls)
                }
            });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_exhaustion_returns_last_error() {
        let mut calls: u32 = 0;
        let result: Result<(), RepositoryError> =
            with_retry(&RetryPolicy::immediate(), "test", || {
                calls += 1;
                Err(RepositoryError::unavailable("database is locked"))
            });
        assert_eq!(calls, 3);
        assert_eq!(result.unwrap_err().kind(), RepositoryErrorKind::Unavailable);
    }

    #[test]
    fn test_permanent_failures_are_not_retried() {
        for err in [
            RepositoryError::conflict("duplicate"),
            RepositoryError::query("FOREIGN KEY constraint failed"),
            RepositoryError::not_found("evaluation 7"),
        ] {
            let kind = err.kind();
            let mut calls: u32 = 0;
            let result: Result<(), RepositoryError> = with_retry(
                &RetryPolicy::new(3, std::time::Duration::from_secs(60)),
                "test",
                || {
                    calls += 1;
                    Err(err.clone())
                },
            );
            assert_eq!(calls, 1);
            assert_eq!(result.unwrap_err().kind(), kind);
        }
    }
}
