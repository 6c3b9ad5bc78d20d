// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Bounded retry for blocking operations
//!
//! Knows nothing about HTTP: the caller supplies one attempt as a closure and
//! gets back either the first success or the last failure.

use backon::{BlockingRetryable, ConstantBuilder};
use std::cell::Cell;
use std::fmt::Display;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
    delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` counts the first try; zero is treated as one.
    #[must_use]
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    #[must_use]
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Every attempt failed.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: usize,
    pub last: E,
}

/// Run `attempt` until it succeeds or the policy's attempts are used up.
///
/// `attempt` receives the 1-based attempt number.
pub fn execute_with_retry<T, E, F>(
    policy: &RetryPolicy,
    mut attempt: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(usize) -> Result<T, E>,
    E: Display,
{
    let attempts = Cell::new(0usize);
    let max_attempts = policy.max_attempts;

    let backoff = ConstantBuilder::default()
        .with_delay(policy.delay)
        .with_max_times(max_attempts - 1);

    let result = (|| {
        attempts.set(attempts.get() + 1);
        attempt(attempts.get())
    })
    .retry(backoff)
    .notify(|err: &E, dur: Duration| {
        let failed = attempts.get() as u64;
        let error = err.to_string();
        diagnostics::log_warn!(
            "Attempt {failed} of {max} failed, retrying in {delay_ms}ms: {error}",
            failed: failed,
            max: max_attempts as u64,
            delay_ms: dur.as_millis() as u64,
            error: error.as_str()
        );
    })
    .call();

    result.map_err(|last| RetryExhausted {
        attempts: attempts.get(),
        last,
    })
}
