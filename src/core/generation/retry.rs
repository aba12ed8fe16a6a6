//! Bounded Retry Coordinator
//!
//! A reusable retry combinator shared by every generation flow: one
//! implementation of the attempt budget, the increasing backoff, and the
//! terminal error classification.
//!
//! Attempts are strictly sequential: attempt N+1 never starts before
//! attempt N's result is known and the backoff for attempt N has fully
//! elapsed. A cancellation signal aborts both the in-flight operation and
//! any pending backoff.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;

use super::{GenerationError, Result};

// ============================================================================
// Retry Policy
// ============================================================================

/// Attempt budget and backoff schedule.
///
/// The delay before attempt N+1 is `backoff_unit * N`, so backoff is
/// strictly increasing across a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts,
            backoff_unit,
        }
    }

    /// Zero-delay policy for tests and latency-sensitive callers.
    pub fn no_backoff(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Delay inserted after a failed attempt, before the next one.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_unit * attempt
    }
}

// ============================================================================
// Retry Combinator
// ============================================================================

/// Run `op` up to `policy.max_attempts` times, sleeping the policy's
/// backoff between failed attempts.
///
/// `op` receives the 1-based attempt number and must be safe to call
/// repeatedly with the same input; each call is a fresh backend invocation.
/// After the budget is spent the terminal error embeds the subject, the
/// total attempts made, and the last recorded error's message — a partial
/// or default artifact is never returned.
pub async fn retry_with_policy<T, F, Fut>(
    policy: &RetryPolicy,
    subject: &str,
    mut cancel: Option<watch::Receiver<bool>>,
    mut op: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error: Option<GenerationError> = None;
    let mut attempt = 0u32;

    while attempt < policy.max_attempts {
        attempt += 1;

        let result = tokio::select! {
            res = op(attempt) => res,
            _ = canceled(&mut cancel) => {
                log::info!("Generation for '{subject}' canceled during attempt {attempt}");
                return Err(GenerationError::Canceled);
            }
        };

        match result {
            Ok(value) => {
                log::debug!("Generation for '{subject}' accepted on attempt {attempt}");
                return Ok(value);
            }
            Err(GenerationError::Canceled) => return Err(GenerationError::Canceled),
            Err(e) => {
                log::warn!(
                    "Attempt {attempt}/{} for '{subject}' failed: {e}",
                    policy.max_attempts
                );
                last_error = Some(e);

                if attempt < policy.max_attempts {
                    let delay = policy.delay_for_attempt(attempt);
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = canceled(&mut cancel) => {
                            log::info!("Generation for '{subject}' canceled during backoff");
                            return Err(GenerationError::Canceled);
                        }
                    }
                }
            }
        }
    }

    Err(GenerationError::ExhaustedRetries {
        subject: subject.to_string(),
        attempts: policy.max_attempts,
        last_error: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempts were made".to_string()),
    })
}

/// Resolves when the cancellation signal fires; pends forever when no
/// signal was provided or the sender side is gone.
async fn canceled(rx: &mut Option<watch::Receiver<bool>>) {
    match rx {
        Some(rx) => loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        },
        None => std::future::pending::<()>().await,
    }
}
