//! Bounded retry for compensating writes.
//!
//! When a multi-step booking operation fails half way, the steps that did
//! apply are undone by a compensating write (cancel the new reservation,
//! restore the car's availability). Those writes go to the same flaky
//! dependencies, so they are retried with exponential backoff. Only
//! transient failures are retried; anything else aborts immediately.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

mod attempt_error;
mod runtime;

use attempt_error::AttemptError;
pub use runtime::TokioSleeper;

/// Classifies an error as worth retrying.
pub trait TransientFailure {
    /// `true` when the same call may succeed if repeated.
    fn is_transient(&self) -> bool;
}

/// Retry limits for compensating writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompensationPolicy {
    /// Attempts including the first call.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Cap applied to every delay.
    pub max_backoff: Duration,
}

impl Default for CompensationPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl CompensationPolicy {
    /// Delay to wait after failed `attempt` (1-based).
    ///
    /// ```
    /// use std::time::Duration;
    /// use carshare_backend::domain::CompensationPolicy;
    ///
    /// let policy = CompensationPolicy::default();
    /// assert_eq!(policy.delay_for(1), Duration::from_millis(100));
    /// assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    /// assert_eq!(policy.delay_for(10), Duration::from_secs(2));
    /// ```
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = 2_u32.saturating_pow(attempt.saturating_sub(1));
        let base_ms = u64::try_from(self.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max_backoff.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(u64::from(exponent)).min(max_ms))
    }
}

/// Async sleeping abstraction for retry delays.
#[async_trait]
pub trait CompensationSleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Result of running a compensating write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompensationOutcome<E> {
    /// The write succeeded.
    Applied { attempts: u32 },
    /// Every attempt failed transiently.
    Exhausted { attempts: u32, last_error: E },
    /// A non-transient failure stopped the retries.
    Aborted { attempts: u32, error: E },
}

impl<E> CompensationOutcome<E> {
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Applied { attempts }
            | Self::Exhausted { attempts, .. }
            | Self::Aborted { attempts, .. } => *attempts,
        }
    }
}

/// Runs compensating writes under a [`CompensationPolicy`].
#[derive(Clone)]
pub struct CompensationRunner {
    policy: CompensationPolicy,
    sleeper: Arc<dyn CompensationSleeper>,
}

impl fmt::Debug for CompensationRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompensationRunner")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Default for CompensationRunner {
    fn default() -> Self {
        Self::new(CompensationPolicy::default(), Arc::new(TokioSleeper))
    }
}

impl CompensationRunner {
    pub fn new(policy: CompensationPolicy, sleeper: Arc<dyn CompensationSleeper>) -> Self {
        Self { policy, sleeper }
    }

    pub const fn policy(&self) -> &CompensationPolicy {
        &self.policy
    }

    /// Call `op` until it succeeds, fails fatally, or attempts run out.
    pub async fn run<E, F, Fut>(&self, label: &'static str, mut op: F) -> CompensationOutcome<E>
    where
        E: TransientFailure + fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let failure = match op().await {
                Ok(()) => return CompensationOutcome::Applied { attempts: attempt },
                Err(err) => AttemptError::classify(err),
            };

            match failure {
                AttemptError::Retryable(err) if attempt < max_attempts => {
                    let delay = self.policy.delay_for(attempt);
                    debug!(
                        step = label,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "retrying compensating write"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                AttemptError::Retryable(err) => {
                    error!(
                        step = label,
                        attempts = attempt,
                        error = %err,
                        reconciliation_required = true,
                        "compensating write exhausted its retries"
                    );
                    return CompensationOutcome::Exhausted {
                        attempts: attempt,
                        last_error: err,
                    };
                }
                AttemptError::Fatal(err) => {
                    error!(
                        step = label,
                        attempts = attempt,
                        error = %err,
                        reconciliation_required = true,
                        "compensating write failed permanently"
                    );
                    return CompensationOutcome::Aborted {
                        attempts: attempt,
                        error: err,
                    };
                }
            }
        }
    }
}
