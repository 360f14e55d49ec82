//! Re-runs a whole unit of work until it succeeds or the attempt budget runs out.
//!
//! Every attempt re-executes the full body, including any network calls a
//! previous attempt already made. Side effects are not rolled back between
//! attempts; callers are responsible for bodies that tolerate duplication.

use std::{fmt, future::Future, time::Duration};

use tracing::{debug, warn};

use crate::error::Error;

/// Decides how many times a unit of work runs and what happens between runs.
pub trait RetryPolicy {
    /// Total number of attempts, including the first one.
    fn max_attempts(&self) -> usize;

    /// Whether the failure of attempt number `attempt` (1-based) warrants another run.
    fn should_retry(&self, _attempt: usize, _error: &eyre::Report) -> bool {
        true
    }

    /// Pause before the run that follows attempt number `attempt`.
    fn delay(&self, _attempt: usize) -> Option<Duration> {
        None
    }
}

/// Retries every failure immediately, up to a fixed budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAttempts(usize);

impl FixedAttempts {
    /// A zero budget is treated as a single attempt.
    pub fn new(attempts: usize) -> Self {
        Self(attempts.max(1))
    }
}

impl Default for FixedAttempts {
    fn default() -> Self {
        Self(crate::DEFAULT_ATTEMPTS)
    }
}

impl RetryPolicy for FixedAttempts {
    fn max_attempts(&self) -> usize {
        self.0
    }
}

type Classifier = Box<dyn Fn(&eyre::Report) -> bool + Send + Sync>;

/// Doubles the pause after every failed attempt, optionally retrying only
/// the failures a classifier accepts.
pub struct ExponentialBackoff {
    base: Duration,
    max_attempts: usize,
    classifier: Option<Classifier>,
}

impl ExponentialBackoff {
    pub fn new(base: Duration, max_attempts: usize) -> Self {
        Self {
            base,
            max_attempts: max_attempts.max(1),
            classifier: None,
        }
    }

    /// Only failures for which `classifier` returns `true` are retried.
    pub fn when<F>(mut self, classifier: F) -> Self
    where
        F: Fn(&eyre::Report) -> bool + Send + Sync + 'static,
    {
        self.classifier = Some(Box::new(classifier));
        self
    }
}

impl fmt::Debug for ExponentialBackoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExponentialBackoff")
            .field("base", &self.base)
            .field("max_attempts", &self.max_attempts)
            .field("classified", &self.classifier.is_some())
            .finish()
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    fn should_retry(&self, _attempt: usize, error: &eyre::Report) -> bool {
        self.classifier.as_ref().map_or(true, |classify| classify(error))
    }

    fn delay(&self, attempt: usize) -> Option<Duration> {
        let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        Some(self.base.saturating_mul(2u32.saturating_pow(exponent)))
    }
}

/// Runs `work` with an immediate-retry budget of `attempts`.
pub async fn retry<T, F, Fut>(attempts: usize, work: F) -> eyre::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = eyre::Result<T>>,
{
    retry_with(&FixedAttempts::new(attempts), work).await
}

/// Runs `work` under `policy`.
///
/// The error of the last attempt is returned untouched. [`Error::Skipped`] and
/// configuration failures are returned at once.
pub async fn retry_with<P, T, F, Fut>(policy: &P, mut work: F) -> eyre::Result<T>
where
    P: RetryPolicy + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = eyre::Result<T>>,
{
    let budget = policy.max_attempts().max(1);
    let mut attempt = 1;
    loop {
        match work().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, budget, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if Error::is_skip(&err) || Error::is_config(&err) => return Err(err),
            Err(err) => {
                if attempt >= budget || !policy.should_retry(attempt, &err) {
                    return Err(err);
                }
                warn!(attempt, budget, error = %err, "attempt failed, retrying");
                if let Some(pause) = policy.delay(attempt) {
                    tokio::time::sleep(pause).await;
                }
                attempt += 1;
            }
        }
    }
}
