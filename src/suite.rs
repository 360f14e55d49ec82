//! Runs named cases through a retry policy and tallies their outcomes.

use std::{
    fmt,
    future::Future,
    time::{Duration, Instant},
};

use futures_util::{future::BoxFuture, stream, FutureExt, StreamExt};
use tracing::{error, info, warn};

use crate::{
    error::Error,
    retry::{retry_with, FixedAttempts, RetryPolicy},
};

type Case<'a> = Box<dyn Fn() -> BoxFuture<'a, eyre::Result<()>> + Send + Sync + 'a>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    /// Still failing once the retry budget ran out.
    Failed(String),
    /// A precondition was not met.
    Skipped(String),
}

#[derive(Debug, Clone)]
pub struct CaseResult {
    pub name: String,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub suite: String,
    pub results: Vec<CaseResult>,
}

impl Report {
    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Passed))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    /// Skipped cases do not fail a run.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.results
            .iter()
            .find(|r| r.name == name)
            .map(|r| &r.outcome)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} passed, {} failed, {} skipped",
            self.suite,
            self.passed(),
            self.failed(),
            self.skipped()
        )
    }
}

/// A group of independent cases sharing one retry policy.
///
/// Cases run with at most `concurrency` in flight; attempts of one case are
/// always sequential.
pub struct Suite<'a> {
    name: String,
    policy: Box<dyn RetryPolicy + Send + Sync>,
    concurrency: usize,
    cases: Vec<(String, Case<'a>)>,
}

impl<'a> Suite<'a> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            policy: Box::new(FixedAttempts::default()),
            concurrency: 1,
            cases: Vec::new(),
        }
    }

    pub fn policy(mut self, policy: impl RetryPolicy + Send + Sync + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn case<F, Fut>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'a,
        Fut: Future<Output = eyre::Result<()>> + Send + 'a,
    {
        let case: Case<'a> = Box::new(move || body().boxed());
        self.cases.push((name.into(), case));
        self
    }

    pub async fn run(self) -> Report {
        let policy: &(dyn RetryPolicy + Send + Sync) = self.policy.as_ref();
        let results = stream::iter(self.cases.iter())
            .map(|(name, case)| async move {
                let started = Instant::now();
                let outcome = match retry_with(policy, || case()).await {
                    Ok(()) => {
                        info!(case = %name, "passed");
                        Outcome::Passed
                    }
                    Err(err) => match Error::skip_reason(&err) {
                        Some(reason) => {
                            warn!(case = %name, reason, "skipped");
                            Outcome::Skipped(reason.to_owned())
                        }
                        None => {
                            error!(case = %name, error = %format!("{err:#}"), "failed");
                            Outcome::Failed(format!("{err:#}"))
                        }
                    },
                };
                CaseResult {
                    name: name.clone(),
                    outcome,
                    elapsed: started.elapsed(),
                }
            })
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        let report = Report {
            suite: self.name.clone(),
            results,
        };
        info!(%report, "suite finished");
        report
    }
}
