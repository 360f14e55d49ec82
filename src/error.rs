//! Error types for the harness.

use std::time::Duration;

use thiserror::Error;

/// Result type alias using the harness error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the harness itself, as opposed to the collaborators it drives.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Operator or configuration mistake. Never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// A chain fixture entry breaks the valid/invalid/incorrect invariant.
    #[error("fixture error for chain {chain_id}: {reason}")]
    Fixture { chain_id: u64, reason: String },

    /// A bounded polling loop ran out of wall-clock time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// A precondition for the case is not met; the case is skipped, not failed.
    #[error("skipped: {0}")]
    Skipped(String),
}

impl Error {
    /// Whether `report` carries a [`Error::Skipped`] anywhere in its chain.
    pub fn is_skip(report: &eyre::Report) -> bool {
        Self::skip_reason(report).is_some()
    }

    /// Whether `report` carries a configuration or fixture mistake, which no
    /// amount of re-running will fix.
    pub fn is_config(report: &eyre::Report) -> bool {
        report.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<Error>(),
                Some(Error::Config(_) | Error::Fixture { .. })
            )
        })
    }

    pub fn skip_reason(report: &eyre::Report) -> Option<&str> {
        report
            .chain()
            .find_map(|cause| match cause.downcast_ref::<Error>() {
                Some(Error::Skipped(reason)) => Some(reason.as_str()),
                _ => None,
            })
    }
}
