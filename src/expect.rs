//! Assertions for cases that are supposed to fail in a specific way.
//!
//! A mismatch is returned as an ordinary error, so a case wrapped in
//! [`crate::retry`] gets re-run: a transient 503 can look like a wrong answer
//! on a single attempt.

use eyre::{bail, ensure};

use crate::client::ErrorResponse;

/// Checks that `error` has status `expected_status` and a message containing
/// `expected_message`. `label` prefixes the failure.
pub fn validate_error<E>(
    error: &E,
    expected_message: &str,
    label: &str,
    expected_status: u16,
) -> eyre::Result<()>
where
    E: ErrorResponse + ?Sized,
{
    let status = error.status();
    let message = error.message();
    ensure!(
        status == Some(expected_status),
        "{label}: expected status {expected_status}, got {} ({message})",
        status.map_or_else(|| "none".to_owned(), |status| status.to_string())
    );
    ensure!(
        message.contains(expected_message),
        "{label}: expected message containing {expected_message:?}, got {message:?}"
    );
    Ok(())
}

/// Like [`validate_error`], but for the whole result of the call: a success
/// is itself a failure of the case.
pub fn expect_failure<T, E>(
    result: Result<T, E>,
    expected_message: &str,
    label: &str,
    expected_status: u16,
) -> eyre::Result<()>
where
    E: ErrorResponse,
{
    match result {
        Ok(_) => bail!("{label}: call succeeded, expected status {expected_status}"),
        Err(error) => validate_error(&error, expected_message, label, expected_status),
    }
}
