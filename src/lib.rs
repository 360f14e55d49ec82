//! Harness for black-box end-to-end tests of an account-abstraction stack.
//!
//! Cases run inside [`retry`] so transient failures of remote services do
//! not fail the run, target the chain picked by [`Environment`], and assert
//! expected failures with [`validate_error`].

pub mod bindings;
pub mod bundler;
pub mod chain;
pub mod client;
pub mod environment;
pub mod error;
pub mod expect;
pub mod poll;
pub mod precondition;
pub mod retry;
pub mod secrets;
pub mod suite;

pub use bundler::BundlerClient;
pub use chain::{ChainConfig, ChainRegistry, Token};
pub use client::{ClientError, ErrorResponse, PaymasterClient};
pub use environment::{Environment, HarnessArgs, Origin, Selection};
pub use error::{Error, Result};
pub use expect::{expect_failure, validate_error};
pub use retry::{retry, retry_with, ExponentialBackoff, FixedAttempts, RetryPolicy};
pub use secrets::Secrets;
pub use suite::{Outcome, Report, Suite};

use tracing_subscriber::EnvFilter;

/// Attempt budget used when a case does not pick its own.
pub const DEFAULT_ATTEMPTS: usize = 3;

/// Installs a `RUST_LOG`-driven subscriber writing to stderr. Safe to call
/// more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
