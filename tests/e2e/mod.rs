//! End-to-end tests for the harness.
//!
//! Cases that talk to live services are ignored by default and read their
//! endpoints and keys from the environment (`BUNDLER_URL`, `PAYMASTER_URL`,
//! `PAYMASTER_API_KEY`, `PRIVATE_KEY`). Run them with
//! `cargo test --test e2e -- --ignored`. The test runner does not accept
//! harness flags, so pin the chain with `AA_CHAIN_ID=<id>` or replay a random
//! choice with `AA_SEED=<seed>`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod paymaster;
mod selection;

use aa_harness::Environment;

/// The run's target chain, resolved once for every test in this binary.
fn environment() -> &'static Environment {
    aa_harness::init_tracing();
    Environment::global().expect("invalid harness configuration")
}
