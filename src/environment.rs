//! Resolves which chain a run targets.
//!
//! The choice is made once, either from an explicit `--chainId` override or
//! uniformly at random among the configured chains, and never changes for the
//! rest of the process.

use std::{ffi::OsString, path::PathBuf, sync::OnceLock};

use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::info;

use crate::{
    chain::{ChainConfig, ChainRegistry, Token},
    error::{Error, Result},
};

const HARNESS_FLAGS: [&str; 4] = ["--chainId", "--chain-id", "--seed", "--fixtures"];

static ENVIRONMENT: OnceLock<Result<Environment>> = OnceLock::new();

/// Harness options, accepted on the command line or through the environment.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessArgs {
    /// Target chain. Chosen at random among configured chains when absent.
    #[arg(long = "chainId", alias = "chain-id", env = "AA_CHAIN_ID")]
    pub chain_id: Option<u64>,

    /// Seed for the random chain choice, to replay a previous run.
    #[arg(long, env = "AA_SEED")]
    pub seed: Option<u64>,

    /// JSON chain registry replacing the built-in fixtures.
    #[arg(long, env = "AA_FIXTURES")]
    pub fixtures: Option<PathBuf>,
}

impl HarnessArgs {
    /// Parses the harness flags out of an argv that may carry foreign flags,
    /// such as the ones a test runner passes to its binaries.
    ///
    /// libtest itself rejects unknown options, so inside `cargo test` binaries
    /// the chain is pinned through `AA_CHAIN_ID` and `AA_SEED` instead.
    pub fn from_mixed_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut kept = vec![OsString::from("aa-harness")];
        let mut args = args.into_iter().map(Into::into).peekable();
        while let Some(arg) = args.next() {
            let Some(text) = arg.to_str() else { continue };
            let Some(flag) = HARNESS_FLAGS
                .into_iter()
                .find(|flag| text == *flag || text.starts_with(&format!("{flag}=")))
            else {
                continue;
            };
            let inline_value = text.len() > flag.len();
            kept.push(arg);
            if inline_value {
                continue;
            }
            // a missing value is left for clap to report
            if let Some(value) = args.next_if(|next| !next.to_string_lossy().starts_with("--")) {
                kept.push(value);
            }
        }

        Self::try_parse_from(kept).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_process() -> Result<Self> {
        Self::from_mixed_args(std::env::args_os().skip(1))
    }

    pub fn registry(&self) -> Result<ChainRegistry> {
        match &self.fixtures {
            Some(path) => ChainRegistry::from_file(path),
            None => ChainRegistry::builtin(),
        }
    }

    pub fn selection(&self) -> Selection {
        Selection {
            chain_id: self.chain_id,
            seed: self.seed,
        }
    }
}

/// Inputs to a chain choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub chain_id: Option<u64>,
    pub seed: Option<u64>,
}

impl Selection {
    pub fn chain(chain_id: u64) -> Self {
        Self {
            chain_id: Some(chain_id),
            seed: None,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            chain_id: None,
            seed: Some(seed),
        }
    }
}

/// How the chain was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Override,
    Random { seed: u64 },
}

/// The resolved target of a run, shared read-only by every test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    chain: ChainConfig,
    counterpart: ChainConfig,
    origin: Origin,
}

impl Environment {
    /// Picks a chain from `registry`.
    ///
    /// An override naming an unconfigured chain is a configuration error;
    /// it never falls back to a random choice.
    pub fn resolve(registry: &ChainRegistry, selection: Selection) -> Result<Self> {
        let (chain, origin) = match selection.chain_id {
            Some(id) => {
                let chain = registry.get(id).ok_or_else(|| {
                    let supported = registry
                        .ids()
                        .map(|id| id.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    Error::Config(format!(
                        "unsupported chain id {id}; supported chain ids: {supported}"
                    ))
                })?;
                (chain, Origin::Override)
            }
            None => {
                let seed = selection.seed.unwrap_or_else(rand::random);
                let mut rng = StdRng::seed_from_u64(seed);
                let index = rng.random_range(0..registry.len());
                let chain = registry
                    .nth(index)
                    .ok_or_else(|| Error::Config("no chains configured".into()))?;
                (chain, Origin::Random { seed })
            }
        };

        let counterpart = registry.get(chain.to_chain_id).ok_or_else(|| {
            Error::Config(format!(
                "counterpart chain {} of {} is not configured",
                chain.to_chain_id, chain.name
            ))
        })?;

        match origin {
            Origin::Override => info!(chain_id = chain.chain_id, name = %chain.name, "selected chain"),
            Origin::Random { seed } => {
                info!(chain_id = chain.chain_id, name = %chain.name, seed, "selected random chain")
            }
        }

        Ok(Self {
            chain: chain.clone(),
            counterpart: counterpart.clone(),
            origin,
        })
    }

    /// Resolves from the process arguments and environment variables.
    pub fn from_process() -> Result<Self> {
        let args = HarnessArgs::from_process()?;
        Self::resolve(&args.registry()?, args.selection())
    }

    /// The process-wide environment, resolved on first use. A failed
    /// resolution is remembered too, so every later caller sees the same error.
    pub fn global() -> Result<&'static Self> {
        resolve_once(&ENVIRONMENT, Self::from_process)
    }

    pub fn chain_id(&self) -> u64 {
        self.chain.chain_id
    }

    pub fn chain_name(&self) -> &str {
        &self.chain.name
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    /// Destination chain for cross-chain cases.
    pub fn counterpart(&self) -> &ChainConfig {
        &self.counterpart
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn usdc(&self) -> &Token {
        &self.chain.usdc
    }

    pub fn usdt(&self) -> &Token {
        &self.chain.usdt
    }

    pub fn invalid_chain_id(&self) -> &str {
        &self.chain.invalid_chain_id
    }

    pub fn incorrect_chain_id(&self) -> u64 {
        self.chain.incorrect_chain_id
    }
}

fn resolve_once<'a>(
    cell: &'a OnceLock<Result<Environment>>,
    resolve: impl FnOnce() -> Result<Environment>,
) -> Result<&'a Environment> {
    cell.get_or_init(resolve).as_ref().map_err(|e| e.clone())
}
