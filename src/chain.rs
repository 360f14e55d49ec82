//! Per-chain fixture data.
//!
//! Every value a test can feed to a collaborator comes as a triple: the valid
//! value, an invalid (malformed) variant and an incorrect (well-formed but
//! wrong) variant. Negative tests rely on all three being present.

use std::{collections::BTreeMap, fs, path::Path, str::FromStr};

use alloy::primitives::Address;
use reqwest::Url;
use serde::Deserialize;

use crate::error::{Error, Result};

const BUILTIN_CHAINS: &str = include_str!("../fixtures/chains.json");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Token {
    pub name: String,
    pub decimals: u8,
    pub address: Address,
    /// Not parseable as an address.
    pub invalid_address: String,
    /// A real address that is not this token.
    pub incorrect_address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: String,
    pub invalid_chain_id: String,
    pub incorrect_chain_id: u64,
    /// Counterpart chain for cross-chain cases.
    pub to_chain_id: u64,
    pub usdc: Token,
    pub usdt: Token,
    pub rpc_url: String,
    pub invalid_rpc_url: String,
    /// Reachable endpoint of some other chain.
    pub incorrect_rpc_url: String,
}

impl ChainConfig {
    pub fn rpc_url(&self) -> Result<Url> {
        Url::parse(&self.rpc_url)
            .map_err(|e| Error::Config(format!("rpc url for {}: {e}", self.name)))
    }

    /// Checks the valid/invalid/incorrect triple of every field.
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| Error::Fixture {
            chain_id: self.chain_id,
            reason,
        };

        if u64::from_str(&self.invalid_chain_id).is_ok() {
            return Err(fail(format!(
                "invalid chain id {:?} parses as a number",
                self.invalid_chain_id
            )));
        }
        if self.incorrect_chain_id == self.chain_id {
            return Err(fail("incorrect chain id equals the valid one".into()));
        }
        if self.to_chain_id == self.chain_id {
            return Err(fail("cross-chain counterpart is the chain itself".into()));
        }

        for token in [&self.usdc, &self.usdt] {
            if Address::from_str(&token.invalid_address).is_ok() {
                return Err(fail(format!(
                    "invalid {} address {:?} parses",
                    token.name, token.invalid_address
                )));
            }
            if token.incorrect_address == token.address {
                return Err(fail(format!(
                    "incorrect {} address equals the valid one",
                    token.name
                )));
            }
        }

        if Url::parse(&self.invalid_rpc_url).is_ok() {
            return Err(fail(format!(
                "invalid rpc url {:?} parses",
                self.invalid_rpc_url
            )));
        }
        let rpc_url = Url::parse(&self.rpc_url).map_err(|e| fail(format!("rpc url: {e}")))?;
        let incorrect_rpc_url = Url::parse(&self.incorrect_rpc_url)
            .map_err(|e| fail(format!("incorrect rpc url: {e}")))?;
        if incorrect_rpc_url == rpc_url {
            return Err(fail("incorrect rpc url equals the valid one".into()));
        }

        Ok(())
    }
}

/// Configured chains, ordered by chain id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRegistry {
    chains: BTreeMap<u64, ChainConfig>,
}

impl ChainRegistry {
    /// The chains shipped with the harness.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CHAINS)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: Vec<ChainConfig> = serde_json::from_str(raw)
            .map_err(|e| Error::Config(format!("malformed chain fixtures: {e}")))?;
        Self::new(entries)
    }

    /// Builds a registry, rejecting duplicates and broken fixtures.
    pub fn new(entries: impl IntoIterator<Item = ChainConfig>) -> Result<Self> {
        let mut chains = BTreeMap::new();
        for chain in entries {
            chain.validate()?;
            let id = chain.chain_id;
            if chains.insert(id, chain).is_some() {
                return Err(Error::Config(format!("chain {id} configured twice")));
            }
        }
        if chains.is_empty() {
            return Err(Error::Config("no chains configured".into()));
        }

        let registry = Self { chains };
        for chain in registry.chains.values() {
            if !registry.contains(chain.to_chain_id) {
                return Err(Error::Fixture {
                    chain_id: chain.chain_id,
                    reason: format!("counterpart chain {} is not configured", chain.to_chain_id),
                });
            }
            if registry.contains(chain.incorrect_chain_id) {
                return Err(Error::Fixture {
                    chain_id: chain.chain_id,
                    reason: format!(
                        "incorrect chain id {} is a configured chain",
                        chain.incorrect_chain_id
                    ),
                });
            }
        }
        Ok(registry)
    }

    pub fn get(&self, chain_id: u64) -> Option<&ChainConfig> {
        self.chains.get(&chain_id)
    }

    pub fn contains(&self, chain_id: u64) -> bool {
        self.chains.contains_key(&chain_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.chains.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub(crate) fn nth(&self, index: usize) -> Option<&ChainConfig> {
        self.chains.values().nth(index)
    }
}
