//! Keys and endpoints read from the process environment.

use std::{env, str::FromStr};

use alloy::signers::local::PrivateKeySigner;

use crate::error::{Error, Result};

pub const PRIVATE_KEY: &str = "PRIVATE_KEY";
pub const PAYMASTER_API_KEY: &str = "PAYMASTER_API_KEY";
pub const PAYMASTER_URL: &str = "PAYMASTER_URL";
pub const BUNDLER_URL: &str = "BUNDLER_URL";

/// A variable the current case cannot run without.
pub fn require_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!("environment variable {name} is not set"))),
    }
}

#[derive(Clone, Default)]
pub struct Secrets {
    pub private_key: Option<String>,
    pub paymaster_api_key: Option<String>,
    pub paymaster_url: Option<String>,
    pub bundler_url: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        let var = |name| require_var(name).ok();
        Self {
            private_key: var(PRIVATE_KEY),
            paymaster_api_key: var(PAYMASTER_API_KEY),
            paymaster_url: var(PAYMASTER_URL),
            bundler_url: var(BUNDLER_URL),
        }
    }

    pub fn signer(&self) -> Result<PrivateKeySigner> {
        let key = required(PRIVATE_KEY, &self.private_key)?;
        PrivateKeySigner::from_str(key)
            .map_err(|e| Error::Config(format!("{PRIVATE_KEY} is not a valid key: {e}")))
    }

    pub fn paymaster_api_key(&self) -> Result<&str> {
        required(PAYMASTER_API_KEY, &self.paymaster_api_key)
    }

    pub fn paymaster_url(&self) -> Result<&str> {
        required(PAYMASTER_URL, &self.paymaster_url)
    }

    pub fn bundler_url(&self) -> Result<&str> {
        required(BUNDLER_URL, &self.bundler_url)
    }
}

// keys never end up in logs
impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field(
                "paymaster_api_key",
                &self.paymaster_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("paymaster_url", &self.paymaster_url)
            .field("bundler_url", &self.bundler_url)
            .finish()
    }
}

fn required<'a>(name: &str, value: &'a Option<String>) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| Error::Config(format!("environment variable {name} is not set")))
}
