use std::{marker::PhantomData, time::Duration};

use alloy::{network::Ethereum, primitives::B256, providers::Provider, transports::Transport};
use serde_json::Value;
use tracing::debug;

use crate::{client::ClientError, poll::poll_until};

pub const GAS_PRICE_METHOD: &str = "skandha_getGasPrice";
pub const USER_OPERATION_RECEIPT_METHOD: &str = "eth_getUserOperationReceipt";

/// Bundler JSON-RPC endpoint, reached through an alloy provider.
pub struct BundlerClient<P, T> {
    provider: P,
    _phantom: PhantomData<T>,
}

impl<P, T> BundlerClient<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            _phantom: PhantomData,
        }
    }

    pub async fn gas_price(&self) -> Result<Value, ClientError> {
        debug!(method = GAS_PRICE_METHOD, "bundler request");
        Ok(self
            .provider
            .raw_request(GAS_PRICE_METHOD.into(), ())
            .await?)
    }

    /// `None` until the bundler has seen the operation included.
    pub async fn user_operation_receipt(&self, hash: B256) -> Result<Option<Value>, ClientError> {
        debug!(method = USER_OPERATION_RECEIPT_METHOD, %hash, "bundler request");
        Ok(self
            .provider
            .raw_request(USER_OPERATION_RECEIPT_METHOD.into(), (hash,))
            .await?)
    }

    /// Polls for the receipt of `hash` until it appears or `timeout` elapses.
    pub async fn wait_for_receipt(
        &self,
        hash: B256,
        timeout: Duration,
        interval: Duration,
    ) -> eyre::Result<Value> {
        poll_until(timeout, interval, || async {
            Ok(self.user_operation_receipt(hash).await?)
        })
        .await
    }
}
