//! Checks that turn an unmeetable precondition into a skipped case instead
//! of a failure.

use alloy::{
    network::Ethereum,
    primitives::{Address, U256},
    providers::Provider,
    transports::Transport,
};

use crate::{bindings::IERC20, error::Error};

/// Returns the `token` balance of `owner`, or [`Error::Skipped`] when it is
/// below `minimum`.
pub async fn require_token_balance<P, T>(
    provider: P,
    token: Address,
    owner: Address,
    minimum: U256,
) -> eyre::Result<U256>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    let erc20 = IERC20::new(token, provider);
    let balance = erc20.balanceOf(owner).call().await?._0;
    if balance < minimum {
        return Err(Error::Skipped(format!(
            "insufficient balance of token {token} for {owner}: {balance} < {minimum}"
        ))
        .into());
    }
    Ok(balance)
}

/// Native-currency variant of [`require_token_balance`].
pub async fn require_native_balance<P, T>(
    provider: P,
    owner: Address,
    minimum: U256,
) -> eyre::Result<U256>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    let balance = provider.get_balance(owner).await?;
    if balance < minimum {
        return Err(Error::Skipped(format!(
            "insufficient native balance for {owner}: {balance} < {minimum}"
        ))
        .into());
    }
    Ok(balance)
}
