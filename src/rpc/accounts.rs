//! Account balances and contract detection.

use ethers::providers::Middleware;
use ethers::types::{BlockId, BlockNumber, U256};
use ethers::utils::format_ether;
use tracing::info;

use crate::crypto::Address;
use crate::error::{Error, Result};

/// Renders a wei amount as ether (wei / 10^18) in decimal notation.
pub fn wei_to_ether(wei: U256) -> String {
    format_ether(wei)
}

/// Returns the balance of `address` in wei, at `block` or at the latest block.
pub async fn balance_at<M: Middleware>(
    client: &M,
    address: Address,
    block: Option<u64>,
) -> Result<U256> {
    let block = block.map(|n| BlockId::Number(BlockNumber::Number(n.into())));
    let balance = client
        .get_balance(ethers::types::Address::from(address), block)
        .await
        .map_err(Error::rpc)?;

    info!(
        %address,
        block = ?block,
        ether = %wei_to_ether(balance),
        "balance"
    );
    Ok(balance)
}

/// Returns true if bytecode is deployed at `address` (latest block).
pub async fn is_contract<M: Middleware>(client: &M, address: Address) -> Result<bool> {
    let code = client
        .get_code(ethers::types::Address::from(address), None)
        .await
        .map_err(Error::rpc)?;

    let is_contract = !code.is_empty();
    info!(%address, code_len = code.len(), is_contract, "code lookup");
    Ok(is_contract)
}
