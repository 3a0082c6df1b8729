//! JSON-RPC operations against an Ethereum node.
//!
//! Every helper is generic over [`Middleware`](ethers::providers::Middleware)
//! so it runs the same against an HTTP provider, a websocket provider or a
//! mocked one.

pub mod accounts;
pub mod blocks;
pub mod contracts;
pub mod subscription;
pub mod transactions;

use ethers::providers::{Http, Provider, Ws};
use tracing::info;

use crate::error::{Error, Result};

pub use accounts::{balance_at, is_contract, wei_to_ether};
pub use blocks::{block_by_hash, block_by_number, header_by_number, BlockSummary};
pub use contracts::{contract_address, deploy_contract, load_store, store_version, Deployment, Store};
pub use subscription::follow_new_heads;
pub use transactions::{
    receipt, recover_sender, transaction_by_hash, transaction_hashes_in_block,
    transactions_of_block, transfer, BlockTransaction, TransactionSummary,
};

/// Creates an HTTP JSON-RPC client for `url`.
pub fn connect_http(url: &str) -> Result<Provider<Http>> {
    let provider = Provider::<Http>::try_from(url)
        .map_err(|e| Error::Rpc(format!("invalid endpoint {}: {}", url, e)))?;
    info!(url, "HTTP client ready");
    Ok(provider)
}

/// Opens a websocket JSON-RPC connection to `url`.
pub async fn connect_ws(url: &str) -> Result<Provider<Ws>> {
    let provider = Provider::<Ws>::connect(url)
        .await
        .map_err(|e| Error::Rpc(format!("cannot connect to {}: {}", url, e)))?;
    info!(url, "websocket connected");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_http_rejects_bad_url() {
        assert!(matches!(connect_http("not a url"), Err(Error::Rpc(_))));
        assert!(connect_http("http://localhost:8545").is_ok());
    }
}
