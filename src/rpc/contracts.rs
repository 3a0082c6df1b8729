//! Deploying and querying the `Store` contract.

use std::sync::Arc;

use ethers::contract::abigen;
use ethers::providers::Middleware;
use ethers::types::{Bytes, TransactionRequest, H160, H256, U256};
use ethers::utils::get_contract_address;
use tracing::info;

use super::transactions::{nonce_and_gas_price, sign_and_send};
use crate::crypto::{Address, Keypair};
use crate::error::{Error, Result};

/// Gas limit used for contract creation.
pub const DEPLOY_GAS_LIMIT: u64 = 300_000;

abigen!(
    Store,
    r#"[
        function version() external view returns (string)
        function items(bytes32) external view returns (bytes32)
        function setItem(bytes32 key, bytes32 value) external
    ]"#
);

/// Outcome of a contract creation transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    /// Address the contract lands at once the transaction is mined.
    pub address: Address,
    pub tx_hash: H256,
}

/// Address of a contract created by `sender` with transaction nonce `nonce`.
pub fn contract_address(sender: Address, nonce: U256) -> Address {
    get_contract_address(H160::from(sender), nonce).into()
}

/// Sends a contract creation transaction carrying `bytecode` (init code
/// including any encoded constructor arguments).
pub async fn deploy_contract<M: Middleware>(
    client: &M,
    keypair: &Keypair,
    bytecode: Bytes,
) -> Result<Deployment> {
    if bytecode.is_empty() {
        return Err(Error::Contract("empty bytecode".into()));
    }

    let from = H160::from(*keypair.address());
    let (nonce, gas_price) = nonce_and_gas_price(client, from).await?;

    let request = TransactionRequest::new()
        .from(from)
        .data(bytecode)
        .value(0u64)
        .gas(DEPLOY_GAS_LIMIT)
        .gas_price(gas_price)
        .nonce(nonce);

    let tx_hash = sign_and_send(client, keypair, request).await?;
    let deployment = Deployment {
        address: contract_address(*keypair.address(), nonce),
        tx_hash,
    };

    info!(address = %deployment.address.to_checksum(), tx_hash = ?tx_hash, "contract deployed");
    Ok(deployment)
}

/// Binds the `Store` contract deployed at `address`.
pub fn load_store<M: Middleware>(client: Arc<M>, address: Address) -> Store<M> {
    Store::new(H160::from(address), client)
}

/// Reads `version()` from a bound `Store`.
pub async fn store_version<M: Middleware + 'static>(store: &Store<M>) -> Result<String> {
    let version = store
        .version()
        .call()
        .await
        .map_err(|e| Error::Contract(e.to_string()))?;

    info!(%version, "store version");
    Ok(version)
}
