//! Querying transactions and sending ether.

use ethers::providers::Middleware;
use ethers::signers::Signer;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{
    BlockNumber, Bytes, Transaction, TransactionReceipt, TransactionRequest, H160, H256, U256, U64,
};
use tracing::{debug, info};

use super::blocks::block_by_number;
use crate::crypto::{Address, Keypair};
use crate::error::{Error, Result};

/// Gas limit of a plain ether transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// The fields of a transaction worth reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSummary {
    pub hash: H256,
    pub value: U256,
    pub gas: U256,
    pub gas_price: Option<U256>,
    pub nonce: U256,
    pub data: Bytes,
    /// `None` for contract creation.
    pub to: Option<Address>,
}

impl From<&Transaction> for TransactionSummary {
    fn from(tx: &Transaction) -> Self {
        Self {
            hash: tx.hash,
            value: tx.value,
            gas: tx.gas,
            gas_price: tx.gas_price,
            nonce: tx.nonce,
            data: tx.input.clone(),
            to: tx.to.map(Address::from),
        }
    }
}

impl TransactionSummary {
    pub fn log(&self) {
        info!(
            hash = ?self.hash,
            value = %self.value,
            gas = %self.gas,
            gas_price = ?self.gas_price,
            nonce = %self.nonce,
            data = %self.data,
            to = ?self.to,
            "transaction"
        );
    }
}

/// A transaction of a block together with its recovered sender and receipt.
#[derive(Debug, Clone)]
pub struct BlockTransaction {
    pub summary: TransactionSummary,
    pub sender: Address,
    pub receipt: TransactionReceipt,
}

/// Recovers the sender of a signed transaction from its signature.
pub fn recover_sender(tx: &Transaction) -> Result<Address> {
    tx.recover_from()
        .map(Address::from)
        .map_err(|e| Error::Signing(format!("cannot recover sender of {:?}: {}", tx.hash, e)))
}

/// Returns the receipt of the transaction with `hash`.
pub async fn receipt<M: Middleware>(client: &M, hash: H256) -> Result<TransactionReceipt> {
    let receipt = client
        .get_transaction_receipt(hash)
        .await
        .map_err(Error::rpc)?
        .ok_or_else(|| Error::NotFound(format!("receipt for {:?}", hash)))?;

    info!(status = ?receipt.status, logs = receipt.logs.len(), "receipt");
    Ok(receipt)
}

/// Walks every transaction of block `number`, recovering its sender and
/// fetching its receipt.
pub async fn transactions_of_block<M: Middleware>(
    client: &M,
    number: u64,
) -> Result<Vec<BlockTransaction>> {
    let block = block_by_number(client, number).await?;
    let mut result = Vec::with_capacity(block.transactions.len());

    for tx in &block.transactions {
        let summary = TransactionSummary::from(tx);
        summary.log();

        let sender = recover_sender(tx)?;
        info!(%sender, "sender");

        let receipt = receipt(client, tx.hash).await?;
        result.push(BlockTransaction {
            summary,
            sender,
            receipt,
        });
    }

    Ok(result)
}

/// Lists transaction hashes of a block by index, using the block's
/// transaction count.
pub async fn transaction_hashes_in_block<M: Middleware>(
    client: &M,
    block_hash: H256,
) -> Result<Vec<H256>> {
    let count: U64 = client
        .provider()
        .request("eth_getBlockTransactionCountByHash", [block_hash])
        .await
        .map_err(Error::rpc)?;

    let mut hashes = Vec::new();
    for index in 0..count.as_u64() {
        let tx: Option<Transaction> = client
            .provider()
            .request(
                "eth_getTransactionByBlockHashAndIndex",
                (block_hash, U64::from(index)),
            )
            .await
            .map_err(Error::rpc)?;

        let tx = tx.ok_or_else(|| {
            Error::NotFound(format!("transaction {} of block {:?}", index, block_hash))
        })?;
        info!(index, hash = ?tx.hash, "transaction in block");
        hashes.push(tx.hash);
    }

    Ok(hashes)
}

/// Returns the transaction with `hash` and whether it is still pending.
pub async fn transaction_by_hash<M: Middleware>(
    client: &M,
    hash: H256,
) -> Result<(Transaction, bool)> {
    let tx = client
        .get_transaction(hash)
        .await
        .map_err(Error::rpc)?
        .ok_or_else(|| Error::NotFound(format!("transaction {:?}", hash)))?;

    let is_pending = tx.block_number.is_none();
    info!(hash = ?tx.hash, is_pending, "transaction lookup");
    Ok((tx, is_pending))
}

/// Sends `value` wei from `keypair` to `to` as a legacy (EIP-155) transfer.
///
/// Returns the transaction hash once the node has accepted it.
pub async fn transfer<M: Middleware>(
    client: &M,
    keypair: &Keypair,
    to: Address,
    value: U256,
) -> Result<H256> {
    let from = H160::from(*keypair.address());
    let (nonce, gas_price) = nonce_and_gas_price(client, from).await?;

    let request = TransactionRequest::new()
        .from(from)
        .to(H160::from(to))
        .value(value)
        .gas(TRANSFER_GAS_LIMIT)
        .gas_price(gas_price)
        .nonce(nonce);

    let tx_hash = sign_and_send(client, keypair, request).await?;
    info!(tx_hash = ?tx_hash, "tx sent");
    Ok(tx_hash)
}

/// Returns the pending nonce of `from` and the node's suggested gas price.
pub(crate) async fn nonce_and_gas_price<M: Middleware>(client: &M, from: H160) -> Result<(U256, U256)> {
    let nonce = client
        .get_transaction_count(from, Some(BlockNumber::Pending.into()))
        .await
        .map_err(Error::rpc)?;
    let gas_price = client.get_gas_price().await.map_err(Error::rpc)?;
    debug!(%nonce, %gas_price, "prepared transaction");
    Ok((nonce, gas_price))
}

/// Signs `request` locally for the node's chain and submits the raw bytes.
pub(crate) async fn sign_and_send<M: Middleware>(
    client: &M,
    keypair: &Keypair,
    request: TransactionRequest,
) -> Result<H256> {
    let chain_id = client.get_chainid().await.map_err(Error::rpc)?.as_u64();
    let tx: TypedTransaction = request.chain_id(chain_id).into();
    let raw = sign(keypair, &tx, chain_id).await?;

    let pending = client.send_raw_transaction(raw).await.map_err(Error::rpc)?;
    Ok(pending.tx_hash())
}

async fn sign(keypair: &Keypair, tx: &TypedTransaction, chain_id: u64) -> Result<Bytes> {
    let wallet = keypair.to_wallet()?.with_chain_id(chain_id);
    let signature = wallet
        .sign_transaction(tx)
        .await
        .map_err(|e| Error::Signing(e.to_string()))?;
    Ok(tx.rlp_signed(&signature))
}
