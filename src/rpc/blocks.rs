//! Block headers and full blocks.

use ethers::providers::Middleware;
use ethers::types::{Block, BlockNumber, Transaction, H256, U256};
use tracing::info;

use crate::error::{Error, Result};

/// The fields of a block worth reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    pub number: Option<u64>,
    pub timestamp: u64,
    pub difficulty: U256,
    pub hash: Option<H256>,
    pub transaction_count: usize,
}

impl BlockSummary {
    pub fn log(&self) {
        info!(
            number = ?self.number,
            time = self.timestamp,
            difficulty = %self.difficulty,
            hash = ?self.hash,
            transactions = self.transaction_count,
            "block"
        );
    }
}

impl<TX> From<&Block<TX>> for BlockSummary {
    fn from(block: &Block<TX>) -> Self {
        Self {
            number: block.number.map(|n| n.as_u64()),
            timestamp: block.timestamp.low_u64(),
            difficulty: block.difficulty,
            hash: block.hash,
            transaction_count: block.transactions.len(),
        }
    }
}

fn block_tag(number: Option<u64>) -> BlockNumber {
    number.map_or(BlockNumber::Latest, |n| BlockNumber::Number(n.into()))
}

/// Returns the block at `number` (latest when `None`) with transaction
/// hashes only.
pub async fn header_by_number<M: Middleware>(client: &M, number: Option<u64>) -> Result<Block<H256>> {
    let tag = block_tag(number);
    let header = client
        .get_block(tag)
        .await
        .map_err(Error::rpc)?
        .ok_or_else(|| Error::NotFound(format!("block {:?}", tag)))?;

    info!(number = ?header.number, "header");
    Ok(header)
}

/// Returns the block at `number` with full transactions.
pub async fn block_by_number<M: Middleware>(client: &M, number: u64) -> Result<Block<Transaction>> {
    client
        .get_block_with_txs(block_tag(Some(number)))
        .await
        .map_err(Error::rpc)?
        .ok_or_else(|| Error::NotFound(format!("block {}", number)))
}

/// Returns the block with the given hash.
pub async fn block_by_hash<M: Middleware>(client: &M, hash: H256) -> Result<Block<H256>> {
    client
        .get_block(hash)
        .await
        .map_err(Error::rpc)?
        .ok_or_else(|| Error::NotFound(format!("block {:?}", hash)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::providers::Provider;

    fn sample_block() -> Block<H256> {
        Block {
            number: Some(5_671_744u64.into()),
            hash: Some(H256::repeat_byte(0x9e)),
            timestamp: U256::from(1_527_211_625u64),
            difficulty: U256::from(3_217_000_136_609_065u64),
            transactions: vec![H256::repeat_byte(1), H256::repeat_byte(2)],
            ..Default::default()
        }
    }

    #[test]
    fn test_summary() {
        let summary = BlockSummary::from(&sample_block());
        assert_eq!(summary.number, Some(5_671_744));
        assert_eq!(summary.timestamp, 1_527_211_625);
        assert_eq!(summary.transaction_count, 2);
        assert_eq!(summary.hash, Some(H256::repeat_byte(0x9e)));
    }

    #[tokio::test]
    async fn test_header_by_number() {
        let (provider, mock) = Provider::mocked();
        mock.push::<Block<H256>, _>(sample_block()).unwrap();

        let header = header_by_number(&provider, Some(5_671_744)).await.unwrap();
        assert_eq!(BlockSummary::from(&header), BlockSummary::from(&sample_block()));
    }

    #[tokio::test]
    async fn test_missing_block() {
        let (provider, mock) = Provider::mocked();
        mock.push::<Option<Block<H256>>, _>(None).unwrap();

        assert!(matches!(
            block_by_hash(&provider, H256::zero()).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_block_with_transactions() {
        let (provider, mock) = Provider::mocked();
        let block = Block::<Transaction> {
            number: Some(7u64.into()),
            transactions: vec![Transaction::default()],
            ..Default::default()
        };
        mock.push::<Block<Transaction>, _>(block).unwrap();

        let block = block_by_number(&provider, 7).await.unwrap();
        assert_eq!(block.transactions.len(), 1);
    }
}
