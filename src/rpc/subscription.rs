//! Following new block headers.

use ethers::providers::Middleware;
use ethers::types::{Block, H256};
use futures::{pin_mut, Stream, StreamExt};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use super::blocks::{block_by_hash, BlockSummary};
use crate::error::{Error, Result};

/// Consumes new-head notifications until `errors` yields.
///
/// For every header the full block is fetched by hash and its summary is
/// handed to `on_block` before the next notification is read. Returns the
/// first error received on `errors`, the first failed block lookup, or
/// [`Error::SubscriptionClosed`] when the header stream ends.
pub async fn follow_new_heads<M, S, F>(
    client: &M,
    headers: S,
    errors: &mut UnboundedReceiver<Error>,
    mut on_block: F,
) -> Result<()>
where
    M: Middleware,
    S: Stream<Item = Block<H256>>,
    F: FnMut(BlockSummary),
{
    pin_mut!(headers);

    loop {
        tokio::select! {
            Some(err) = errors.recv() => return Err(err),
            header = headers.next() => {
                let header = header.ok_or(Error::SubscriptionClosed)?;
                let hash = header
                    .hash
                    .ok_or_else(|| Error::NotFound("hash of new header".into()))?;
                info!(hash = ?hash, "new block");

                let block = block_by_hash(client, hash).await?;
                let summary = BlockSummary::from(&block);
                summary.log();
                on_block(summary);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::providers::Provider;
    use tokio::sync::mpsc::unbounded_channel;

    fn header(number: u64) -> Block<H256> {
        Block {
            number: Some(number.into()),
            hash: Some(H256::from_low_u64_be(number)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_stops_on_error() {
        let (provider, _mock) = Provider::mocked();
        let (tx, mut rx) = unbounded_channel();
        tx.send(Error::Interrupted).unwrap();

        let result = follow_new_heads(
            &provider,
            futures::stream::pending::<Block<H256>>(),
            &mut rx,
            |_| panic!("no block expected"),
        )
        .await;
        assert!(matches!(result, Err(Error::Interrupted)));
    }

    #[tokio::test]
    async fn test_fetches_block_for_each_header() {
        let (provider, mock) = Provider::mocked();
        // Responses are served last-in first-out.
        mock.push::<Block<H256>, _>(header(11)).unwrap();
        mock.push::<Block<H256>, _>(header(10)).unwrap();

        let (_tx, mut rx) = unbounded_channel();
        let headers = futures::stream::iter(vec![header(10), header(11)]);

        let mut seen = Vec::new();
        let result = follow_new_heads(&provider, headers, &mut rx, |summary| {
            seen.push(summary.number)
        })
        .await;

        assert!(matches!(result, Err(Error::SubscriptionClosed)));
        assert_eq!(seen, vec![Some(10), Some(11)]);
    }

    #[tokio::test]
    async fn test_header_without_hash() {
        let (provider, _mock) = Provider::mocked();
        let (_tx, mut rx) = unbounded_channel();
        let headers = futures::stream::iter(vec![Block::<H256>::default()]);

        let result = follow_new_heads(&provider, headers, &mut rx, |_| {}).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
