//! Ethereum JSON-RPC walkthrough CLI
//!
//! Usage:
//!   eth_book balance                          # Balance of the sample account
//!   eth_book --network local new-wallet       # Fresh key pair and address
//!   eth_book check-address                    # Format and contract checks
//!   eth_book watch                            # Follow new blocks until Ctrl+C

use std::fs;
use std::process;
use std::sync::Arc;

use clap::Parser;
use ethers::providers::Middleware;
use ethers::types::{Bytes, H256};
use ethers::utils::parse_ether;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use eth_book::config::ConfigError;
use eth_book::crypto::keystore;
use eth_book::rpc::{self, BlockSummary};
use eth_book::{is_valid_address_format, Address, Command, Config, Error, Keypair, Result};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        process::exit(1);
    }

    info!(network = %config.network, "running");

    match run(config).await {
        Ok(()) | Err(Error::Interrupted) => {}
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}

async fn run(config: Config) -> Result<()> {
    match config.command.clone() {
        Command::Balance { address, block } => {
            let client = rpc::connect_http(config.rpc_url())?;
            let address: Address = address
                .as_deref()
                .unwrap_or_else(|| config.network.default_account())
                .parse()?;

            rpc::balance_at(&client, address, None).await?;
            if let Some(block) = block {
                rpc::balance_at(&client, address, Some(block)).await?;
            }
        }

        Command::NewWallet => {
            let keypair = Keypair::generate();
            info!(private_key = %keypair.private_key_hex());
            info!(public_key = %keypair.public_key_hex());
            info!(address = %keypair.library_address()?, "address from client library");
            info!(address = %keypair.address(), "address from keccak256");
        }

        Command::KeystoreCreate { dir, password } => {
            keystore::create_keystore(&dir, &password)?;
        }

        Command::KeystoreImport {
            file,
            dir,
            password,
            new_password,
        } => {
            let file = match file {
                Some(file) => file,
                None => {
                    let sample = std::env::temp_dir().join("eth_book_sample_keystore.json");
                    fs::write(&sample, keystore::EXAMPLE_KEYSTORE)?;
                    sample
                }
            };
            let new_password = new_password.as_deref().unwrap_or(&password);
            keystore::import_keystore(&file, &password, new_password, &dir)?;
        }

        Command::KeystoreExport { dir, password } => {
            let path = keystore::single_keystore(&dir)?;
            let private_key = keystore::export_private_key(&path, &password)?;
            let keypair = Keypair::from_hex(&private_key)?;
            info!(address = %keypair.address().to_checksum(), path = %path.display(), "unlocked");

            let client = rpc::connect_http(config.rpc_url())?;
            rpc::balance_at(&client, *keypair.address(), None).await?;
            info!(%private_key);
        }

        Command::CheckAddress { addresses } => {
            let client = rpc::connect_http(config.rpc_url())?;
            let addresses = if addresses.is_empty() {
                eth_book::config::DEFAULT_CHECKED_ADDRESSES
                    .iter()
                    .map(|a| a.to_string())
                    .collect()
            } else {
                addresses
            };

            for candidate in &addresses {
                let is_valid = is_valid_address_format(candidate);
                info!(address = %candidate, is_valid, "format");
                if is_valid {
                    rpc::is_contract(&client, candidate.parse()?).await?;
                }
            }
        }

        Command::Blocks { number } => {
            let client = rpc::connect_http(config.rpc_url())?;
            rpc::header_by_number(&client, None).await?;
            rpc::header_by_number(&client, Some(number)).await?;
            let block = rpc::block_by_number(&client, number).await?;
            BlockSummary::from(&block).log();
        }

        Command::Transactions {
            number,
            block_hash,
            tx_hash,
        } => {
            let client = rpc::connect_http(config.rpc_url())?;
            rpc::transactions_of_block(&client, number).await?;
            rpc::transaction_hashes_in_block(&client, parse_hash(&block_hash)?).await?;
            rpc::transaction_by_hash(&client, parse_hash(&tx_hash)?).await?;
        }

        Command::Transfer {
            private_key,
            to,
            ether,
        } => {
            let client = rpc::connect_http(config.rpc_url())?;
            let keypair = Keypair::from_hex(&private_key)?;
            let value = parse_ether(&ether)
                .map_err(|e| ConfigError::InvalidAmount(format!("{}: {}", ether, e)))?;
            rpc::transfer(&client, &keypair, to.parse()?, value).await?;
        }

        Command::Deploy {
            private_key,
            bytecode,
        } => {
            let client = rpc::connect_http(config.rpc_url())?;
            let keypair = Keypair::from_hex(&private_key)?;
            let bytecode: Bytes = fs::read_to_string(&bytecode)?
                .trim()
                .parse()
                .map_err(|e| Error::Contract(format!("{}: {}", bytecode.display(), e)))?;
            rpc::deploy_contract(&client, &keypair, bytecode).await?;
        }

        Command::ContractVersion { address } => {
            let client = rpc::connect_http(config.rpc_url())?;
            let store = rpc::load_store(Arc::new(client), address.parse()?);
            rpc::store_version(&store).await?;
        }

        Command::Watch => {
            let (err_tx, mut err_rx) = unbounded_channel();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupted");
                    let _ = err_tx.send(Error::Interrupted);
                }
            });

            let client = rpc::connect_ws(config.ws_url()).await?;
            let headers = client.subscribe_blocks().await.map_err(Error::rpc)?;
            rpc::follow_new_heads(&client, headers, &mut err_rx, |_| {}).await?;
        }
    }

    Ok(())
}

fn parse_hash(hash: &str) -> Result<H256> {
    hash.parse()
        .map_err(|e| Error::InvalidHash(format!("{}: {}", hash, e)))
}
