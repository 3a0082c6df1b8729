//! # eth_book
//!
//! Worked examples of driving an Ethereum node over JSON-RPC.
//!
//! ## Architecture
//!
//! - `crypto`: Key generation, address derivation and validation, keystores
//! - `rpc`: Balances, blocks, transactions, transfers, contracts and
//!   new-head subscriptions through the client library
//! - `config`: Command line configuration
//! - `error`: Shared error type

pub mod config;
pub mod crypto;
pub mod error;
pub mod rpc;

pub use config::{Command, Config, Network};
pub use crypto::{derive_address, is_valid_address_format, Address, Keypair};
pub use error::{Error, Result};
