//! Keys, addresses and keystores.
//!
//! This module provides:
//! - secp256k1 key generation and Keccak-256 address derivation
//! - Lexical address validation
//! - Encrypted (scrypt) keystore files

mod address;
mod keypair;
pub mod keystore;

pub use address::{is_valid_address_format, Address};
pub use keypair::{derive_address, Keypair};
