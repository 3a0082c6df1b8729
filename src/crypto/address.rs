//! Ethereum address representation, parsing and format checks.

use std::fmt;
use std::str::FromStr;

use tiny_keccak::{Hasher, Keccak};

use crate::error::Error;

/// Length of the hex body of an address (without the `0x` prefix).
const ADDRESS_HEX_LEN: usize = 40;

/// An Ethereum address (20 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address([u8; 20]);

impl Address {
    /// Creates an address from raw bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the address as raw bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns the address as a lowercase hex string (without 0x prefix).
    #[inline]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the canonical form: lowercase with 0x prefix.
    pub fn to_hex_prefixed(&self) -> String {
        format!("0x{}", self.to_hex())
    }

    /// Returns the address with checksum encoding (EIP-55).
    pub fn to_checksum(&self) -> String {
        let hex_addr = self.to_hex();
        let hash = keccak256(hex_addr.as_bytes());

        let mut checksum = String::with_capacity(2 + ADDRESS_HEX_LEN);
        checksum.push_str("0x");

        for (i, c) in hex_addr.chars().enumerate() {
            let hash_byte = hash[i / 2];
            let hash_nibble = if i % 2 == 0 {
                hash_byte >> 4
            } else {
                hash_byte & 0x0f
            };

            if c.is_ascii_alphabetic() && hash_nibble >= 8 {
                checksum.push(c.to_ascii_uppercase());
            } else {
                checksum.push(c);
            }
        }

        checksum
    }
}

/// Returns true iff `address` is `0x` followed by exactly 40 hex digits.
///
/// Purely lexical: mixed-case checksums are not verified and nothing is
/// known about whether the account exists.
pub fn is_valid_address_format(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(body) => body.len() == ADDRESS_HEX_LEN && body.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// Keccak-256 (the legacy Keccak padding, not FIPS-202 SHA3).
pub(crate) fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);
    hash
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_valid_address_format(s) {
            return Err(Error::InvalidAddress(format!(
                "expected 0x followed by {} hex characters, got {:?}",
                ADDRESS_HEX_LEN, s
            )));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(&s[2..], &mut bytes)
            .map_err(|e| Error::InvalidAddress(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl From<ethers::types::Address> for Address {
    fn from(address: ethers::types::Address) -> Self {
        Self(address.0)
    }
}

impl From<Address> for ethers::types::Address {
    fn from(address: Address) -> Self {
        ethers::types::H160(address.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_prefixed())
    }
}
