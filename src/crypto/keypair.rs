//! Ethereum keypair generation and address derivation.

use ethers::signers::{LocalWallet, Signer};
use secp256k1::{PublicKey, Secp256k1, SecretKey};

use super::address::{keccak256, Address};
use crate::error::{Error, Result};

/// An Ethereum keypair (secp256k1 secret + public point + derived address).
#[derive(Debug, Clone)]
pub struct Keypair {
    secret_key: SecretKey,
    public_key: PublicKey,
    /// The derived Ethereum address
    address: Address,
}

impl Keypair {
    /// Generates a new random keypair.
    ///
    /// Uses a cryptographically secure random number generator.
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut rand::thread_rng());
        Self::from_parts(secret_key, public_key)
    }

    /// Builds a keypair from raw secret key bytes.
    ///
    /// Fails if the bytes are zero or not below the curve order.
    pub fn from_secret_key(secret_bytes: [u8; 32]) -> Result<Self> {
        let secret_key = SecretKey::from_slice(&secret_bytes)
            .map_err(|e| Error::InvalidPrivateKey(e.to_string()))?;
        let public_key = PublicKey::from_secret_key(&Secp256k1::new(), &secret_key);
        Ok(Self::from_parts(secret_key, public_key))
    }

    /// Builds a keypair from a hex private key, with or without `0x`.
    pub fn from_hex(private_key: &str) -> Result<Self> {
        let body = private_key.strip_prefix("0x").unwrap_or(private_key);
        let mut secret_bytes = [0u8; 32];
        hex::decode_to_slice(body, &mut secret_bytes)
            .map_err(|e| Error::InvalidPrivateKey(e.to_string()))?;
        Self::from_secret_key(secret_bytes)
    }

    fn from_parts(secret_key: SecretKey, public_key: PublicKey) -> Self {
        Self {
            secret_key,
            public_key,
            address: derive_address(&public_key),
        }
    }

    /// Returns the private key as a hex string (without 0x prefix).
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Returns the private key bytes.
    pub fn private_key_bytes(&self) -> [u8; 32] {
        self.secret_key.secret_bytes()
    }

    /// Returns the public key as hex: the 64 coordinate bytes X||Y, without
    /// the 0x04 format byte and without 0x prefix.
    pub fn public_key_hex(&self) -> String {
        hex::encode(&self.public_key.serialize_uncompressed()[1..])
    }

    /// Returns the secp256k1 public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Returns a reference to the derived address.
    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Converts this keypair into the client library's local signer.
    pub fn to_wallet(&self) -> Result<LocalWallet> {
        self.private_key_hex()
            .parse::<LocalWallet>()
            .map_err(|e| Error::InvalidPrivateKey(e.to_string()))
    }

    /// Returns the address as computed by the client library's signer.
    ///
    /// Always equal to [`Keypair::address`]; kept so the two derivations can
    /// be compared side by side.
    pub fn library_address(&self) -> Result<Address> {
        Ok(self.to_wallet()?.address().into())
    }
}

/// Derives an Ethereum address from a secp256k1 public key.
///
/// Process:
/// 1. Serialize the public key in uncompressed form (65 bytes)
/// 2. Remove the first byte (0x04 prefix)
/// 3. Hash the remaining 64 bytes with Keccak-256
/// 4. Take the last 20 bytes of the hash
#[inline]
pub fn derive_address(public_key: &PublicKey) -> Address {
    let public_key_bytes = public_key.serialize_uncompressed();
    let hash = keccak256(&public_key_bytes[1..]);

    let mut address_bytes = [0u8; 20];
    address_bytes.copy_from_slice(&hash[12..]);

    Address::from_bytes(address_bytes)
}
