//! Error types shared by the library and the CLI.

use crate::config::ConfigError;

/// Errors returned by every fallible operation in this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Keystore error: {0}")]
    Keystore(String),

    #[error("Account already exists: {0}")]
    AccountExists(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Subscription closed by the node")]
    SubscriptionClosed,

    #[error("Interrupted")]
    Interrupted,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wraps any client-library failure as an RPC error.
    pub fn rpc(err: impl std::fmt::Display) -> Self {
        Error::Rpc(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
