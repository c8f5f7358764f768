//! Error types for chain access and event decoding.

use std::time::Duration;

use alloy::primitives::TxHash;

/// Errors raised while talking to the chain or a wallet.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// Missing or malformed configuration (addresses, URLs, keys).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The RPC node failed or returned an error response.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The wallet refused or failed to sign / send.
    #[error("{0}")]
    Wallet(String),

    /// No wallet is connected.
    #[error("No wallet connected")]
    NotConnected,

    /// The on-chain fee has not been read yet.
    #[error("Creation fee not loaded")]
    FeeNotLoaded,

    /// ABI encoding or decoding of call data failed.
    #[error("ABI error: {0}")]
    Abi(String),

    /// The transaction was mined but reverted.
    #[error("Transaction {0} reverted")]
    Reverted(TxHash),

    /// The receipt did not appear within the configured window.
    #[error("Timed out after {timeout:?} waiting for receipt of {hash}")]
    ReceiptTimeout { hash: TxHash, timeout: Duration },

    /// The block explorer rejected or failed a request.
    #[error("Explorer error: {0}")]
    Explorer(String),
}

impl ChainError {
    pub fn rpc(err: impl std::fmt::Display) -> Self {
        Self::Rpc(err.to_string())
    }

    pub fn wallet(err: impl std::fmt::Display) -> Self {
        Self::Wallet(err.to_string())
    }

    pub fn abi(err: impl std::fmt::Display) -> Self {
        Self::Abi(err.to_string())
    }
}

/// Why a `TokenCreated` record could not be recovered from a receipt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The factory ABI has no `TokenCreated` event.
    #[error("event descriptor {0} not found in factory ABI")]
    MissingEventDescriptor(String),

    /// No log from the factory carried the event's topic.
    #[error("no matching TokenCreated log in receipt")]
    NoMatchingLog,

    /// A matching log was found but its arguments did not decode.
    #[error("malformed TokenCreated arguments: {0}")]
    MalformedArgs(String),
}

impl From<ChainError> for forge_core::ForgeError {
    fn from(err: ChainError) -> Self {
        use forge_core::ForgeError;
        match err {
            ChainError::Config(msg) => ForgeError::Config(msg),
            ChainError::Rpc(msg) => ForgeError::Network(msg),
            ChainError::Wallet(msg) => ForgeError::Wallet(msg),
            ChainError::NotConnected => ForgeError::Wallet("no wallet connected".into()),
            ChainError::FeeNotLoaded => ForgeError::Network("creation fee not loaded".into()),
            ChainError::Abi(msg) => ForgeError::Contract(msg),
            e @ ChainError::Reverted(_) => ForgeError::Contract(e.to_string()),
            e @ ChainError::ReceiptTimeout { .. } => ForgeError::Network(e.to_string()),
            ChainError::Explorer(msg) => ForgeError::Explorer(msg),
        }
    }
}
