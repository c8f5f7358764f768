use alloy::primitives::TxHash;
use forge_chain::{DecodeError, TokenCreatedRecord};
use forge_core::ForgeError;

use crate::form::ValidationError;

pub const UNABLE_TO_RETRIEVE_ADDRESS: &str = "Unable to retrieve token address.";

/// Why the last launch attempt stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    Validation(ValidationError),
    /// The `CREATION_FEE()` read failed or no read-only client exists.
    FeeUnavailable,
    NotConnected,
    /// The wallet rejected or failed the send; the message is shown verbatim.
    Wallet(String),
    /// The receipt wait failed: timeout, revert or node error.
    Receipt(String),
    Decode(DecodeError),
}

impl Failure {
    pub fn message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::FeeUnavailable => "Failed to fetch creation fee".into(),
            Self::NotConnected => "Connect a wallet to create a token".into(),
            Self::Wallet(msg) => format!("Error: {msg}"),
            Self::Receipt(_) | Self::Decode(_) => UNABLE_TO_RETRIEVE_ADDRESS.into(),
        }
    }

    pub fn is_wallet_error(&self) -> bool {
        matches!(self, Self::Wallet(_))
    }
}

/// The typed error the binary reports when a launch ends in failure. The
/// user message matches the status text wherever the status is specific.
impl From<Failure> for ForgeError {
    fn from(failure: Failure) -> Self {
        let message = failure.message();
        match failure {
            Failure::Validation(_) | Failure::NotConnected => ForgeError::Validation(message),
            Failure::FeeUnavailable => ForgeError::Network(message),
            Failure::Wallet(msg) => ForgeError::Wallet(msg),
            Failure::Receipt(_) | Failure::Decode(_) => ForgeError::Contract(message),
        }
    }
}

/// Launch lifecycle. Moves forward only, except `reset` back to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    ValidatingInput,
    FetchingFee,
    Submitting,
    AwaitingReceipt(TxHash),
    Succeeded(TokenCreatedRecord),
    Failed(Failure),
}

impl Status {
    /// Status line text; empty while idle.
    pub fn text(&self) -> String {
        match self {
            Self::Idle => String::new(),
            Self::ValidatingInput => "Validating input...".into(),
            Self::FetchingFee => "Fetching creation fee...".into(),
            Self::Submitting => "Creating token...".into(),
            Self::AwaitingReceipt(_) => "Token created! Fetching address...".into(),
            Self::Succeeded(_) => "Token created!".into(),
            Self::Failed(failure) => failure.message(),
        }
    }

    pub fn token_address(&self) -> Option<alloy::primitives::Address> {
        match self {
            Self::Succeeded(record) => Some(record.token_address),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }

    /// Submitting or waiting for the receipt.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Submitting | Self::AwaitingReceipt(_))
    }
}
