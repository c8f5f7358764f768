use alloy::primitives::{TxHash, U256};
use tracing::debug;

use crate::client::TransactionSender;
use crate::error::ChainError;
use crate::request::{CreateTokenCall, FeePolicy, TokenCreationRequest};

/// Turns a validated request into one `createToken` transaction under a
/// single fee policy.
#[derive(Debug, Clone, Copy)]
pub struct TransactionSubmitter {
    policy: FeePolicy,
}

impl TransactionSubmitter {
    pub fn new(policy: FeePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FeePolicy {
        self.policy
    }

    /// Resolve fee and supply scaling. Fails with [`ChainError::FeeNotLoaded`]
    /// when the policy needs an on-chain fee that has not been read.
    pub fn prepare(
        &self,
        request: &TokenCreationRequest,
        fetched_fee: Option<U256>,
    ) -> Result<CreateTokenCall, ChainError> {
        let fee = self
            .policy
            .resolve_fee(fetched_fee)
            .ok_or(ChainError::FeeNotLoaded)?;
        CreateTokenCall::new(request, &self.policy, fee)
    }

    /// Prepare and send. Returns the transaction hash without waiting.
    pub async fn submit(
        &self,
        sender: &dyn TransactionSender,
        request: &TokenCreationRequest,
        fetched_fee: Option<U256>,
    ) -> Result<TxHash, ChainError> {
        let call = self.prepare(request, fetched_fee)?;
        debug!(
            from = %sender.account(),
            name = %call.name,
            supply = %call.initial_supply,
            value = %call.value,
            "submitting createToken"
        );
        sender.send_create_token(&call).await
    }
}
