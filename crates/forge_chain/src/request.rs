use alloy::primitives::utils::parse_ether;
use alloy::primitives::{Bytes, U256};
use alloy::sol_types::SolCall;
use forge_core::FeePolicyKind;
use serde::{Deserialize, Serialize};

use crate::error::ChainError;
use crate::factory::TokenFactory;

/// Decimals of every token the factory deploys.
pub const TOKEN_DECIMALS: u8 = 18;

/// 10^decimals, the smallest-unit multiplier.
const UNITS_PER_TOKEN: U256 = U256::from_limbs([10u64.pow(TOKEN_DECIMALS as u32), 0, 0, 0]);

/// 0.006 ETH, the hardcoded fee of the fixed policy.
pub const DEFAULT_FIXED_FEE_WEI: U256 = U256::from_limbs([6_000_000_000_000_000, 0, 0, 0]);

/// A validated token creation request, built from the form at submit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCreationRequest {
    pub name: String,
    pub symbol: String,
    /// Whole tokens, as typed by the user.
    pub initial_supply: U256,
    /// Empty when no image was given.
    pub image_uri: String,
}

/// Where the creation fee comes from. Each variant fixes its own supply
/// scaling so the fee source and the supply convention cannot be mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeePolicy {
    /// Fee read from `CREATION_FEE()`; supply sent in whole tokens and
    /// scaled by the factory.
    OnChain,
    /// Hardcoded fee; supply scaled to 18 decimals before sending.
    Fixed { fee: U256 },
}

impl FeePolicy {
    pub fn fixed_default() -> Self {
        Self::Fixed {
            fee: DEFAULT_FIXED_FEE_WEI,
        }
    }

    /// Build from the config's policy kind and `fixed_fee_eth` string.
    pub fn from_config(kind: FeePolicyKind, fixed_fee_eth: &str) -> Result<Self, ChainError> {
        match kind {
            FeePolicyKind::OnChain => Ok(Self::OnChain),
            FeePolicyKind::Fixed => {
                let fee = parse_ether(fixed_fee_eth.trim()).map_err(|e| {
                    ChainError::Config(format!("invalid fixed_fee_eth {fixed_fee_eth:?}: {e}"))
                })?;
                Ok(Self::Fixed { fee })
            }
        }
    }

    /// Whether the fee has to be read from the contract first.
    pub fn needs_fee_read(&self) -> bool {
        matches!(self, Self::OnChain)
    }

    /// The fee to attach, given whatever the fee reader has cached.
    pub fn resolve_fee(&self, fetched: Option<U256>) -> Option<U256> {
        match self {
            Self::OnChain => fetched,
            Self::Fixed { fee } => Some(*fee),
        }
    }

    /// The supply argument the factory expects under this policy.
    pub fn scale_supply(&self, supply: U256) -> Result<U256, ChainError> {
        match self {
            Self::OnChain => Ok(supply),
            Self::Fixed { .. } => supply
                .checked_mul(UNITS_PER_TOKEN)
                .ok_or_else(|| ChainError::Abi("initial supply overflows uint256".into())),
        }
    }
}

/// Fully resolved `createToken` call: arguments plus attached value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTokenCall {
    pub name: String,
    pub symbol: String,
    pub initial_supply: U256,
    pub image_uri: String,
    pub value: U256,
}

impl CreateTokenCall {
    pub fn new(
        request: &TokenCreationRequest,
        policy: &FeePolicy,
        fee: U256,
    ) -> Result<Self, ChainError> {
        Ok(Self {
            name: request.name.clone(),
            symbol: request.symbol.clone(),
            initial_supply: policy.scale_supply(request.initial_supply)?,
            image_uri: request.image_uri.clone(),
            value: fee,
        })
    }

    /// ABI-encoded calldata for `createToken`.
    pub fn calldata(&self) -> Bytes {
        TokenFactory::createTokenCall {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            initialSupply: self.initial_supply,
            imageURI: self.image_uri.clone(),
        }
        .abi_encode()
        .into()
    }
}
