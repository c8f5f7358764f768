use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Networks the factory is deployed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Base,
    Ethereum,
}

impl Chain {
    pub const ALL: [Chain; 2] = [Chain::Base, Chain::Ethereum];

    /// Human-readable label for the chain.
    pub fn label(&self) -> &'static str {
        match self {
            Chain::Base => "Base Mainnet",
            Chain::Ethereum => "Ethereum Mainnet",
        }
    }

    /// EIP-155 chain ID.
    pub fn chain_id(&self) -> u64 {
        match self {
            Chain::Base => 8453,
            Chain::Ethereum => 1,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base" | "8453" => Ok(Chain::Base),
            "ethereum" | "mainnet" | "eth" | "1" => Ok(Chain::Ethereum),
            other => Err(format!("unsupported chain: {other}")),
        }
    }
}

/// Network-specific endpoints for a chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub explorer_url: String,
    /// Etherscan-compatible API used for source verification.
    pub explorer_api_url: String,
}

/// Returns default chain configurations for all supported networks.
pub fn get_chain_configs() -> HashMap<Chain, ChainConfig> {
    let mut configs = HashMap::new();

    configs.insert(
        Chain::Base,
        ChainConfig {
            name: Chain::Base.label().to_string(),
            chain_id: Chain::Base.chain_id(),
            rpc_url: "https://mainnet.base.org".to_string(),
            explorer_url: "https://basescan.org".to_string(),
            explorer_api_url: "https://api.basescan.org/api".to_string(),
        },
    );

    configs.insert(
        Chain::Ethereum,
        ChainConfig {
            name: Chain::Ethereum.label().to_string(),
            chain_id: Chain::Ethereum.chain_id(),
            rpc_url: "https://eth.llamarpc.com".to_string(),
            explorer_url: "https://etherscan.io".to_string(),
            explorer_api_url: "https://api.etherscan.io/api".to_string(),
        },
    );

    configs
}
