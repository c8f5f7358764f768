use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chain::{Chain, get_chain_configs};
use crate::error::ChainError;

/// The endpoint a chain's clients connect to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcConfig {
    pub chain: Chain,
    pub url: String,
    /// Set from configuration rather than the built-in table.
    pub is_custom: bool,
}

/// Per-chain RPC endpoints: built-in public nodes, overridden per chain from
/// the config file's `rpc_urls` or `FORGE_RPC_URL`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfigStore {
    configs: HashMap<Chain, RpcConfig>,
}

impl RpcConfigStore {
    pub fn with_defaults() -> Self {
        let configs = get_chain_configs()
            .into_iter()
            .map(|(chain, cc)| {
                let rpc = RpcConfig {
                    chain,
                    url: cc.rpc_url,
                    is_custom: false,
                };
                (chain, rpc)
            })
            .collect();
        Self { configs }
    }

    /// Defaults with `overrides` (chain slug → URL) applied. Unknown chain
    /// keys are rejected so a typo never falls back to a public node.
    pub fn from_overrides(overrides: &HashMap<String, String>) -> Result<Self, ChainError> {
        let mut store = Self::with_defaults();
        for (key, url) in overrides {
            let chain: Chain = key.parse().map_err(ChainError::Config)?;
            store.set_custom_rpc(chain, url)?;
        }
        Ok(store)
    }

    pub fn get_rpc(&self, chain: Chain) -> Option<&RpcConfig> {
        self.configs.get(&chain)
    }

    pub fn set_custom_rpc(&mut self, chain: Chain, url: &str) -> Result<(), ChainError> {
        if !validate_url(url) {
            return Err(ChainError::Config(format!("invalid RPC URL for {chain}: {url}")));
        }
        debug!(%chain, url, "custom RPC endpoint");
        self.configs.insert(
            chain,
            RpcConfig {
                chain,
                url: url.to_string(),
                is_custom: true,
            },
        );
        Ok(())
    }
}

impl Default for RpcConfigStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Well-formed http(s) URL with a host.
pub fn validate_url(url: &str) -> bool {
    url::Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some())
        .unwrap_or(false)
}
