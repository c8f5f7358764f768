//! Resolves a loaded [`ForgeConfig`] into typed chain settings and builds the
//! clients and connectors the app needs from them.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use forge_core::ForgeConfig;
use tracing::debug;

use crate::chain::{Chain, ChainConfig, get_chain_configs};
use crate::client::RpcReader;
use crate::connector::{LocalKeyConnector, NodeAccountConnector, WalletConnector};
use crate::decode::{AbiBinding, CreationEventBinding, NamedBinding};
use crate::error::ChainError;
use crate::factory::load_factory_abi;
use crate::receipt::ReceiptWatcher;
use crate::request::FeePolicy;
use crate::rpc_config::RpcConfigStore;
use crate::verify::{ExplorerClient, VerificationListener};

#[derive(Clone)]
pub struct ChainSettings {
    pub chain: Chain,
    pub chain_config: ChainConfig,
    pub rpc_url: String,
    pub factory: Address,
    pub fee_policy: FeePolicy,
    pub receipt_watcher: ReceiptWatcher,
    pub binding: Arc<dyn CreationEventBinding>,
    pub connector_preference: Vec<String>,
    pub private_key: Option<String>,
    pub explorer_api_key: Option<String>,
    pub verify_from_block: Option<u64>,
    pub verify_poll_interval: Duration,
    pub verify_block_window: u64,
}

impl ChainSettings {
    pub fn from_config(config: &ForgeConfig) -> Result<Self, ChainError> {
        let chain: Chain = config.chain.parse().map_err(ChainError::Config)?;
        let chain_config = get_chain_configs()
            .remove(&chain)
            .ok_or_else(|| ChainError::Config(format!("no configuration for {chain}")))?;

        let rpc_store = RpcConfigStore::from_overrides(&config.rpc_urls)?;
        let rpc_url = rpc_store
            .get_rpc(chain)
            .map(|rpc| rpc.url.clone())
            .ok_or_else(|| ChainError::Config(format!("no RPC URL for {chain}")))?;

        let factory = parse_factory_address(config.factory_address.as_deref())?;
        let fee_policy = FeePolicy::from_config(config.fee_policy, &config.fixed_fee_eth)?;

        let binding: Arc<dyn CreationEventBinding> = match &config.factory_abi_path {
            Some(path) => Arc::new(AbiBinding::new(load_factory_abi(path)?)),
            None => Arc::new(NamedBinding),
        };

        debug!(%chain, rpc = %rpc_url, %factory, policy = ?fee_policy, "chain settings resolved");
        Ok(Self {
            chain,
            chain_config,
            rpc_url,
            factory,
            fee_policy,
            receipt_watcher: ReceiptWatcher::new(
                Duration::from_millis(config.receipt_poll_interval_ms),
                Duration::from_secs(config.receipt_timeout_secs),
            ),
            binding,
            connector_preference: config.connector_preference.clone(),
            private_key: config.private_key.clone(),
            explorer_api_key: config.explorer_api_key.clone(),
            verify_from_block: config.verify_from_block,
            verify_poll_interval: Duration::from_secs(config.verify_poll_interval_secs),
            verify_block_window: config.verify_block_window,
        })
    }

    pub fn reader(&self) -> Result<RpcReader, ChainError> {
        RpcReader::connect(&self.rpc_url, self.factory)
    }

    /// Connectors available outside a mini-app host, in no particular order;
    /// the preference list decides.
    pub fn connectors(&self) -> Vec<Arc<dyn WalletConnector>> {
        vec![
            Arc::new(LocalKeyConnector::new(
                self.rpc_url.clone(),
                self.factory,
                self.private_key.clone(),
            )),
            Arc::new(NodeAccountConnector::new(self.rpc_url.clone(), self.factory)),
        ]
    }

    pub fn explorer(&self) -> Result<ExplorerClient, ChainError> {
        ExplorerClient::new(
            self.chain_config.explorer_api_url.clone(),
            self.explorer_api_key.clone(),
        )
    }

    pub fn verification_listener(&self) -> Result<VerificationListener, ChainError> {
        Ok(VerificationListener::new(
            Arc::new(self.reader()?),
            Arc::new(self.explorer()?),
            Arc::clone(&self.binding),
        )
        .from_block(self.verify_from_block)
        .poll_interval(self.verify_poll_interval)
        .block_window(self.verify_block_window))
    }
}

impl fmt::Debug for ChainSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainSettings")
            .field("chain", &self.chain)
            .field("rpc_url", &self.rpc_url)
            .field("factory", &self.factory)
            .field("fee_policy", &self.fee_policy)
            .field("receipt_watcher", &self.receipt_watcher)
            .field("connector_preference", &self.connector_preference)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("explorer_api_key", &self.explorer_api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

fn parse_factory_address(raw: Option<&str>) -> Result<Address, ChainError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            ChainError::Config("factory address not configured (set FORGE_FACTORY_ADDRESS)".into())
        })?;
    raw.parse()
        .map_err(|e| ChainError::Config(format!("invalid factory address {raw}: {e}")))
}
