//! Chain access seams and their alloy-backed implementations.

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{Filter, Log, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::{SolCall, SolEvent};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::ChainError;
use crate::factory::{IERC20Metadata, TokenFactory};
use crate::receipt::{LogEntry, TxReceipt};
use crate::request::CreateTokenCall;

/// Read-only access used by the fee reader and the receipt watcher.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// `CREATION_FEE()` of the configured factory, in wei.
    async fn creation_fee(&self) -> Result<U256, ChainError>;

    /// The receipt of `hash`, or `None` while it is still pending.
    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, ChainError>;
}

/// A connected wallet able to send the factory call.
#[async_trait]
pub trait TransactionSender: Send + Sync {
    /// The account transactions are sent from.
    fn account(&self) -> Address;

    /// Send `createToken` with the attached fee. Returns as soon as the
    /// transaction is accepted, without waiting for it to be mined.
    async fn send_create_token(&self, call: &CreateTokenCall) -> Result<TxHash, ChainError>;
}

fn parse_rpc_url(url: &str) -> Result<url::Url, ChainError> {
    url.parse()
        .map_err(|e| ChainError::Config(format!("invalid RPC URL {url}: {e}")))
}

impl From<&Log> for LogEntry {
    fn from(log: &Log) -> Self {
        Self {
            address: log.address(),
            topics: log.topics().to_vec(),
            data: log.data().data.clone(),
            block_number: log.block_number,
        }
    }
}

// ---------------------------------------------------------------------------
// RpcReader
// ---------------------------------------------------------------------------

/// Public (non-signing) client bound to one factory on one chain.
#[derive(Clone)]
pub struct RpcReader {
    provider: DynProvider,
    factory: Address,
}

impl RpcReader {
    pub fn connect(rpc_url: &str, factory: Address) -> Result<Self, ChainError> {
        let provider = ProviderBuilder::new()
            .connect_http(parse_rpc_url(rpc_url)?)
            .erased();
        debug!(rpc = %rpc_url, factory = %factory, "read-only client ready");
        Ok(Self { provider, factory })
    }

    pub fn factory(&self) -> Address {
        self.factory
    }

    pub async fn block_number(&self) -> Result<u64, ChainError> {
        self.provider.get_block_number().await.map_err(ChainError::rpc)
    }

    /// `TokenCreated` logs emitted by the factory in `[from, to]`.
    pub async fn token_created_logs(&self, from: u64, to: u64) -> Result<Vec<LogEntry>, ChainError> {
        let filter = Filter::new()
            .address(self.factory)
            .event_signature(TokenFactory::TokenCreated::SIGNATURE_HASH)
            .from_block(from)
            .to_block(to);
        let logs = self.provider.get_logs(&filter).await.map_err(ChainError::rpc)?;
        Ok(logs.iter().map(LogEntry::from).collect())
    }

    /// `symbol()` of an ERC-20 token.
    pub async fn token_symbol(&self, token: Address) -> Result<String, ChainError> {
        let tx = TransactionRequest::default()
            .with_to(token)
            .with_input(IERC20Metadata::symbolCall {}.abi_encode());
        let raw = self.provider.call(tx).await.map_err(ChainError::rpc)?;
        IERC20Metadata::symbolCall::abi_decode_returns(&raw).map_err(ChainError::abi)
    }
}

#[async_trait]
impl ChainReader for RpcReader {
    async fn creation_fee(&self) -> Result<U256, ChainError> {
        let tx = TransactionRequest::default()
            .with_to(self.factory)
            .with_input(TokenFactory::CREATION_FEECall {}.abi_encode());
        let raw = self.provider.call(tx).await.map_err(ChainError::rpc)?;
        TokenFactory::CREATION_FEECall::abi_decode_returns(&raw).map_err(ChainError::abi)
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, ChainError> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(ChainError::rpc)?;

        Ok(receipt.map(|r| TxReceipt {
            hash: r.transaction_hash,
            success: r.status(),
            block_number: r.block_number,
            logs: r.inner.logs().iter().map(LogEntry::from).collect(),
        }))
    }
}

// ---------------------------------------------------------------------------
// RpcWallet
// ---------------------------------------------------------------------------

/// Sends factory calls either with a local private key or through an account
/// the RPC node manages.
#[derive(Clone)]
pub struct RpcWallet {
    provider: DynProvider,
    account: Address,
    factory: Address,
}

impl RpcWallet {
    /// Sign locally with a hex private key.
    pub fn from_private_key(rpc_url: &str, factory: Address, key: &str) -> Result<Self, ChainError> {
        let signer: PrivateKeySigner = key
            .trim()
            .parse()
            .map_err(|_| ChainError::Config("private key is not a valid 32-byte hex key".into()))?;
        let account = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(parse_rpc_url(rpc_url)?)
            .erased();
        info!(account = %account, "local key wallet ready");
        Ok(Self {
            provider,
            account,
            factory,
        })
    }

    /// Use the first account the node exposes through `eth_accounts`; the node
    /// signs via `eth_sendTransaction`.
    pub async fn from_node_account(rpc_url: &str, factory: Address) -> Result<Self, ChainError> {
        let provider = ProviderBuilder::new()
            .connect_http(parse_rpc_url(rpc_url)?)
            .erased();
        let accounts = provider.get_accounts().await.map_err(ChainError::wallet)?;
        let account = accounts
            .first()
            .copied()
            .ok_or_else(|| ChainError::Wallet("node exposes no unlocked accounts".into()))?;
        info!(account = %account, "node account wallet ready");
        Ok(Self {
            provider,
            account,
            factory,
        })
    }
}

#[async_trait]
impl TransactionSender for RpcWallet {
    fn account(&self) -> Address {
        self.account
    }

    async fn send_create_token(&self, call: &CreateTokenCall) -> Result<TxHash, ChainError> {
        let tx = TransactionRequest::default()
            .with_from(self.account)
            .with_to(self.factory)
            .with_input(call.calldata())
            .with_value(call.value);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(ChainError::wallet)?;
        let hash = *pending.tx_hash();
        info!(tx_hash = %hash, symbol = %call.symbol, value = %call.value, "createToken sent");
        Ok(hash)
    }
}
