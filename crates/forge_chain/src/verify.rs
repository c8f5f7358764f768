//! Explorer source verification for tokens the factory deploys.
//!
//! The listener follows `TokenCreated` logs in block windows and submits an
//! Etherscan-compatible `verifysourcecode` request for each new token. A
//! failure for one token is logged and the loop moves on.

use std::sync::Arc;
use std::time::Duration;

use alloy::hex;
use alloy::primitives::{Address, U256};
use alloy::sol_types::SolValue;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::RpcReader;
use crate::decode::{CreationEventBinding, TokenCreatedRecord};
use crate::error::ChainError;
use crate::receipt::LogEntry;

pub const TOKEN_CREATOR_CONTRACT: &str = "TokenCreator";
pub const COMPILER_VERSION: &str = "v0.8.28+commit.7893614a";
pub const EVM_VERSION: &str = "cancun";
pub const OPTIMIZER_RUNS: u32 = 200;

/// Source of the contract the factory deploys for every token.
pub const TOKEN_CREATOR_SOURCE: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.28;

import {ERC20} from "@openzeppelin/contracts/token/ERC20/ERC20.sol";
import {Ownable} from "@openzeppelin/contracts/access/Ownable.sol";

contract TokenCreator is ERC20, Ownable {
    string public imageURI;

    constructor(
        string memory name,
        string memory symbol,
        uint256 initialSupply,
        address tokenOwner,
        string memory _imageURI
    ) ERC20(name, symbol) Ownable(tokenOwner) {
        imageURI = _imageURI;
        _mint(tokenOwner, initialSupply * 10**decimals());
    }
}
"#;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// One `verifysourcecode` submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    pub contract_address: Address,
    pub contract_name: String,
    pub source_code: String,
    pub compiler_version: String,
    /// ABI-encoded constructor arguments, hex without `0x`.
    pub constructor_args: String,
    pub optimization_used: bool,
    pub runs: u32,
    pub evm_version: String,
}

impl VerificationRequest {
    /// Build the request for a freshly created token whose `symbol()` was
    /// read separately (the event does not carry it).
    pub fn for_token(record: &TokenCreatedRecord, symbol: &str) -> Self {
        Self {
            contract_address: record.token_address,
            contract_name: TOKEN_CREATOR_CONTRACT.into(),
            source_code: TOKEN_CREATOR_SOURCE.into(),
            compiler_version: COMPILER_VERSION.into(),
            constructor_args: encode_constructor_args(
                &record.name,
                symbol,
                record.initial_supply,
                record.creator,
                &record.image_uri,
            ),
            optimization_used: false,
            runs: OPTIMIZER_RUNS,
            evm_version: EVM_VERSION.into(),
        }
    }

    /// Form fields in the explorer's parameter naming (including its
    /// `constructorArguements` spelling).
    pub fn form_fields(&self, api_key: Option<&str>) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("module", "contract".to_string()),
            ("action", "verifysourcecode".to_string()),
            ("contractaddress", self.contract_address.to_string()),
            ("sourceCode", self.source_code.clone()),
            ("codeformat", "solidity-single-file".to_string()),
            ("contractname", self.contract_name.clone()),
            ("compilerversion", self.compiler_version.clone()),
            ("constructorArguements", self.constructor_args.clone()),
            ("optimizationUsed", u8::from(self.optimization_used).to_string()),
            ("runs", self.runs.to_string()),
            ("evmversion", self.evm_version.clone()),
        ];
        if let Some(key) = api_key {
            fields.push(("apikey", key.to_string()));
        }
        fields
    }
}

/// `(string name, string symbol, uint256 initialSupply, address owner, string imageURI)`
/// encoded as constructor parameters, hex without `0x`.
pub fn encode_constructor_args(
    name: &str,
    symbol: &str,
    initial_supply: U256,
    owner: Address,
    image_uri: &str,
) -> String {
    let encoded = (
        name.to_string(),
        symbol.to_string(),
        initial_supply,
        owner,
        image_uri.to_string(),
    )
        .abi_encode_params();
    hex::encode(encoded)
}

// ---------------------------------------------------------------------------
// Explorer client
// ---------------------------------------------------------------------------

/// Envelope every Etherscan-style endpoint returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerResponse {
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

impl ExplorerResponse {
    /// The verification GUID on success, the explorer's reason otherwise.
    pub fn into_result(self) -> Result<String, ChainError> {
        let detail = match &self.result {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if self.status == "1" {
            Ok(detail)
        } else {
            Err(ChainError::Explorer(format!("{}: {detail}", self.message)))
        }
    }
}

/// Where verification requests go.
#[async_trait]
pub trait VerificationSink: Send + Sync {
    async fn submit(&self, request: &VerificationRequest) -> Result<String, ChainError>;
}

/// HTTP client for an Etherscan-compatible explorer API.
pub struct ExplorerClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl ExplorerClient {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>) -> Result<Self, ChainError> {
        let client = Client::builder()
            .user_agent("Forge/1.0")
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ChainError::Explorer(format!("failed to build HTTP client: {e}")))?;
        if api_key.is_none() {
            warn!("no explorer API key configured; verification requests will likely be rejected");
        }
        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key,
        })
    }
}

#[async_trait]
impl VerificationSink for ExplorerClient {
    async fn submit(&self, request: &VerificationRequest) -> Result<String, ChainError> {
        let response = self
            .client
            .post(&self.api_url)
            .form(&request.form_fields(self.api_key.as_deref()))
            .send()
            .await
            .map_err(|e| ChainError::Explorer(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ChainError::Explorer(format!("HTTP {status}: {body}")));
        }

        response
            .json::<ExplorerResponse>()
            .await
            .map_err(|e| ChainError::Explorer(format!("unparseable response: {e}")))?
            .into_result()
    }
}

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

/// Chain reads the listener needs.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn head_block(&self) -> Result<u64, ChainError>;

    /// Factory `TokenCreated` logs in `[from, to]`.
    async fn token_created_logs(&self, from: u64, to: u64) -> Result<Vec<LogEntry>, ChainError>;

    async fn token_symbol(&self, token: Address) -> Result<String, ChainError>;
}

#[async_trait]
impl EventSource for RpcReader {
    async fn head_block(&self) -> Result<u64, ChainError> {
        self.block_number().await
    }

    async fn token_created_logs(&self, from: u64, to: u64) -> Result<Vec<LogEntry>, ChainError> {
        RpcReader::token_created_logs(self, from, to).await
    }

    async fn token_symbol(&self, token: Address) -> Result<String, ChainError> {
        RpcReader::token_symbol(self, token).await
    }
}

/// Outcome of one poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub submitted: usize,
    pub failed: usize,
    /// The scanned window reached the chain head.
    pub caught_up: bool,
}

pub struct VerificationListener {
    source: Arc<dyn EventSource>,
    sink: Arc<dyn VerificationSink>,
    binding: Arc<dyn CreationEventBinding>,
    poll_interval: Duration,
    block_window: u64,
    next_block: Option<u64>,
}

impl VerificationListener {
    pub fn new(
        source: Arc<dyn EventSource>,
        sink: Arc<dyn VerificationSink>,
        binding: Arc<dyn CreationEventBinding>,
    ) -> Self {
        Self {
            source,
            sink,
            binding,
            poll_interval: Duration::from_secs(12),
            block_window: 2_000,
            next_block: None,
        }
    }

    /// Start at `block` instead of the head at first poll.
    pub fn from_block(mut self, block: Option<u64>) -> Self {
        self.next_block = block;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn block_window(mut self, window: u64) -> Self {
        self.block_window = window.max(1);
        self
    }

    pub fn next_block(&self) -> Option<u64> {
        self.next_block
    }

    /// Scan the next block window and submit one request per event.
    pub async fn poll_once(&mut self) -> Result<PollSummary, ChainError> {
        let head = self.source.head_block().await?;
        let from = *self.next_block.get_or_insert(head);
        if from > head {
            return Ok(PollSummary {
                caught_up: true,
                ..PollSummary::default()
            });
        }
        let to = head.min(from.saturating_add(self.block_window - 1));

        let logs = self.source.token_created_logs(from, to).await?;
        debug!(from, to, events = logs.len(), "scanned block window");

        let mut summary = PollSummary {
            caught_up: to == head,
            ..PollSummary::default()
        };
        for log in &logs {
            match self.verify_log(log).await {
                Ok(()) => summary.submitted += 1,
                Err(e) => {
                    summary.failed += 1;
                    warn!(block = ?log.block_number, "verification skipped: {e}");
                }
            }
        }

        self.next_block = Some(to + 1);
        Ok(summary)
    }

    async fn verify_log(&self, log: &LogEntry) -> Result<(), ChainError> {
        let record = self
            .binding
            .decode(log)
            .and_then(|args| args.into_record())
            .map_err(|e| ChainError::Abi(e.to_string()))?;
        let symbol = self.source.token_symbol(record.token_address).await?;
        let request = VerificationRequest::for_token(&record, &symbol);
        let guid = self.sink.submit(&request).await?;
        info!(token = %record.token_address, symbol = %symbol, guid = %guid, "verification submitted");
        Ok(())
    }

    /// Poll until `cancel` fires. Poll errors are logged and retried on the
    /// next tick; while behind the head, windows are scanned back to back.
    pub async fn run(&mut self, cancel: CancellationToken) {
        info!(interval = ?self.poll_interval, window = self.block_window, "verification listener started");
        loop {
            let caught_up = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.poll_once() => match result {
                    Ok(summary) => summary.caught_up,
                    Err(e) => {
                        warn!("verification poll failed: {e}");
                        true
                    }
                },
            };

            if caught_up {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.poll_interval) => {}
                }
            }
        }
        info!(next_block = ?self.next_block, "verification listener stopped");
    }
}
