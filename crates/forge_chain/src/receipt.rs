use std::time::Duration;

use alloy::primitives::{Address, B256, Bytes, TxHash};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::ChainReader;
use crate::error::ChainError;

/// One log entry of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: Option<u64>,
}

impl LogEntry {
    pub fn topic0(&self) -> Option<B256> {
        self.topics.first().copied()
    }
}

/// The parts of a transaction receipt the launch flow reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub hash: TxHash,
    pub success: bool,
    pub block_number: Option<u64>,
    pub logs: Vec<LogEntry>,
}

/// Polls for a receipt until the transaction is mined or the window closes.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptWatcher {
    poll_interval: Duration,
    timeout: Duration,
}

impl ReceiptWatcher {
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait for `hash` to be mined. Node errors end the wait immediately;
    /// there is no retry. A reverted receipt is an error.
    pub async fn wait(&self, reader: &dyn ChainReader, hash: TxHash) -> Result<TxReceipt, ChainError> {
        debug!(tx_hash = %hash, timeout = ?self.timeout, "waiting for receipt");

        let poll = async {
            loop {
                if let Some(receipt) = reader.transaction_receipt(hash).await? {
                    return Ok::<_, ChainError>(receipt);
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };

        let receipt = tokio::time::timeout(self.timeout, poll)
            .await
            .map_err(|_| ChainError::ReceiptTimeout {
                hash,
                timeout: self.timeout,
            })??;

        if !receipt.success {
            warn!(tx_hash = %hash, "transaction reverted");
            return Err(ChainError::Reverted(hash));
        }

        info!(
            tx_hash = %hash,
            block = ?receipt.block_number,
            logs = receipt.logs.len(),
            "transaction mined"
        );
        Ok(receipt)
    }
}

impl Default for ReceiptWatcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), Duration::from_secs(120))
    }
}
