use std::sync::Arc;

use alloy::primitives::U256;
use alloy::primitives::utils::format_ether;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::client::ChainReader;
use crate::error::ChainError;

/// Reads `CREATION_FEE()` once per reader and caches it.
///
/// The cache belongs to the reader instance: swapping the reader (a chain
/// switch) clears it, and the next [`FeeReader::load`] fetches again.
pub struct FeeReader {
    reader: RwLock<Option<Arc<dyn ChainReader>>>,
    cached: RwLock<Option<U256>>,
}

impl FeeReader {
    pub fn new(reader: Option<Arc<dyn ChainReader>>) -> Self {
        Self {
            reader: RwLock::new(reader),
            cached: RwLock::new(None),
        }
    }

    /// Replace the read-only client and drop the cached fee.
    pub fn set_reader(&self, reader: Option<Arc<dyn ChainReader>>) {
        *self.reader.write() = reader;
        *self.cached.write() = None;
    }

    pub fn cached(&self) -> Option<U256> {
        *self.cached.read()
    }

    /// Return the cached fee or fetch it. Fails when there is no client or
    /// the call errors; the cache is left empty in that case.
    pub async fn load(&self) -> Result<U256, ChainError> {
        if let Some(fee) = self.cached() {
            return Ok(fee);
        }
        self.refresh().await
    }

    /// Fetch unconditionally and replace the cached value on success.
    pub async fn refresh(&self) -> Result<U256, ChainError> {
        let reader = self
            .reader
            .read()
            .clone()
            .ok_or_else(|| ChainError::Rpc("read-only client unavailable".into()))?;

        match reader.creation_fee().await {
            Ok(fee) => {
                info!(fee_eth = %format_ether(fee), "creation fee loaded");
                *self.cached.write() = Some(fee);
                Ok(fee)
            }
            Err(e) => {
                warn!("Failed to fetch creation fee: {e}");
                Err(e)
            }
        }
    }
}
