//! Recovering the deployed token from a factory receipt.
//!
//! Matching is a pure function over the receipt's logs: the first log emitted
//! by the factory whose topic-0 is the `TokenCreated` selector wins. Decoding
//! goes through a [`CreationEventBinding`], which is either the compiled-in
//! `sol!` binding (named fields) or a JSON ABI loaded at runtime (positional
//! arguments). Both produce the same [`TokenCreatedRecord`].

use alloy::dyn_abi::{DynSolValue, EventExt};
use alloy::json_abi::{Event, JsonAbi};
use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::SolEvent;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DecodeError;
use crate::factory::{TOKEN_CREATED_EVENT, TokenFactory};
use crate::receipt::LogEntry;

/// Decoded `TokenCreated` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCreatedRecord {
    pub token_address: Address,
    pub creator: Address,
    pub name: String,
    pub initial_supply: U256,
    pub image_uri: String,
}

/// Event arguments in whichever shape the binding reports them.
#[derive(Debug, Clone, PartialEq)]
pub enum EventArgs {
    /// Declaration-ordered values from a runtime ABI.
    Positional(Vec<DynSolValue>),
    /// Field-named struct from the compiled-in binding.
    Named(TokenFactory::TokenCreated),
}

impl EventArgs {
    /// The created token: first positional argument or the `tokenAddress` field.
    pub fn token_address(&self) -> Option<Address> {
        match self {
            Self::Positional(values) => values.first().and_then(DynSolValue::as_address),
            Self::Named(event) => Some(event.tokenAddress),
        }
    }

    pub fn into_record(self) -> Result<TokenCreatedRecord, DecodeError> {
        let token_address = self
            .token_address()
            .ok_or_else(|| DecodeError::MalformedArgs("tokenAddress is not an address".into()))?;

        match self {
            Self::Named(event) => Ok(TokenCreatedRecord {
                token_address,
                creator: event.creator,
                name: event.name,
                initial_supply: event.initialSupply,
                image_uri: event.imageURI,
            }),
            Self::Positional(values) => {
                let malformed = |field: &str| DecodeError::MalformedArgs(format!("bad {field}"));
                let [_, creator, name, supply, image] = values.as_slice() else {
                    return Err(DecodeError::MalformedArgs(format!(
                        "expected 5 arguments, got {}",
                        values.len()
                    )));
                };
                Ok(TokenCreatedRecord {
                    token_address,
                    creator: creator.as_address().ok_or_else(|| malformed("creator"))?,
                    name: name.as_str().ok_or_else(|| malformed("name"))?.to_string(),
                    initial_supply: supply
                        .as_uint()
                        .map(|(value, _)| value)
                        .ok_or_else(|| malformed("initialSupply"))?,
                    image_uri: image.as_str().ok_or_else(|| malformed("imageURI"))?.to_string(),
                })
            }
        }
    }
}

/// How the `TokenCreated` descriptor is obtained and a matching log decoded.
pub trait CreationEventBinding: Send + Sync {
    /// Topic-0 of `TokenCreated`.
    fn selector(&self) -> Result<B256, DecodeError>;

    /// Decode a log already known to carry the selector.
    fn decode(&self, log: &LogEntry) -> Result<EventArgs, DecodeError>;
}

/// Compiled-in binding; arguments come back by field name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamedBinding;

impl CreationEventBinding for NamedBinding {
    fn selector(&self) -> Result<B256, DecodeError> {
        Ok(TokenFactory::TokenCreated::SIGNATURE_HASH)
    }

    fn decode(&self, log: &LogEntry) -> Result<EventArgs, DecodeError> {
        TokenFactory::TokenCreated::decode_raw_log(log.topics.iter().copied(), &log.data)
            .map(EventArgs::Named)
            .map_err(|e| DecodeError::MalformedArgs(e.to_string()))
    }
}

/// Runtime JSON ABI binding; arguments come back positionally.
#[derive(Debug, Clone)]
pub struct AbiBinding {
    abi: JsonAbi,
}

impl AbiBinding {
    pub fn new(abi: JsonAbi) -> Self {
        Self { abi }
    }

    /// Look the event up by name among the ABI's event items.
    fn event(&self) -> Result<&Event, DecodeError> {
        self.abi
            .events()
            .find(|event| event.name == TOKEN_CREATED_EVENT)
            .ok_or_else(|| DecodeError::MissingEventDescriptor(TOKEN_CREATED_EVENT.into()))
    }
}

impl CreationEventBinding for AbiBinding {
    fn selector(&self) -> Result<B256, DecodeError> {
        Ok(self.event()?.selector())
    }

    fn decode(&self, log: &LogEntry) -> Result<EventArgs, DecodeError> {
        let event = self.event()?;
        let decoded = event
            .decode_log_parts(log.topics.iter().copied(), &log.data)
            .map_err(|e| DecodeError::MalformedArgs(e.to_string()))?;

        // Re-interleave indexed and body values in declaration order.
        let mut indexed = decoded.indexed.into_iter();
        let mut body = decoded.body.into_iter();
        let mut values = Vec::with_capacity(event.inputs.len());
        for input in &event.inputs {
            let next = if input.indexed { indexed.next() } else { body.next() };
            let value = next.ok_or_else(|| {
                DecodeError::MalformedArgs(format!("missing value for {}", input.name))
            })?;
            values.push(value);
        }
        Ok(EventArgs::Positional(values))
    }
}

/// First log (in log order) emitted by `factory` whose topic-0 is `topic0`.
pub fn find_creation_log(logs: &[LogEntry], factory: Address, topic0: B256) -> Option<&LogEntry> {
    logs.iter()
        .find(|log| log.address == factory && log.topic0() == Some(topic0))
}

/// Locate and decode the factory's `TokenCreated` log in a receipt.
pub fn decode_token_created(
    logs: &[LogEntry],
    factory: Address,
    binding: &dyn CreationEventBinding,
) -> Result<TokenCreatedRecord, DecodeError> {
    let topic0 = binding.selector()?;
    let log = find_creation_log(logs, factory, topic0).ok_or(DecodeError::NoMatchingLog)?;
    let record = binding.decode(log)?.into_record()?;
    debug!(token = %record.token_address, creator = %record.creator, "TokenCreated decoded");
    Ok(record)
}
