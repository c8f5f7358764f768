//! EVM side of Forge: factory bindings, fee reads, token creation, receipt
//! polling, `TokenCreated` decoding, wallet connectors and the explorer
//! verification listener.

pub mod chain;
pub mod client;
pub mod connector;
pub mod decode;
pub mod error;
pub mod factory;
pub mod fee;
pub mod receipt;
pub mod request;
pub mod rpc_config;
pub mod settings;
pub mod submit;
pub mod verify;

pub use chain::{Chain, ChainConfig, get_chain_configs};
pub use client::{ChainReader, RpcReader, RpcWallet, TransactionSender};
pub use connector::{
    ConnectionState, ConnectorChoice, ConnectorInfo, ConnectorReadiness, LocalKeyConnector,
    NodeAccountConnector, WalletConnector, select_connector, shorten_address,
};
pub use decode::{
    AbiBinding, CreationEventBinding, EventArgs, NamedBinding, TokenCreatedRecord,
    decode_token_created, find_creation_log,
};
pub use error::{ChainError, DecodeError};
pub use factory::TokenFactory;
pub use fee::FeeReader;
pub use receipt::{LogEntry, ReceiptWatcher, TxReceipt};
pub use request::{CreateTokenCall, FeePolicy, TokenCreationRequest};
pub use rpc_config::{RpcConfig, RpcConfigStore, validate_url};
pub use settings::ChainSettings;
pub use submit::TransactionSubmitter;
pub use verify::{
    EventSource, ExplorerClient, PollSummary, VerificationListener, VerificationRequest,
    VerificationSink,
};
