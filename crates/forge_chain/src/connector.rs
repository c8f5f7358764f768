//! Wallet connectors and the connection state the launch panel holds.

use std::fmt;
use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::client::{RpcWallet, TransactionSender};
use crate::error::ChainError;

/// Connector contributed by the mini-app host.
pub const MINI_APP_CONNECTOR_ID: &str = "miniApp";
/// Local private key from the environment.
pub const LOCAL_KEY_CONNECTOR_ID: &str = "localKey";
/// Account managed by the RPC node itself.
pub const INJECTED_CONNECTOR_ID: &str = "injected";

/// Whether a connector reported that it can connect right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorReadiness {
    Ready,
    NotReady,
    /// The connector does not report readiness.
    Unknown,
}

/// What selection looks at: an id and a readiness flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorInfo {
    pub id: String,
    pub readiness: ConnectorReadiness,
}

#[async_trait]
pub trait WalletConnector: Send + Sync {
    fn id(&self) -> &str;

    /// Label shown once connected.
    fn name(&self) -> &str;

    fn readiness(&self) -> ConnectorReadiness;

    async fn connect(&self) -> Result<Arc<dyn TransactionSender>, ChainError>;

    fn info(&self) -> ConnectorInfo {
        ConnectorInfo {
            id: self.id().to_string(),
            readiness: self.readiness(),
        }
    }
}

/// Result of [`select_connector`]: which candidate, and the warning to log
/// when it was not a ready preferred connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorChoice {
    pub index: usize,
    pub warning: Option<String>,
}

/// Pick a connector from `candidates`, evaluated once per connect action:
///
/// 1. the first id in `preference` whose connector is ready;
/// 2. otherwise the first id in `preference` that is present at all;
/// 3. otherwise the first candidate;
/// 4. otherwise nothing.
pub fn select_connector(preference: &[String], candidates: &[ConnectorInfo]) -> Option<ConnectorChoice> {
    let position = |id: &str| candidates.iter().position(|c| c.id == id);

    for id in preference {
        if let Some(index) = position(id) {
            if candidates[index].readiness == ConnectorReadiness::Ready {
                return Some(ConnectorChoice {
                    index,
                    warning: None,
                });
            }
        }
    }

    for id in preference {
        if let Some(index) = position(id) {
            return Some(ConnectorChoice {
                index,
                warning: Some(format!(
                    "{id} connector not reporting ready, attempting to connect anyway"
                )),
            });
        }
    }

    candidates.first().map(|first| ConnectorChoice {
        index: 0,
        warning: Some(format!(
            "Preferred connectors not available, using first available connector {}",
            first.id
        )),
    })
}

// ---------------------------------------------------------------------------
// Connection state
// ---------------------------------------------------------------------------

/// Explicit wallet connection, owned by whoever drives the launch flow.
#[derive(Clone, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected {
        connector_id: String,
        connector_name: String,
        sender: Arc<dyn TransactionSender>,
    },
}

impl ConnectionState {
    /// Run connector selection and connect with the chosen connector.
    pub async fn connect(
        preference: &[String],
        connectors: &[Arc<dyn WalletConnector>],
    ) -> Result<Self, ChainError> {
        let infos: Vec<ConnectorInfo> = connectors.iter().map(|c| c.info()).collect();
        let Some(choice) = select_connector(preference, &infos) else {
            warn!("No suitable or available connectors found");
            return Err(ChainError::Wallet("No suitable or available connectors found".into()));
        };
        if let Some(warning) = &choice.warning {
            warn!("{warning}");
        }

        let connector = &connectors[choice.index];
        let sender = connector.connect().await?;
        info!(connector = connector.id(), account = %sender.account(), "wallet connected");
        Ok(Self::Connected {
            connector_id: connector.id().to_string(),
            connector_name: connector.name().to_string(),
            sender,
        })
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    pub fn account(&self) -> Option<Address> {
        match self {
            Self::Connected { sender, .. } => Some(sender.account()),
            Self::Disconnected => None,
        }
    }

    pub fn sender(&self) -> Option<Arc<dyn TransactionSender>> {
        match self {
            Self::Connected { sender, .. } => Some(Arc::clone(sender)),
            Self::Disconnected => None,
        }
    }

    /// Label of the connector in use.
    pub fn connector_name(&self) -> Option<&str> {
        match self {
            Self::Connected { connector_name, .. } => Some(connector_name),
            Self::Disconnected => None,
        }
    }

    /// `0x1234...abcd` form of the connected account.
    pub fn short_account(&self) -> Option<String> {
        self.account().map(|account| shorten_address(&account))
    }
}

impl fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("Disconnected"),
            Self::Connected {
                connector_id,
                connector_name,
                sender,
            } => f
                .debug_struct("Connected")
                .field("connector_id", connector_id)
                .field("connector_name", connector_name)
                .field("account", &sender.account())
                .finish(),
        }
    }
}

pub fn shorten_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

// ---------------------------------------------------------------------------
// Connectors
// ---------------------------------------------------------------------------

/// Signs with a private key supplied through configuration.
pub struct LocalKeyConnector {
    rpc_url: String,
    factory: Address,
    key: Option<String>,
}

impl LocalKeyConnector {
    pub fn new(rpc_url: impl Into<String>, factory: Address, key: Option<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            factory,
            key,
        }
    }
}

#[async_trait]
impl WalletConnector for LocalKeyConnector {
    fn id(&self) -> &str {
        LOCAL_KEY_CONNECTOR_ID
    }

    fn name(&self) -> &str {
        "Local key"
    }

    fn readiness(&self) -> ConnectorReadiness {
        if self.key.is_some() {
            ConnectorReadiness::Ready
        } else {
            ConnectorReadiness::NotReady
        }
    }

    async fn connect(&self) -> Result<Arc<dyn TransactionSender>, ChainError> {
        let key = self
            .key
            .as_deref()
            .ok_or_else(|| ChainError::Wallet("FORGE_PRIVATE_KEY is not set".into()))?;
        let wallet = RpcWallet::from_private_key(&self.rpc_url, self.factory, key)?;
        Ok(Arc::new(wallet))
    }
}

/// Sends through an account unlocked on the RPC node (dev nodes, signers
/// behind a proxy). Readiness is only known after asking the node.
pub struct NodeAccountConnector {
    rpc_url: String,
    factory: Address,
}

impl NodeAccountConnector {
    pub fn new(rpc_url: impl Into<String>, factory: Address) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            factory,
        }
    }
}

#[async_trait]
impl WalletConnector for NodeAccountConnector {
    fn id(&self) -> &str {
        INJECTED_CONNECTOR_ID
    }

    fn name(&self) -> &str {
        "Node account"
    }

    fn readiness(&self) -> ConnectorReadiness {
        ConnectorReadiness::Unknown
    }

    async fn connect(&self) -> Result<Arc<dyn TransactionSender>, ChainError> {
        let wallet = RpcWallet::from_node_account(&self.rpc_url, self.factory).await?;
        Ok(Arc::new(wallet))
    }
}
