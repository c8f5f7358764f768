//! The token launch panel: owns the form, status, fee cache, pending flag and
//! wallet connection, and drives one creation at a time through
//! validate → fee → submit → receipt → decode.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, U256};
use forge_chain::{
    ChainError, ChainReader, ChainSettings, ConnectionState, CreationEventBinding, FeePolicy,
    FeeReader, NamedBinding, ReceiptWatcher, TokenCreatedRecord, TransactionSubmitter,
    WalletConnector, decode_token_created,
};
use forge_core::{ForgeConfig, NotificationCenter};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::form::{DEFAULT_SYMBOL_MAX_LEN, TokenForm};
use crate::host::MiniAppHost;
use crate::presenter::{
    COPIED_LABEL, Clipboard, CopyIndicator, SHARE_FAILED, StatusView, share_text,
};
use crate::status::{Failure, Status};

/// Everything the panel needs that does not change during a session.
#[derive(Clone)]
pub struct LaunchSettings {
    pub factory: Address,
    pub fee_policy: FeePolicy,
    pub receipt_watcher: ReceiptWatcher,
    pub binding: Arc<dyn CreationEventBinding>,
    pub connector_preference: Vec<String>,
    pub app_url: String,
    pub symbol_max_len: usize,
}

impl LaunchSettings {
    pub fn new(factory: Address, fee_policy: FeePolicy) -> Self {
        Self {
            factory,
            fee_policy,
            receipt_watcher: ReceiptWatcher::default(),
            binding: Arc::new(NamedBinding),
            connector_preference: vec!["miniApp".into(), "localKey".into(), "injected".into()],
            app_url: forge_core::config::DEFAULT_APP_URL.into(),
            symbol_max_len: DEFAULT_SYMBOL_MAX_LEN,
        }
    }

    pub fn from_chain_settings(chain: &ChainSettings, config: &ForgeConfig) -> Self {
        Self {
            factory: chain.factory,
            fee_policy: chain.fee_policy,
            receipt_watcher: chain.receipt_watcher,
            binding: Arc::clone(&chain.binding),
            connector_preference: chain.connector_preference.clone(),
            app_url: config.app_url.clone(),
            symbol_max_len: config.symbol_max_len,
        }
    }
}

/// Result of a create action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A submission is already in flight; nothing happened.
    Busy,
    /// The on-chain fee was not cached; a fetch was started instead.
    FeePending,
    Failed(Failure),
    Created(TokenCreatedRecord),
}

/// Clears the pending flag when the creation flow ends, however it ends.
struct PendingGuard<'a>(&'a AtomicBool);

impl<'a> PendingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct LaunchPanel {
    settings: LaunchSettings,
    submitter: TransactionSubmitter,
    host: Arc<dyn MiniAppHost>,

    form: Mutex<TokenForm>,
    status: RwLock<Status>,
    fee: FeeReader,
    reader: RwLock<Option<Arc<dyn ChainReader>>>,
    connectors: Vec<Arc<dyn WalletConnector>>,
    connection: RwLock<ConnectionState>,
    pending: AtomicBool,
    copy: CopyIndicator,
    notifications: Mutex<NotificationCenter>,
}

impl LaunchPanel {
    pub fn new(settings: LaunchSettings, host: Arc<dyn MiniAppHost>) -> Self {
        let mut connectors = Vec::new();
        if let Some(connector) = host.connector() {
            connectors.push(connector);
        }
        Self {
            submitter: TransactionSubmitter::new(settings.fee_policy),
            form: Mutex::new(TokenForm::with_symbol_max_len(settings.symbol_max_len)),
            status: RwLock::new(Status::Idle),
            fee: FeeReader::new(None),
            reader: RwLock::new(None),
            connectors,
            connection: RwLock::new(ConnectionState::Disconnected),
            pending: AtomicBool::new(false),
            copy: CopyIndicator::new(),
            notifications: Mutex::new(NotificationCenter::new()),
            settings,
            host,
        }
    }

    pub fn with_reader(self, reader: Arc<dyn ChainReader>) -> Self {
        self.set_reader(Some(reader));
        self
    }

    /// Add connectors after any the host contributed.
    pub fn with_connectors(mut self, connectors: Vec<Arc<dyn WalletConnector>>) -> Self {
        self.connectors.extend(connectors);
        self
    }

    /// Swap the read-only client (a chain switch). The cached fee is dropped
    /// and fetched again on the next [`LaunchPanel::load_fee`].
    pub fn set_reader(&self, reader: Option<Arc<dyn ChainReader>>) {
        self.fee.set_reader(reader.clone());
        *self.reader.write() = reader;
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Signal the host, read the fee and auto-connect inside a mini app.
    pub async fn activate(&self) {
        if let Err(e) = self.host.ready().await {
            warn!("host ready signal failed: {e:#}");
        }
        if self.settings.fee_policy.needs_fee_read() {
            self.load_fee().await;
        }
        if self.host.is_in_mini_app() {
            if let Err(e) = self.connect().await {
                warn!("auto-connect failed: {e}");
            }
        }
    }

    /// Fetch the creation fee if it is not cached. A failure sets the status
    /// and leaves the fee empty so creation stays blocked.
    pub async fn load_fee(&self) -> Option<U256> {
        match self.fee.load().await {
            Ok(fee) => {
                let mut status = self.status.write();
                if matches!(*status, Status::FetchingFee | Status::Failed(Failure::FeeUnavailable)) {
                    *status = Status::Idle;
                }
                Some(fee)
            }
            Err(_) => {
                self.set_status(Status::Failed(Failure::FeeUnavailable));
                None
            }
        }
    }

    // -- Wallet -------------------------------------------------------------

    pub async fn connect(&self) -> Result<(), ChainError> {
        let state =
            ConnectionState::connect(&self.settings.connector_preference, &self.connectors).await?;
        *self.connection.write() = state;
        Ok(())
    }

    pub fn disconnect(&self) {
        *self.connection.write() = ConnectionState::Disconnected;
        info!("wallet disconnected");
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection.read().clone()
    }

    // -- Form ---------------------------------------------------------------

    pub fn form(&self) -> TokenForm {
        self.form.lock().clone()
    }

    pub fn update_form(&self, edit: impl FnOnce(&mut TokenForm)) {
        edit(&mut self.form.lock());
    }

    // -- Create -------------------------------------------------------------

    /// Run one creation. Concurrent calls while one is in flight return
    /// [`SubmitOutcome::Busy`] without side effects.
    pub async fn create_token(&self) -> SubmitOutcome {
        let Some(_guard) = PendingGuard::acquire(&self.pending) else {
            debug!("create ignored: submission already pending");
            return SubmitOutcome::Busy;
        };

        self.set_status(Status::ValidatingInput);
        let validated = self.form.lock().validate();
        let request = match validated {
            Ok(request) => request,
            Err(e) => return self.fail(Failure::Validation(e)),
        };

        let Some(sender) = self.connection.read().sender() else {
            return self.fail(Failure::NotConnected);
        };

        let fee = self.fee.cached();
        if self.settings.fee_policy.needs_fee_read() && fee.is_none() {
            // The status stays on "Fetching creation fee..." until the next
            // create attempt, even if this read succeeds.
            self.set_status(Status::FetchingFee);
            if self.fee.load().await.is_err() {
                self.set_status(Status::Failed(Failure::FeeUnavailable));
            }
            return SubmitOutcome::FeePending;
        }

        self.set_status(Status::Submitting);
        let hash = match self.submitter.submit(sender.as_ref(), &request, fee).await {
            Ok(hash) => hash,
            Err(e) => return self.fail(Failure::Wallet(e.to_string())),
        };
        self.set_status(Status::AwaitingReceipt(hash));

        let Some(reader) = self.reader.read().clone() else {
            return self.fail(Failure::Receipt("read-only client unavailable".into()));
        };
        let receipt = match self.settings.receipt_watcher.wait(reader.as_ref(), hash).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(tx_hash = %hash, "receipt wait failed: {e}");
                return self.fail(Failure::Receipt(e.to_string()));
            }
        };

        match decode_token_created(&receipt.logs, self.settings.factory, self.settings.binding.as_ref()) {
            Ok(record) => {
                info!(token = %record.token_address, tx_hash = %hash, "token created");
                self.set_status(Status::Succeeded(record.clone()));
                SubmitOutcome::Created(record)
            }
            Err(e) => {
                warn!(tx_hash = %hash, "could not decode TokenCreated: {e}");
                self.fail(Failure::Decode(e))
            }
        }
    }

    /// Back to idle after a result, ready for another attempt.
    pub fn reset(&self) {
        let mut status = self.status.write();
        if status.is_terminal() {
            *status = Status::Idle;
        }
    }

    // -- Result actions -----------------------------------------------------

    /// Copy the created token's address. Does nothing before success.
    pub fn copy_address(&self, clipboard: &dyn Clipboard) -> bool {
        match self.status().token_address() {
            Some(address) => self.copy.copy(clipboard, &address.to_string()),
            None => false,
        }
    }

    /// Open the host composer with the share text. A host failure becomes an
    /// error toast and is otherwise swallowed.
    pub async fn share(&self) {
        let Status::Succeeded(record) = self.status() else {
            return;
        };
        let embeds = [self.settings.app_url.clone()];
        if let Err(e) = self.host.compose_share(&share_text(&record.name), &embeds).await {
            warn!("Failed to share: {e:#}");
            self.notifications.lock().error(SHARE_FAILED);
        }
    }

    // -- Read side ----------------------------------------------------------

    pub fn status(&self) -> Status {
        self.status.read().clone()
    }

    pub fn view(&self) -> Option<StatusView> {
        StatusView::from_status(&self.status.read())
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    pub fn fee(&self) -> Option<U256> {
        self.settings.fee_policy.resolve_fee(self.fee.cached())
    }

    /// Suffix on the create button: the fee, or a placeholder until read.
    pub fn fee_label(&self) -> String {
        match self.fee() {
            Some(fee) => format!("(Fee: {} ETH)", trim_ether(&format_ether(fee))),
            None => "(Fetching fee...)".into(),
        }
    }

    /// Copy button label.
    pub fn copy_label(&self) -> Option<&'static str> {
        self.copy.is_copied().then_some(COPIED_LABEL)
    }

    pub fn copy_indicator(&self) -> &CopyIndicator {
        &self.copy
    }

    /// Messages of toasts still on screen, newest first.
    pub fn notifications(&self) -> Vec<String> {
        self.notifications
            .lock()
            .visible()
            .map(|n| n.message.clone())
            .collect()
    }

    fn set_status(&self, status: Status) {
        debug!(status = %status.text(), "status");
        *self.status.write() = status;
    }

    fn fail(&self, failure: Failure) -> SubmitOutcome {
        self.set_status(Status::Failed(failure.clone()));
        SubmitOutcome::Failed(failure)
    }
}

/// `0.006000000000000000` → `0.006`.
fn trim_ether(raw: &str) -> String {
    if !raw.contains('.') {
        return raw.to_string();
    }
    let trimmed = raw.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}
