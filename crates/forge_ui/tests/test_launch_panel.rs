use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use alloy::primitives::utils::parse_ether;
use alloy::primitives::{Address, TxHash, U256, address};
use alloy::sol_types::SolEvent;
use anyhow::anyhow;
use async_trait::async_trait;
use forge_chain::{
    ChainError, ChainReader, ConnectorReadiness, CreateTokenCall, FeePolicy, LogEntry,
    TokenFactory, TransactionSender, TxReceipt, WalletConnector,
};
use forge_ui::presenter::{COPIED_LABEL, SHARE_FAILED};
use forge_ui::*;
use parking_lot::Mutex;
use tokio::sync::Notify;

const FACTORY: Address = address!("0x1111111111111111111111111111111111111111");
const TOKEN: Address = address!("0x2222222222222222222222222222222222222222");
const ACCOUNT: Address = address!("0x3333333333333333333333333333333333333333");

// ---------------------------------------------------------------------------
// Mocks
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockChain {
    fee: Option<U256>,
    fee_calls: AtomicUsize,
    receipts: Mutex<HashMap<TxHash, TxReceipt>>,
}

impl MockChain {
    fn with_fee(fee: Option<U256>) -> Arc<Self> {
        Arc::new(Self {
            fee,
            ..Self::default()
        })
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn creation_fee(&self) -> Result<U256, ChainError> {
        self.fee_calls.fetch_add(1, Ordering::SeqCst);
        self.fee.ok_or_else(|| ChainError::rpc("connection refused"))
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, ChainError> {
        Ok(self.receipts.lock().get(&hash).cloned())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mined {
    WithEvent,
    WithoutEvent,
}

struct MockWallet {
    chain: Arc<MockChain>,
    mined: Mined,
    reject: Option<String>,
    gate: Option<Arc<Notify>>,
    sent: Mutex<Vec<CreateTokenCall>>,
}

impl MockWallet {
    fn new(chain: Arc<MockChain>) -> Self {
        Self {
            chain,
            mined: Mined::WithEvent,
            reject: None,
            gate: None,
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TransactionSender for MockWallet {
    fn account(&self) -> Address {
        ACCOUNT
    }

    async fn send_create_token(&self, call: &CreateTokenCall) -> Result<TxHash, ChainError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(msg) = &self.reject {
            return Err(ChainError::Wallet(msg.clone()));
        }

        let mut sent = self.sent.lock();
        sent.push(call.clone());
        let hash = TxHash::with_last_byte(sent.len() as u8);

        let logs = match self.mined {
            Mined::WithEvent => {
                let data = TokenFactory::TokenCreated {
                    tokenAddress: TOKEN,
                    creator: ACCOUNT,
                    name: call.name.clone(),
                    initialSupply: call.initial_supply,
                    imageURI: call.image_uri.clone(),
                }
                .encode_log_data();
                vec![LogEntry {
                    address: FACTORY,
                    topics: data.topics().to_vec(),
                    data: data.data.clone(),
                    block_number: Some(1),
                }]
            }
            Mined::WithoutEvent => Vec::new(),
        };
        self.chain.receipts.lock().insert(
            hash,
            TxReceipt {
                hash,
                success: true,
                block_number: Some(1),
                logs,
            },
        );
        Ok(hash)
    }
}

struct StaticConnector {
    id: &'static str,
    readiness: ConnectorReadiness,
    wallet: Arc<MockWallet>,
}

#[async_trait]
impl WalletConnector for StaticConnector {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.id
    }

    fn readiness(&self) -> ConnectorReadiness {
        self.readiness
    }

    async fn connect(&self) -> Result<Arc<dyn TransactionSender>, ChainError> {
        Ok(self.wallet.clone())
    }
}

#[derive(Default)]
struct RecordingHost {
    in_mini_app: bool,
    fail_share: bool,
    connector: Option<Arc<dyn WalletConnector>>,
    ready_calls: AtomicUsize,
    shares: Mutex<Vec<(String, Vec<String>)>>,
}

#[async_trait]
impl MiniAppHost for RecordingHost {
    async fn ready(&self) -> anyhow::Result<()> {
        self.ready_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn compose_share(&self, text: &str, embeds: &[String]) -> anyhow::Result<()> {
        if self.fail_share {
            return Err(anyhow!("composer unavailable"));
        }
        self.shares.lock().push((text.to_string(), embeds.to_vec()));
        Ok(())
    }

    fn is_in_mini_app(&self) -> bool {
        self.in_mini_app
    }

    fn connector(&self) -> Option<Arc<dyn WalletConnector>> {
        self.connector.clone()
    }
}

struct FailingClipboard;

impl Clipboard for FailingClipboard {
    fn set_text(&self, _: &str) -> anyhow::Result<()> {
        Err(anyhow!("no display"))
    }
}

#[derive(Default)]
struct MemoryClipboard(Mutex<Option<String>>);

impl Clipboard for MemoryClipboard {
    fn set_text(&self, text: &str) -> anyhow::Result<()> {
        *self.0.lock() = Some(text.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fee() -> U256 {
    parse_ether("0.001").unwrap()
}

fn build_panel(policy: FeePolicy, chain: &Arc<MockChain>, host: Arc<RecordingHost>) -> LaunchPanel {
    LaunchPanel::new(LaunchSettings::new(FACTORY, policy), host).with_reader(chain.clone())
}

fn connector(wallet: &Arc<MockWallet>) -> Vec<Arc<dyn WalletConnector>> {
    vec![Arc::new(StaticConnector {
        id: "localKey",
        readiness: ConnectorReadiness::Ready,
        wallet: wallet.clone(),
    })]
}

fn fill(panel: &LaunchPanel) {
    panel.update_form(|form| {
        form.set_name("My Token");
        form.set_symbol("tkn");
        form.set_initial_supply("1000000");
        form.set_image_uri("");
    });
}

async fn ready_panel(policy: FeePolicy) -> (LaunchPanel, Arc<MockChain>, Arc<MockWallet>) {
    let chain = MockChain::with_fee(Some(fee()));
    let wallet = Arc::new(MockWallet::new(chain.clone()));
    let panel = build_panel(policy, &chain, Arc::new(RecordingHost::default()))
        .with_connectors(connector(&wallet));
    panel.activate().await;
    panel.connect().await.unwrap();
    fill(&panel);
    (panel, chain, wallet)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_panel_is_idle() {
    let chain = MockChain::with_fee(Some(fee()));
    let panel = build_panel(FeePolicy::OnChain, &chain, Arc::new(RecordingHost::default()));

    assert_eq!(panel.status(), Status::Idle);
    assert!(panel.view().is_none());
    assert!(!panel.is_pending());
    assert!(!panel.connection().is_connected());
    assert_eq!(panel.fee_label(), "(Fetching fee...)");
    assert_eq!(chain.fee_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn activate_signals_host_and_reads_fee_once() {
    let chain = MockChain::with_fee(Some(fee()));
    let host = Arc::new(RecordingHost::default());
    let panel = build_panel(FeePolicy::OnChain, &chain, host.clone());

    panel.activate().await;
    panel.load_fee().await;

    assert_eq!(host.ready_calls.load(Ordering::SeqCst), 1);
    assert_eq!(chain.fee_calls.load(Ordering::SeqCst), 1);
    assert_eq!(panel.fee(), Some(fee()));
    assert_eq!(panel.fee_label(), "(Fee: 0.001 ETH)");
    assert_eq!(panel.status(), Status::Idle);
}

#[tokio::test]
async fn fee_read_failure_is_a_status() {
    let chain = MockChain::with_fee(None);
    let panel = build_panel(FeePolicy::OnChain, &chain, Arc::new(RecordingHost::default()));

    panel.activate().await;

    assert_eq!(panel.fee(), None);
    assert_eq!(panel.status(), Status::Failed(Failure::FeeUnavailable));
    assert_eq!(panel.view().unwrap().text, "Failed to fetch creation fee");
}

#[tokio::test]
async fn chain_switch_refetches_fee() {
    let first = MockChain::with_fee(Some(fee()));
    let panel = build_panel(FeePolicy::OnChain, &first, Arc::new(RecordingHost::default()));
    panel.activate().await;

    let second = MockChain::with_fee(Some(U256::from(7u64)));
    panel.set_reader(Some(second.clone()));
    assert_eq!(panel.fee(), None);

    assert_eq!(panel.load_fee().await, Some(U256::from(7u64)));
    assert_eq!(second.fee_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fixed_policy_never_reads_fee() {
    let chain = MockChain::with_fee(Some(fee()));
    let panel = build_panel(FeePolicy::fixed_default(), &chain, Arc::new(RecordingHost::default()));

    panel.activate().await;

    assert_eq!(chain.fee_calls.load(Ordering::SeqCst), 0);
    assert_eq!(panel.fee_label(), "(Fee: 0.006 ETH)");
}

#[tokio::test]
async fn missing_fields_make_no_network_call() {
    let chain = MockChain::with_fee(Some(fee()));
    let wallet = Arc::new(MockWallet::new(chain.clone()));
    let panel = build_panel(FeePolicy::OnChain, &chain, Arc::new(RecordingHost::default()))
        .with_connectors(connector(&wallet));
    panel.connect().await.unwrap();
    panel.update_form(|form| form.set_name("My Token"));

    let outcome = panel.create_token().await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed(Failure::Validation(ValidationError::MissingRequired))
    );
    assert_eq!(panel.view().unwrap().text, "Please fill in all required fields");
    assert_eq!(chain.fee_calls.load(Ordering::SeqCst), 0);
    assert!(wallet.sent.lock().is_empty());
    assert!(!panel.is_pending());
}

#[tokio::test]
async fn create_requires_connected_wallet() {
    let chain = MockChain::with_fee(Some(fee()));
    let panel = build_panel(FeePolicy::OnChain, &chain, Arc::new(RecordingHost::default()));
    panel.activate().await;
    fill(&panel);

    assert_eq!(
        panel.create_token().await,
        SubmitOutcome::Failed(Failure::NotConnected)
    );
    assert_eq!(panel.view().unwrap().text, "Connect a wallet to create a token");
}

#[tokio::test]
async fn on_chain_policy_waits_for_fee_before_sending() {
    let chain = MockChain::with_fee(Some(fee()));
    let wallet = Arc::new(MockWallet::new(chain.clone()));
    let panel = build_panel(FeePolicy::OnChain, &chain, Arc::new(RecordingHost::default()))
        .with_connectors(connector(&wallet));
    // No activate(): the fee was never read.
    panel.connect().await.unwrap();
    fill(&panel);

    assert_eq!(panel.create_token().await, SubmitOutcome::FeePending);
    assert_eq!(panel.status(), Status::FetchingFee);
    assert_eq!(panel.view().unwrap().text, "Fetching creation fee...");
    assert!(wallet.sent.lock().is_empty());

    // The refetch landed; the next attempt goes through.
    assert_eq!(panel.fee(), Some(fee()));
    assert!(matches!(panel.create_token().await, SubmitOutcome::Created(_)));
}

#[tokio::test]
async fn end_to_end_on_chain_fee() {
    let (panel, _chain, wallet) = ready_panel(FeePolicy::OnChain).await;
    assert_eq!(panel.form().symbol, "TKN");

    let outcome = panel.create_token().await;

    let SubmitOutcome::Created(record) = outcome else {
        panic!("expected Created, got {outcome:?}");
    };
    assert_eq!(record.token_address, TOKEN);

    let sent = wallet.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].name, "My Token");
    assert_eq!(sent[0].symbol, "TKN");
    assert_eq!(sent[0].initial_supply, U256::from(1_000_000u64));
    assert_eq!(sent[0].image_uri, "");
    assert_eq!(sent[0].value, fee());

    let view = panel.view().unwrap();
    assert_eq!(view.text, "Token created!");
    assert_eq!(view.tone, Tone::Green);
    assert_eq!(view.icon, StatusIcon::Success);
    assert_eq!(view.token_address, Some(TOKEN));
    assert!(!panel.is_pending());
}

#[tokio::test]
async fn end_to_end_fixed_fee() {
    let (panel, chain, wallet) = ready_panel(FeePolicy::fixed_default()).await;

    let outcome = panel.create_token().await;
    assert!(matches!(outcome, SubmitOutcome::Created(ref r) if r.token_address == TOKEN));

    let sent = wallet.sent.lock();
    let scaled = U256::from(1_000_000u64) * U256::from(10u64).pow(U256::from(18u64));
    assert_eq!(sent[0].initial_supply, scaled);
    assert_eq!(sent[0].value, parse_ether("0.006").unwrap());
    assert_eq!(chain.fee_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn wallet_rejection_is_shown_verbatim_and_retryable() {
    let chain = MockChain::with_fee(Some(fee()));
    let mut rejecting = MockWallet::new(chain.clone());
    rejecting.reject = Some("User rejected the request.".into());
    let wallet = Arc::new(rejecting);
    let panel = build_panel(FeePolicy::OnChain, &chain, Arc::new(RecordingHost::default()))
        .with_connectors(connector(&wallet));
    panel.activate().await;
    panel.connect().await.unwrap();
    fill(&panel);

    panel.create_token().await;

    let view = panel.view().unwrap();
    assert_eq!(view.text, "Error: User rejected the request.");
    assert_eq!(view.tone, Tone::Red);
    assert_eq!(view.icon, StatusIcon::Error);
    assert!(!panel.is_pending());

    panel.reset();
    assert_eq!(panel.status(), Status::Idle);
    // Form input survives for the retry.
    assert_eq!(panel.form().name, "My Token");
}

#[tokio::test]
async fn receipt_without_event_cannot_resolve_address() {
    let chain = MockChain::with_fee(Some(fee()));
    let mut silent = MockWallet::new(chain.clone());
    silent.mined = Mined::WithoutEvent;
    let wallet = Arc::new(silent);
    let panel = build_panel(FeePolicy::OnChain, &chain, Arc::new(RecordingHost::default()))
        .with_connectors(connector(&wallet));
    panel.activate().await;
    panel.connect().await.unwrap();
    fill(&panel);

    let outcome = panel.create_token().await;

    assert!(matches!(outcome, SubmitOutcome::Failed(Failure::Decode(_))));
    let view = panel.view().unwrap();
    assert_eq!(view.text, "Unable to retrieve token address.");
    assert_eq!(view.tone, Tone::Amber);
    assert_eq!(view.token_address, None);
}

#[tokio::test]
async fn second_submit_while_pending_is_busy() {
    let chain = MockChain::with_fee(Some(fee()));
    let gate = Arc::new(Notify::new());
    let mut gated = MockWallet::new(chain.clone());
    gated.gate = Some(gate.clone());
    let wallet = Arc::new(gated);
    let panel = Arc::new(
        build_panel(FeePolicy::OnChain, &chain, Arc::new(RecordingHost::default()))
            .with_connectors(connector(&wallet)),
    );
    panel.activate().await;
    panel.connect().await.unwrap();
    fill(&panel);

    let first = {
        let panel = panel.clone();
        tokio::spawn(async move { panel.create_token().await })
    };
    while !panel.is_pending() {
        tokio::task::yield_now().await;
    }

    assert_eq!(panel.create_token().await, SubmitOutcome::Busy);
    assert_eq!(panel.status(), Status::Submitting);

    gate.notify_one();
    assert!(matches!(first.await.unwrap(), SubmitOutcome::Created(_)));
    assert_eq!(wallet.sent.lock().len(), 1);
    assert!(!panel.is_pending());
}

#[tokio::test(start_paused = true)]
async fn copy_acknowledgement_reverts_after_window() {
    let (panel, _chain, _wallet) = ready_panel(FeePolicy::OnChain).await;
    panel.create_token().await;
    let clipboard = MemoryClipboard::default();

    assert!(panel.copy_address(&clipboard));
    assert_eq!(clipboard.0.lock().as_deref(), Some(TOKEN.to_string().as_str()));
    assert_eq!(panel.copy_label(), Some(COPIED_LABEL));

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    // A second click restarts the window.
    assert!(panel.copy_address(&clipboard));

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(panel.copy_label(), Some(COPIED_LABEL));

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(panel.copy_label(), None);
}

#[tokio::test]
async fn clipboard_failure_is_silent() {
    let (panel, _chain, _wallet) = ready_panel(FeePolicy::OnChain).await;
    panel.create_token().await;

    assert!(!panel.copy_address(&FailingClipboard));
    assert_eq!(panel.copy_label(), None);
    assert!(panel.notifications().is_empty());
}

#[tokio::test]
async fn copy_before_success_does_nothing() {
    let chain = MockChain::with_fee(Some(fee()));
    let panel = build_panel(FeePolicy::OnChain, &chain, Arc::new(RecordingHost::default()));
    let clipboard = MemoryClipboard::default();

    assert!(!panel.copy_address(&clipboard));
    assert!(clipboard.0.lock().is_none());
}

#[tokio::test]
async fn share_composes_text_with_app_url() {
    let chain = MockChain::with_fee(Some(fee()));
    let wallet = Arc::new(MockWallet::new(chain.clone()));
    let host = Arc::new(RecordingHost::default());
    let panel = build_panel(FeePolicy::OnChain, &chain, host.clone()).with_connectors(connector(&wallet));
    panel.activate().await;
    panel.connect().await.unwrap();
    fill(&panel);
    panel.create_token().await;

    panel.share().await;

    let shares = host.shares.lock();
    assert_eq!(shares.len(), 1);
    assert_eq!(shares[0].0, "I just created my token \"My Token\"! Create yours here!");
    assert_eq!(shares[0].1, vec!["https://forge-chi.vercel.app/".to_string()]);
}

#[tokio::test]
async fn share_failure_becomes_toast() {
    let chain = MockChain::with_fee(Some(fee()));
    let wallet = Arc::new(MockWallet::new(chain.clone()));
    let host = Arc::new(RecordingHost {
        fail_share: true,
        ..RecordingHost::default()
    });
    let panel = build_panel(FeePolicy::OnChain, &chain, host).with_connectors(connector(&wallet));
    panel.activate().await;
    panel.connect().await.unwrap();
    fill(&panel);
    panel.create_token().await;

    panel.share().await;

    assert_eq!(panel.notifications(), vec![SHARE_FAILED.to_string()]);
    // The result stays on screen.
    assert_eq!(panel.status().token_address(), Some(TOKEN));
}

#[tokio::test]
async fn mini_app_host_connector_auto_connects() {
    let chain = MockChain::with_fee(Some(fee()));
    let wallet = Arc::new(MockWallet::new(chain.clone()));
    let host = Arc::new(RecordingHost {
        in_mini_app: true,
        connector: Some(Arc::new(StaticConnector {
            id: "miniApp",
            readiness: ConnectorReadiness::Ready,
            wallet: wallet.clone(),
        })),
        ..RecordingHost::default()
    });
    let panel = build_panel(FeePolicy::OnChain, &chain, host);

    panel.activate().await;

    let connection = panel.connection();
    assert!(connection.is_connected());
    assert_eq!(connection.account(), Some(ACCOUNT));
    assert_eq!(connection.short_account().as_deref(), Some("0x3333...3333"));

    panel.disconnect();
    assert!(!panel.connection().is_connected());
}

#[tokio::test]
async fn outside_mini_app_there_is_no_auto_connect() {
    let chain = MockChain::with_fee(Some(fee()));
    let wallet = Arc::new(MockWallet::new(chain.clone()));
    let panel = build_panel(FeePolicy::OnChain, &chain, Arc::new(RecordingHost::default()))
        .with_connectors(connector(&wallet));

    panel.activate().await;

    assert!(!panel.connection().is_connected());
}
