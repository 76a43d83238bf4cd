//! Shared fakes for the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, Log, TxHash, U256};
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use tokio::sync::Semaphore;

use marketplace_tx::blockchain::contracts::IERC721;
use marketplace_tx::blockchain::{
    AddressResolver, AmbientContext, BlockchainError, BlockchainResult, CallRequest, ChainGateway,
    ChainId, ReceiptOutcome,
};
use marketplace_tx::config::NetworkConfig;
use marketplace_tx::operations::{
    NotificationObserver, NotificationSink, OperationEnv, OperationState, TransitionEvent,
    TransitionObserver,
};

pub const ANVIL: ChainId = ChainId(31337);

pub fn network() -> NetworkConfig {
    NetworkConfig::anvil()
}

pub fn marketplace() -> Address {
    network().marketplace.parse().unwrap()
}

pub fn nft() -> Address {
    network().nft.parse().unwrap()
}

pub fn factory() -> Address {
    network().collection_factory.parse().unwrap()
}

pub fn account() -> Address {
    Address::repeat_byte(0xA1)
}

#[derive(Default)]
struct FakeState {
    ambient: AmbientContext,
    next_hash: u8,
    submit_errors: VecDeque<Option<BlockchainError>>,
    receipts: VecDeque<BlockchainResult<ReceiptOutcome>>,
    pending: HashMap<TxHash, BlockchainResult<ReceiptOutcome>>,
    submissions: Vec<CallRequest>,
    hashes: Vec<TxHash>,
    approvals: HashMap<(Address, U256), Address>,
    operators: HashSet<(Address, Address)>,
    drop_approvals: bool,
    read_error: bool,
    reads: usize,
}

/// In-memory wallet + node.
///
/// Submissions succeed unless an error was scripted; receipts are successful
/// unless scripted otherwise. `approve` calls are applied to the approval
/// table on submission, which `getApproved` reads then report.
pub struct FakeGateway {
    state: Mutex<FakeState>,
    gate: Option<Semaphore>,
}

impl FakeGateway {
    /// Connected to Anvil with a known account.
    pub fn connected() -> Arc<Self> {
        Self::with_ambient(AmbientContext::connected(account(), ANVIL), false)
    }

    /// Receipts are held until [`release`](Self::release) is called.
    pub fn gated() -> Arc<Self> {
        Self::with_ambient(AmbientContext::connected(account(), ANVIL), true)
    }

    pub fn with_ambient(ambient: AmbientContext, gated: bool) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState {
                ambient,
                ..Default::default()
            }),
            gate: gated.then(|| Semaphore::new(0)),
        })
    }

    pub fn release(&self, receipts: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(receipts);
        }
    }

    /// Outcome of the next submission; `None` means accepted.
    pub fn script_submit(&self, error: Option<BlockchainError>) {
        self.state.lock().unwrap().submit_errors.push_back(error);
    }

    /// Receipt for the next accepted submission.
    pub fn script_receipt(&self, receipt: BlockchainResult<ReceiptOutcome>) {
        self.state.lock().unwrap().receipts.push_back(receipt);
    }

    pub fn approve(&self, nft: Address, token_id: U256, spender: Address) {
        self.state.lock().unwrap().approvals.insert((nft, token_id), spender);
    }

    pub fn approve_operator(&self, owner: Address, operator: Address) {
        self.state.lock().unwrap().operators.insert((owner, operator));
    }

    /// Accept approve transactions without ever recording them.
    pub fn drop_approvals(&self) {
        self.state.lock().unwrap().drop_approvals = true;
    }

    pub fn fail_reads(&self) {
        self.state.lock().unwrap().read_error = true;
    }

    pub fn submissions(&self) -> Vec<CallRequest> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn hashes(&self) -> Vec<TxHash> {
        self.state.lock().unwrap().hashes.clone()
    }

    pub fn reads(&self) -> usize {
        self.state.lock().unwrap().reads
    }
}

#[async_trait]
impl ChainGateway for FakeGateway {
    fn ambient(&self) -> AmbientContext {
        self.state.lock().unwrap().ambient
    }

    async fn submit(&self, request: CallRequest) -> BlockchainResult<TxHash> {
        let mut state = self.state.lock().unwrap();
        state.submissions.push(request.clone());
        if let Some(Some(error)) = state.submit_errors.pop_front() {
            return Err(error);
        }

        if request.data.starts_with(&IERC721::approveCall::SELECTOR) && !state.drop_approvals {
            if let Ok(call) = IERC721::approveCall::abi_decode(&request.data) {
                state.approvals.insert((request.to, call.tokenId), call.to);
            }
        }

        state.next_hash += 1;
        let hash = TxHash::with_last_byte(state.next_hash);
        let receipt = state.receipts.pop_front().unwrap_or_else(|| {
            Ok(ReceiptOutcome {
                status: true,
                block_number: Some(1),
                logs: Vec::new(),
            })
        });
        state.pending.insert(hash, receipt);
        state.hashes.push(hash);
        Ok(hash)
    }

    async fn watch_receipt(&self, hash: TxHash) -> BlockchainResult<ReceiptOutcome> {
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| BlockchainError::Rpc(e.to_string()))?
                .forget();
        }
        self.state
            .lock()
            .unwrap()
            .pending
            .remove(&hash)
            .unwrap_or_else(|| Err(BlockchainError::Rpc(format!("unknown transaction {}", hash))))
    }

    async fn read_contract(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        let mut state = self.state.lock().unwrap();
        state.reads += 1;
        if state.read_error {
            return Err(BlockchainError::Rpc("connection refused".into()));
        }
        if data.starts_with(&IERC721::getApprovedCall::SELECTOR) {
            let call = IERC721::getApprovedCall::abi_decode(&data)
                .map_err(|e| BlockchainError::Decode(e.to_string()))?;
            let approved = state
                .approvals
                .get(&(to, call.tokenId))
                .copied()
                .unwrap_or(Address::ZERO);
            return Ok(approved.abi_encode().into());
        }
        if data.starts_with(&IERC721::isApprovedForAllCall::SELECTOR) {
            let call = IERC721::isApprovedForAllCall::abi_decode(&data)
                .map_err(|e| BlockchainError::Decode(e.to_string()))?;
            let approved = state.operators.contains(&(call.owner, call.operator));
            return Ok(approved.abi_encode().into());
        }
        Err(BlockchainError::Rpc("unexpected call".into()))
    }
}

/// Notification sink recording every call as `(level, message, key)`.
#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<(&'static str, String, String)>>,
}

impl RecordingSink {
    pub fn calls(&self) -> Vec<(&'static str, String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, level: &str) -> usize {
        self.calls().iter().filter(|(l, _, _)| *l == level).count()
    }
}

impl NotificationSink for RecordingSink {
    fn loading(&self, message: &str, key: &str) {
        self.calls.lock().unwrap().push(("loading", message.into(), key.into()));
    }

    fn success(&self, message: &str, key: &str) {
        self.calls.lock().unwrap().push(("success", message.into(), key.into()));
    }

    fn error(&self, message: &str, key: &str) {
        self.calls.lock().unwrap().push(("error", message.into(), key.into()));
    }
}

/// Observer keeping every transition event.
#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<TransitionEvent>>,
}

impl EventLog {
    pub fn events(&self) -> Vec<TransitionEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn for_operation(&self, operation: &str) -> Vec<TransitionEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.operation == operation)
            .collect()
    }
}

impl TransitionObserver for EventLog {
    fn on_transition(&self, event: &TransitionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub struct Harness {
    pub gateway: Arc<FakeGateway>,
    pub notifications: Arc<NotificationObserver<RecordingSink>>,
    pub events: Arc<EventLog>,
    pub env: OperationEnv,
}

pub fn harness(gateway: Arc<FakeGateway>) -> Harness {
    let resolver = AddressResolver::from_networks(&[network()]).unwrap();
    let notifications = Arc::new(NotificationObserver::new(RecordingSink::default()));
    let events = Arc::new(EventLog::default());
    let env = OperationEnv::new(gateway.clone(), Arc::new(resolver))
        .with_observer(notifications.clone())
        .with_observer(events.clone());
    Harness {
        gateway,
        notifications,
        events,
        env,
    }
}

/// Bound a wait so a broken lifecycle fails the test instead of hanging it.
pub async fn settle<T>(future: impl std::future::Future<Output = OperationState<T>>) -> OperationState<T> {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("operation did not reach a terminal phase")
}

pub fn log(address: Address, data: alloy::primitives::LogData) -> Log {
    Log { address, data }
}
