//! Generic transaction lifecycle machine.
//!
//! Every on-chain action is a [`TransactionOperation`] parameterised by an
//! [`OperationKind`]: the kind supplies validation, encoding, receipt decoding
//! and its revert table; the machine owns guards, phases and notifications.
//!
//! # Flow
//! ```text
//! execute(params)
//!     → guards: connected → supported chain → params → not already active
//!     → encode call, Submitting, gateway.submit
//!     → PendingConfirmation (hash known, execute returns)
//!     → spawned receipt watch → Confirmed | Failed
//! ```

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use alloy::primitives::{Address, TxHash};
use serde::Serialize;
use tokio::sync::watch;

use crate::blockchain::{
    AddressResolver, AmbientContext, BlockchainError, CallRequest, ChainGateway, ChainId,
    ContractName, ReceiptOutcome,
};
use crate::observability::metrics;
use crate::operations::classifier::{classify, FailureStage, RevertRule};
use crate::operations::error::{ErrorKind, OperationError, ParamError};
use crate::operations::notify::{TransitionEvent, TransitionObserver};
use crate::operations::state::{OperationState, Phase};

/// What distinguishes one on-chain action from another.
pub trait OperationKind: Send + Sync + 'static {
    /// Caller-supplied, unvalidated input.
    type Params: Clone + Debug + Send + Sync + 'static;
    /// Validated, typed form of the params.
    type Call: Clone + Debug + Send + Sync + 'static;
    /// Value decoded from a confirmed receipt.
    type Output: Clone + Debug + Send + Sync + 'static;

    /// Short name used for logs, metrics and notification keys.
    const NAME: &'static str;

    /// Known revert signatures, checked in order.
    const REVERT_RULES: &'static [RevertRule] = &[];

    fn validate(params: &Self::Params) -> Result<Self::Call, ParamError>;

    fn encode(call: &Self::Call, ctx: &CallContext<'_>) -> Result<CallRequest, OperationError>;

    /// Read the result out of a confirmed receipt. `target` is the contract the
    /// call was sent to; logs emitted by any other address are not trusted.
    fn decode(
        _call: &Self::Call,
        _target: Address,
        _receipt: &ReceiptOutcome,
    ) -> Option<Self::Output> {
        None
    }

    fn success_message(_call: &Self::Call) -> String {
        format!("{} confirmed", Self::NAME)
    }
}

/// Connected account and chain an encoder runs against.
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    pub account: Address,
    pub chain_id: ChainId,
    resolver: &'a AddressResolver,
}

impl<'a> CallContext<'a> {
    pub fn new(account: Address, chain_id: ChainId, resolver: &'a AddressResolver) -> Self {
        Self {
            account,
            chain_id,
            resolver,
        }
    }

    /// Address of a named contract on the connected chain.
    pub fn resolve(&self, contract: ContractName) -> Result<Address, OperationError> {
        self.resolver
            .resolve(self.chain_id, contract)
            .map_err(|_| OperationError::unsupported_chain(Some(self.chain_id.0)))
    }
}

/// Collaborators shared by all operations of one UI/session.
#[derive(Clone)]
pub struct OperationEnv {
    pub gateway: Arc<dyn ChainGateway>,
    pub resolver: Arc<AddressResolver>,
    observers: Vec<Arc<dyn TransitionObserver>>,
}

impl OperationEnv {
    pub fn new(gateway: Arc<dyn ChainGateway>, resolver: Arc<AddressResolver>) -> Self {
        Self {
            gateway,
            resolver,
            observers: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn TransitionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    fn notify(&self, events: &[TransitionEvent]) {
        for event in events {
            tracing::debug!(
                operation = event.operation,
                attempt = event.attempt,
                from = %event.from,
                to = %event.to,
                tx_hash = ?event.transaction_hash,
                "Phase transition"
            );
            for observer in &self.observers {
                observer.on_transition(event);
            }
        }
    }
}

/// What `execute` hands back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionOutcome<T> {
    pub success: bool,
    pub transaction_hash: Option<TxHash>,
    pub result_value: Option<T>,
    pub error: Option<OperationError>,
}

impl<T: Clone> ExecutionOutcome<T> {
    pub fn failed(error: OperationError) -> Self {
        Self {
            success: false,
            transaction_hash: None,
            result_value: None,
            error: Some(error),
        }
    }

    fn submitted(hash: TxHash) -> Self {
        Self {
            success: true,
            transaction_hash: Some(hash),
            result_value: None,
            error: None,
        }
    }

    /// Outcome as described by a (usually terminal) state snapshot.
    pub fn from_state(state: &OperationState<T>) -> Self {
        Self {
            success: state.is_success(),
            transaction_hash: state.transaction_hash(),
            result_value: state.result_value().cloned(),
            error: state.error().cloned(),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// An attempt that passed every guard and owns the state.
pub(crate) struct Prepared<K: OperationKind> {
    pub(crate) attempt: u64,
    pub(crate) account: Address,
    pub(crate) chain_id: ChainId,
    pub(crate) call: K::Call,
}

enum Change<T> {
    Advance(Phase),
    Pending(TxHash),
    Confirm(Option<T>, String),
    Fail(OperationError),
}

struct Inner<K: OperationKind> {
    env: OperationEnv,
    state: watch::Sender<OperationState<K::Output>>,
    _kind: PhantomData<K>,
}

impl<K: OperationKind> Inner<K> {
    /// Apply `change` to `attempt`, ignoring stale attempts and invalid moves.
    fn apply(&self, attempt: u64, change: Change<K::Output>) -> bool {
        let mut events = Vec::new();
        self.state.send_if_modified(|state| {
            if state.attempt() != attempt {
                tracing::warn!(operation = K::NAME, attempt, current = state.attempt(), "Dropping change for stale attempt");
                return false;
            }
            let from = state.phase();
            let (result, error, message) = match change {
                Change::Advance(next) => (state.advance(next), None, None),
                Change::Pending(hash) => (state.mark_pending(hash), None, None),
                Change::Confirm(value, message) => (state.confirm(value), None, Some(message)),
                Change::Fail(error) => {
                    let cloned = error.clone();
                    (state.fail(error), Some(cloned), None)
                }
            };
            match result {
                Ok(()) => {
                    events.push(TransitionEvent {
                        operation: K::NAME,
                        attempt,
                        from,
                        to: state.phase(),
                        transaction_hash: state.transaction_hash(),
                        error,
                        success_message: message,
                    });
                    true
                }
                Err(e) => {
                    tracing::error!(operation = K::NAME, attempt, error = %e, "Rejected lifecycle transition");
                    false
                }
            }
        });
        self.env.notify(&events);
        !events.is_empty()
    }

    /// Receipt watch for one attempt; runs to a terminal phase.
    async fn watch(self: Arc<Self>, attempt: u64, hash: TxHash, target: Address, call: K::Call) {
        let started = Instant::now();
        let change = match self.env.gateway.watch_receipt(hash).await {
            Ok(receipt) if receipt.status => {
                tracing::info!(operation = K::NAME, tx_hash = %hash, block = ?receipt.block_number, "Transaction confirmed");
                Change::Confirm(K::decode(&call, target, &receipt), K::success_message(&call))
            }
            Ok(receipt) => {
                tracing::warn!(operation = K::NAME, tx_hash = %hash, block = ?receipt.block_number, "Transaction reverted");
                Change::Fail(classify(FailureStage::Execution, "", K::REVERT_RULES))
            }
            Err(BlockchainError::Reverted(reason)) => {
                tracing::warn!(operation = K::NAME, tx_hash = %hash, reason = %reason, "Transaction reverted");
                Change::Fail(classify(FailureStage::Execution, &reason, K::REVERT_RULES))
            }
            Err(e) => {
                tracing::warn!(operation = K::NAME, tx_hash = %hash, error = %e, "Receipt watch failed");
                Change::Fail(classify(FailureStage::Confirmation, &e.to_string(), K::REVERT_RULES))
            }
        };
        metrics::record_confirmation_latency(K::NAME, started.elapsed().as_secs_f64());
        self.apply(attempt, change);
    }
}

/// One on-chain action with an observable lifecycle.
///
/// Lives as long as the UI element that owns it; `reset` allows retries
/// without recreating it.
pub struct TransactionOperation<K: OperationKind> {
    inner: Arc<Inner<K>>,
}

impl<K: OperationKind> TransactionOperation<K> {
    pub fn new(env: OperationEnv) -> Self {
        let (state, _) = watch::channel(OperationState::new());
        Self {
            inner: Arc::new(Inner {
                env,
                state,
                _kind: PhantomData,
            }),
        }
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> OperationState<K::Output> {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<OperationState<K::Output>> {
        self.inner.state.subscribe()
    }

    /// Run the guards, submit, and return once the wallet accepted the transaction.
    ///
    /// The receipt is watched in the background; use [`wait_for_terminal`] or
    /// [`subscribe`] to follow it.
    ///
    /// [`wait_for_terminal`]: Self::wait_for_terminal
    /// [`subscribe`]: Self::subscribe
    pub async fn execute(&self, params: K::Params) -> ExecutionOutcome<K::Output> {
        match self.prepare(&params) {
            Ok(prepared) => self.submit(prepared).await,
            Err(error) => ExecutionOutcome::failed(error),
        }
    }

    /// Like [`execute`](Self::execute), but resolves only once the attempt is terminal.
    pub async fn execute_and_confirm(&self, params: K::Params) -> ExecutionOutcome<K::Output> {
        let outcome = self.execute(params).await;
        if !outcome.success {
            return outcome;
        }
        let state = self.wait_for_terminal().await;
        ExecutionOutcome::from_state(&state)
    }

    /// Wait until no attempt is active and return the resulting state.
    pub async fn wait_for_terminal(&self) -> OperationState<K::Output> {
        let mut rx = self.inner.state.subscribe();
        let result = rx.wait_for(|state| !state.phase().is_active()).await;
        match result {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        }
    }

    /// Return to `Idle` from a terminal phase; a no-op when already idle.
    ///
    /// Returns `false` while an attempt is active.
    pub fn reset(&self) -> bool {
        let mut events = Vec::new();
        let mut allowed = true;
        self.inner.state.send_if_modified(|state| {
            let from = state.phase();
            match state.reset() {
                Ok(()) if from != Phase::Idle => {
                    events.push(TransitionEvent {
                        operation: K::NAME,
                        attempt: state.attempt(),
                        from,
                        to: Phase::Idle,
                        transaction_hash: None,
                        error: None,
                        success_message: None,
                    });
                    true
                }
                Ok(()) => false,
                Err(_) => {
                    allowed = false;
                    false
                }
            }
        });
        self.inner.env.notify(&events);
        allowed
    }

    /// Guards 1-3 are pure checks on the ambient context and params.
    fn check_guards(
        &self,
        ambient: &AmbientContext,
        params: &K::Params,
    ) -> Result<(Address, ChainId, K::Call), OperationError> {
        let account = ambient.account.ok_or_else(OperationError::not_connected)?;
        let chain_id = match ambient.chain_id {
            Some(chain_id) if self.inner.env.resolver.is_supported(chain_id) => chain_id,
            other => return Err(OperationError::unsupported_chain(other.map(u64::from))),
        };
        let call = K::validate(params)?;
        Ok((account, chain_id, call))
    }

    /// Run all guards and claim the state for a new attempt.
    ///
    /// A guard failure on an idle or terminal state is recorded as a failed
    /// attempt; while another attempt is active nothing is touched.
    pub(crate) fn prepare(&self, params: &K::Params) -> Result<Prepared<K>, OperationError> {
        let ambient = self.inner.env.gateway.ambient();
        let guards = self.check_guards(&ambient, params);

        let mut events = Vec::new();
        let mut claimed = None;
        self.inner.state.send_if_modified(|state| {
            let from = state.phase();
            let Ok(attempt) = state.begin_attempt() else {
                return false;
            };
            claimed = Some(attempt);
            events.push(TransitionEvent {
                operation: K::NAME,
                attempt,
                from,
                to: Phase::Validating,
                transaction_hash: None,
                error: None,
                success_message: None,
            });
            if let Err(error) = &guards {
                if state.fail(error.clone()).is_ok() {
                    events.push(TransitionEvent {
                        operation: K::NAME,
                        attempt,
                        from: Phase::Validating,
                        to: Phase::Failed,
                        transaction_hash: None,
                        error: Some(error.clone()),
                        success_message: None,
                    });
                }
            }
            true
        });
        self.inner.env.notify(&events);

        match (guards, claimed) {
            (Err(error), _) => {
                tracing::info!(operation = K::NAME, kind = %error.kind, error = %error, "Guard rejected operation");
                Err(error)
            }
            (Ok(_), None) => {
                tracing::info!(operation = K::NAME, "Operation already in progress");
                Err(OperationError::already_in_progress(K::NAME))
            }
            (Ok((account, chain_id, call)), Some(attempt)) => Ok(Prepared {
                attempt,
                account,
                chain_id,
                call,
            }),
        }
    }

    /// Park a prepared attempt while a prerequisite runs.
    pub(crate) fn await_dependency(&self, prepared: &Prepared<K>) {
        self.inner
            .apply(prepared.attempt, Change::Advance(Phase::AwaitingDependency));
    }

    /// Fail a prepared attempt before anything was submitted.
    pub(crate) fn abort(&self, prepared: Prepared<K>, error: OperationError) -> ExecutionOutcome<K::Output> {
        self.inner.apply(prepared.attempt, Change::Fail(error.clone()));
        ExecutionOutcome::failed(error)
    }

    /// Encode, submit, and start watching the receipt.
    pub(crate) async fn submit(&self, prepared: Prepared<K>) -> ExecutionOutcome<K::Output> {
        let ctx = CallContext::new(prepared.account, prepared.chain_id, &self.inner.env.resolver);
        let request = match K::encode(&prepared.call, &ctx) {
            Ok(request) => request,
            Err(error) => return self.abort(prepared, error),
        };

        self.inner
            .apply(prepared.attempt, Change::Advance(Phase::Submitting));
        tracing::info!(
            operation = K::NAME,
            attempt = prepared.attempt,
            to = %request.to,
            value = %request.value,
            "Submitting transaction"
        );

        let target = request.to;
        match self.inner.env.gateway.submit(request).await {
            Ok(hash) => {
                self.inner.apply(prepared.attempt, Change::Pending(hash));
                tracing::info!(operation = K::NAME, tx_hash = %hash, "Transaction accepted");
                let inner = Arc::clone(&self.inner);
                tokio::spawn(inner.watch(prepared.attempt, hash, target, prepared.call));
                ExecutionOutcome::submitted(hash)
            }
            Err(e) => {
                let error = classify(FailureStage::Submission, &e.to_string(), K::REVERT_RULES);
                tracing::warn!(operation = K::NAME, kind = %error.kind, raw = %e, "Submission failed");
                self.inner.apply(prepared.attempt, Change::Fail(error.clone()));
                ExecutionOutcome::failed(error)
            }
        }
    }
}
