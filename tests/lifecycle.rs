//! Lifecycle machine behaviour against a fake chain.

use alloy::primitives::U256;
use alloy::sol_types::SolCall;

use marketplace_tx::blockchain::contracts::IMarketplace;
use marketplace_tx::blockchain::{AmbientContext, BlockchainError, ChainId, ReceiptOutcome};
use marketplace_tx::operations::kinds::{Buy, BuyParams};
use marketplace_tx::operations::{ErrorKind, Phase, RevertReason, TransactionOperation};

mod common;
use common::{account, harness, marketplace, settle, FakeGateway};

fn buy(listing_id: u64, price: &str) -> BuyParams {
    BuyParams {
        listing_id,
        price_wei: price.to_string(),
    }
}

#[tokio::test]
async fn test_guard_ordering() {
    // Not connected and on an unknown chain: connectivity wins.
    let h = harness(FakeGateway::with_ambient(
        AmbientContext {
            account: None,
            chain_id: Some(ChainId(1)),
        },
        false,
    ));
    let op = TransactionOperation::<Buy>::new(h.env.clone());
    let outcome = op.execute(buy(0, "")).await;
    assert_eq!(outcome.error_kind(), Some(ErrorKind::NotConnected));

    // Connected, unknown chain and bad params: chain support wins.
    let h = harness(FakeGateway::with_ambient(
        AmbientContext::connected(account(), ChainId(1)),
        false,
    ));
    let op = TransactionOperation::<Buy>::new(h.env.clone());
    let outcome = op.execute(buy(0, "")).await;
    assert_eq!(outcome.error_kind(), Some(ErrorKind::UnsupportedChain));

    // Connected to a supported chain: params are checked.
    let h = harness(FakeGateway::connected());
    let op = TransactionOperation::<Buy>::new(h.env.clone());
    let outcome = op.execute(buy(0, "")).await;
    assert_eq!(outcome.error_kind(), Some(ErrorKind::InvalidParams));

    assert!(h.gateway.submissions().is_empty());
}

#[tokio::test]
async fn test_guard_failure_is_rendered_as_failed_attempt() {
    let h = harness(FakeGateway::with_ambient(AmbientContext::default(), false));
    let op = TransactionOperation::<Buy>::new(h.env.clone());

    let outcome = op.execute(buy(1, "100")).await;
    assert!(!outcome.success);
    assert!(outcome.transaction_hash.is_none());

    let state = op.snapshot();
    assert_eq!(state.phase(), Phase::Failed);
    assert_eq!(state.attempt(), 1);
    assert_eq!(state.error().map(|e| e.kind), Some(ErrorKind::NotConnected));
    assert_eq!(h.notifications.sink().count("error"), 1);
}

#[tokio::test]
async fn test_successful_buy() {
    let h = harness(FakeGateway::connected());
    let op = TransactionOperation::<Buy>::new(h.env.clone());

    let outcome = op.execute(buy(7, "1000000000000000000")).await;
    assert!(outcome.success);
    let hash = outcome.transaction_hash.unwrap();

    let state = settle(op.wait_for_terminal()).await;
    assert_eq!(state.phase(), Phase::Confirmed);
    assert_eq!(state.transaction_hash(), Some(hash));
    assert!(state.error().is_none());

    let submissions = h.gateway.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].to, marketplace());
    assert_eq!(submissions[0].value, U256::from(1_000_000_000_000_000_000u128));
    let call = IMarketplace::buyItemCall::abi_decode(&submissions[0].data).unwrap();
    assert_eq!(call.listingId, U256::from(7));

    let sink = h.notifications.sink();
    assert_eq!(sink.count("success"), 1);
    assert_eq!(sink.count("error"), 0);
    assert!(sink.calls().iter().all(|(_, _, key)| key == "buy"));
}

#[tokio::test]
async fn test_zero_price_rejected_without_submission() {
    let h = harness(FakeGateway::connected());
    let op = TransactionOperation::<Buy>::new(h.env.clone());

    let outcome = op.execute(buy(7, "0")).await;
    assert!(!outcome.success);
    assert_eq!(outcome.error_kind(), Some(ErrorKind::InvalidParams));
    assert!(h.gateway.submissions().is_empty());
}

#[tokio::test]
async fn test_unsupported_chain_scenario() {
    let h = harness(FakeGateway::with_ambient(
        AmbientContext::connected(account(), ChainId(137)),
        false,
    ));
    let op = TransactionOperation::<Buy>::new(h.env.clone());

    let outcome = op.execute(buy(7, "100")).await;
    assert_eq!(outcome.error_kind(), Some(ErrorKind::UnsupportedChain));
    assert!(h.gateway.submissions().is_empty());
    assert!(h.gateway.hashes().is_empty());
}

#[tokio::test]
async fn test_reentrancy_rejected_while_pending() {
    let h = harness(FakeGateway::gated());
    let op = TransactionOperation::<Buy>::new(h.env.clone());

    let first = op.execute(buy(7, "100")).await;
    assert!(first.success);
    assert!(op.snapshot().is_pending());
    assert!(!op.snapshot().can_execute());

    let second = op.execute(buy(7, "100")).await;
    assert!(!second.success);
    assert_eq!(second.error_kind(), Some(ErrorKind::AlreadyInProgress));

    // A guard failure while active is reported but leaves the attempt alone.
    let invalid = op.execute(buy(7, "0")).await;
    assert_eq!(invalid.error_kind(), Some(ErrorKind::InvalidParams));

    let state = op.snapshot();
    assert_eq!(state.phase(), Phase::PendingConfirmation);
    assert_eq!(state.attempt(), 1);
    assert_eq!(state.transaction_hash(), first.transaction_hash);
    assert_eq!(h.gateway.submissions().len(), 1);

    h.gateway.release(1);
    let state = settle(op.wait_for_terminal()).await;
    assert_eq!(state.phase(), Phase::Confirmed);
}

#[tokio::test]
async fn test_phases_only_move_forward() {
    let h = harness(FakeGateway::connected());
    let op = TransactionOperation::<Buy>::new(h.env.clone());

    op.execute(buy(7, "100")).await;
    settle(op.wait_for_terminal()).await;

    let transitions: Vec<(Phase, Phase)> = h
        .events
        .for_operation("buy")
        .iter()
        .map(|e| (e.from, e.to))
        .collect();
    assert_eq!(
        transitions,
        vec![
            (Phase::Idle, Phase::Validating),
            (Phase::Validating, Phase::Submitting),
            (Phase::Submitting, Phase::PendingConfirmation),
            (Phase::PendingConfirmation, Phase::Confirmed),
        ]
    );
}

#[tokio::test]
async fn test_reset_round_trip() {
    let h = harness(FakeGateway::gated());
    let op = TransactionOperation::<Buy>::new(h.env.clone());

    assert!(op.reset());
    assert_eq!(op.snapshot().phase(), Phase::Idle);

    op.execute(buy(7, "100")).await;
    assert!(!op.reset(), "reset must be refused while pending");
    assert!(op.snapshot().is_pending());

    h.gateway.release(1);
    settle(op.wait_for_terminal()).await;

    assert!(op.reset());
    let state = op.snapshot();
    assert_eq!(state.phase(), Phase::Idle);
    assert!(state.transaction_hash().is_none());
    assert!(state.error().is_none());
    assert!(state.result_value().is_none());
    assert!(op.reset());

    h.gateway.release(1);
    let outcome = op.execute_and_confirm(buy(7, "100")).await;
    assert!(outcome.success);
    assert_eq!(op.snapshot().attempt(), 2);
    assert_eq!(h.gateway.hashes().len(), 2);
}

#[tokio::test]
async fn test_wallet_rejection() {
    let h = harness(FakeGateway::connected());
    h.gateway.script_submit(Some(BlockchainError::Rejected(
        "error code 4001: User rejected the request.".into(),
    )));
    let op = TransactionOperation::<Buy>::new(h.env.clone());

    let outcome = op.execute(buy(7, "100")).await;
    assert_eq!(outcome.error_kind(), Some(ErrorKind::UserRejected));
    assert!(outcome.transaction_hash.is_none());

    let state = op.snapshot();
    assert!(state.is_failed());
    assert!(state.transaction_hash().is_none());
    assert_eq!(h.notifications.sink().count("error"), 1);
}

#[tokio::test]
async fn test_insufficient_funds() {
    let h = harness(FakeGateway::connected());
    h.gateway.script_submit(Some(BlockchainError::Rejected(
        "insufficient funds for gas * price + value".into(),
    )));
    let op = TransactionOperation::<Buy>::new(h.env.clone());

    let outcome = op.execute(buy(7, "100")).await;
    assert_eq!(outcome.error_kind(), Some(ErrorKind::InsufficientFunds));
}

#[tokio::test]
async fn test_revert_reason_at_submission() {
    let h = harness(FakeGateway::connected());
    h.gateway.script_submit(Some(BlockchainError::Rejected(
        "execution reverted: Insufficient payment".into(),
    )));
    let op = TransactionOperation::<Buy>::new(h.env.clone());

    let outcome = op.execute(buy(7, "1")).await;
    let error = outcome.error.unwrap();
    assert_eq!(error.kind, ErrorKind::ContractRejected);
    assert_eq!(error.reason, Some(RevertReason::InsufficientPayment));
}

#[tokio::test]
async fn test_reverted_receipt() {
    let h = harness(FakeGateway::connected());
    h.gateway.script_receipt(Ok(ReceiptOutcome::reverted()));
    let op = TransactionOperation::<Buy>::new(h.env.clone());

    let outcome = op.execute_and_confirm(buy(7, "100")).await;
    assert!(!outcome.success);
    assert!(outcome.transaction_hash.is_some());
    let error = outcome.error.unwrap();
    assert_eq!(error.kind, ErrorKind::ContractRejected);
    assert_eq!(error.reason, None);
    assert_eq!(error.message, "Transaction failed");
    assert_eq!(h.notifications.sink().count("error"), 1);
    assert_eq!(h.notifications.sink().count("success"), 0);
}

#[tokio::test]
async fn test_mined_revert_without_reason() {
    let h = harness(FakeGateway::connected());
    h.gateway
        .script_receipt(Err(BlockchainError::Reverted("execution reverted".into())));
    let op = TransactionOperation::<Buy>::new(h.env.clone());

    let outcome = op.execute_and_confirm(buy(7, "100")).await;
    assert!(outcome.transaction_hash.is_some());
    let error = outcome.error.unwrap();
    assert_eq!(error.kind, ErrorKind::ContractRejected);
    assert_eq!(error.reason, None);
    assert_eq!(error.message, "Transaction failed");
    assert!(op.snapshot().is_failed());
}

#[tokio::test]
async fn test_receipt_error_classified_with_revert_table() {
    let h = harness(FakeGateway::connected());
    h.gateway.script_receipt(Err(BlockchainError::Reverted(
        "execution reverted: Listing inactive".into(),
    )));
    let op = TransactionOperation::<Buy>::new(h.env.clone());

    let outcome = op.execute_and_confirm(buy(7, "100")).await;
    let error = outcome.error.unwrap();
    assert_eq!(error.kind, ErrorKind::ContractRejected);
    assert_eq!(error.reason, Some(RevertReason::InactiveListing));
}

#[tokio::test]
async fn test_receipt_watch_gives_up() {
    let h = harness(FakeGateway::connected());
    h.gateway
        .script_receipt(Err(BlockchainError::Rpc("connection reset".into())));
    let op = TransactionOperation::<Buy>::new(h.env.clone());

    let outcome = op.execute_and_confirm(buy(7, "100")).await;
    let error = outcome.error.unwrap();
    assert_eq!(error.kind, ErrorKind::ConfirmationFailed);
    assert!(error.message.contains("connection reset"));
}

#[tokio::test]
async fn test_independent_operations_interleave() {
    let h = harness(FakeGateway::gated());
    let first = TransactionOperation::<Buy>::new(h.env.clone());
    let second = TransactionOperation::<Buy>::new(h.env.clone());

    assert!(first.execute(buy(1, "100")).await.success);
    assert!(second.execute(buy(2, "100")).await.success);
    assert_eq!(h.gateway.hashes().len(), 2);

    h.gateway.release(2);
    assert!(settle(first.wait_for_terminal()).await.is_success());
    assert!(settle(second.wait_for_terminal()).await.is_success());
    assert_ne!(first.snapshot().transaction_hash(), second.snapshot().transaction_hash());
}

#[tokio::test]
async fn test_subscribe_sees_pending_then_confirmed() {
    let h = harness(FakeGateway::gated());
    let op = TransactionOperation::<Buy>::new(h.env.clone());
    let mut rx = op.subscribe();

    op.execute(buy(7, "100")).await;
    assert!(rx.borrow_and_update().is_pending());

    h.gateway.release(1);
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow().phase(), Phase::Confirmed);
    assert_eq!(rx.borrow().error(), None);
}
