//! The seam between operations and the chain.
//!
//! Everything the lifecycle machine needs from the wallet provider and the
//! JSON-RPC node goes through [`ChainGateway`], so tests can substitute a fake.

use alloy::primitives::{Address, Bytes, TxHash};
use async_trait::async_trait;

use crate::blockchain::types::{AmbientContext, BlockchainResult, CallRequest, ReceiptOutcome};

/// Wallet provider + node, as seen by transaction operations.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Currently connected account and chain.
    fn ambient(&self) -> AmbientContext;

    /// Hand a call to the wallet for signing and broadcast.
    ///
    /// Resolves once the wallet accepts it and a hash exists; the wait for the
    /// user's signature is unbounded. An `Err` means nothing was broadcast, so the
    /// call may be retried. Once a hash exists it is returned even if the node's
    /// answer to the broadcast was lost.
    async fn submit(&self, request: CallRequest) -> BlockchainResult<TxHash>;

    /// Wait for the receipt of `hash`.
    ///
    /// Long-lived; resolves when the receipt is final or the node gives up.
    /// A mined transaction whose execution reverted resolves to
    /// [`BlockchainError::Reverted`](crate::blockchain::BlockchainError::Reverted)
    /// carrying the revert reason when one can be recovered.
    async fn watch_receipt(&self, hash: TxHash) -> BlockchainResult<ReceiptOutcome>;

    /// Execute a read-only call and return the raw return data.
    async fn read_contract(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes>;
}
