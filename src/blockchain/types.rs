//! Chain-specific types and error definitions.

use alloy::primitives::{Address, Bytes, Log, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of the wallet-provider state an operation runs against.
///
/// Owned by the wallet provider; operations only read it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmbientContext {
    /// Connected account, if any.
    pub account: Option<Address>,
    /// Chain the wallet is connected to, if known.
    pub chain_id: Option<ChainId>,
}

impl AmbientContext {
    pub fn connected(account: Address, chain_id: ChainId) -> Self {
        Self {
            account: Some(account),
            chain_id: Some(chain_id),
        }
    }
}

/// A fully encoded contract call ready for the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    /// Target contract.
    pub to: Address,
    /// Function selector followed by ABI-encoded arguments.
    pub data: Bytes,
    /// Native currency attached, in wei.
    pub value: U256,
}

/// Final state of a watched transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptOutcome {
    /// Whether the transaction executed successfully.
    pub status: bool,
    /// Block the transaction was included in.
    pub block_number: Option<u64>,
    /// Logs emitted by the transaction.
    pub logs: Vec<Log>,
}

impl ReceiptOutcome {
    pub fn success(logs: Vec<Log>) -> Self {
        Self {
            status: true,
            block_number: None,
            logs,
        }
    }

    pub fn reverted() -> Self {
        Self {
            status: false,
            block_number: None,
            logs: Vec::new(),
        }
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Clone, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The wallet or node refused to accept the transaction.
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    /// Transaction was reverted on-chain.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// Invalid private key format or signing error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Contract return data could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Blockchain client not initialized or disabled.
    #[error("Blockchain not available: {0}")]
    NotAvailable(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;
