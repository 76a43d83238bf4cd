//! Error taxonomy for transaction operations.

use serde::Serialize;
use thiserror::Error;

/// Closed set of failure categories surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotConnected,
    UnsupportedChain,
    InvalidParams,
    AlreadyInProgress,
    UserRejected,
    InsufficientFunds,
    ContractRejected,
    ConfirmationFailed,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotConnected => "not_connected",
            ErrorKind::UnsupportedChain => "unsupported_chain",
            ErrorKind::InvalidParams => "invalid_params",
            ErrorKind::AlreadyInProgress => "already_in_progress",
            ErrorKind::UserRejected => "user_rejected",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::ContractRejected => "contract_rejected",
            ErrorKind::ConfirmationFailed => "confirmation_failed",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business rule a contract revert was matched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevertReason {
    NotOwner,
    NotSeller,
    NotApproved,
    DuplicateListing,
    InactiveListing,
    InsufficientPayment,
    BidTooLow,
    NoActiveBid,
    OwnListing,
    RoyaltyOutOfRange,
    MaxSupplyReached,
    NonexistentToken,
}

/// A failed attempt, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct OperationError {
    /// Failure category.
    pub kind: ErrorKind,
    /// Human readable message; never empty.
    pub message: String,
    /// Matched business rule for contract rejections.
    pub reason: Option<RevertReason>,
}

impl OperationError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            reason: None,
        }
    }

    pub fn rejected(reason: RevertReason, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::ContractRejected,
            message: message.into(),
            reason: Some(reason),
        }
    }

    pub fn not_connected() -> Self {
        Self::new(ErrorKind::NotConnected, "Connect a wallet to continue")
    }

    pub fn unsupported_chain(chain: Option<u64>) -> Self {
        let message = match chain {
            Some(id) => format!("Chain {} is not supported; switch to a supported network", id),
            None => "The connected network could not be determined".to_string(),
        };
        Self::new(ErrorKind::UnsupportedChain, message)
    }

    pub fn already_in_progress(operation: &str) -> Self {
        Self::new(
            ErrorKind::AlreadyInProgress,
            format!("A {} transaction is already in progress", operation),
        )
    }
}

/// Parameter validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} '{value}' is not a valid address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must not be the zero address")]
    ZeroAddress(&'static str),

    #[error("{field} '{value}' is not a whole number")]
    NotNumeric { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("{field} must be at most {max}")]
    OutOfRange { field: &'static str, max: u64 },
}

impl From<ParamError> for OperationError {
    fn from(err: ParamError) -> Self {
        OperationError::new(ErrorKind::InvalidParams, err.to_string())
    }
}
