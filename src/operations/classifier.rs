//! Maps raw wallet, node and contract failures onto [`ErrorKind`].
//!
//! Matching is ordered and case-insensitive; the first rule whose pattern is a
//! substring of the raw message wins. Wallet-level rules come first, then the
//! operation's revert table, then the generic revert fallback.

use crate::operations::error::{ErrorKind, OperationError, RevertReason};

/// Where in the lifecycle the failure surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Wallet prompt or provider submission.
    Submission,
    /// Receipt watch, after a hash exists.
    Confirmation,
    /// Mined, but execution reverted.
    Execution,
}

/// A known revert signature and the message shown for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevertRule {
    pub patterns: &'static [&'static str],
    pub reason: RevertReason,
    pub message: &'static str,
}

impl RevertRule {
    fn matches(&self, haystack: &str) -> bool {
        self.patterns.iter().any(|p| haystack.contains(p))
    }
}

const USER_REJECTED: &[&str] = &[
    "user rejected",
    "user denied",
    "rejected the request",
    "request rejected",
    "action_rejected",
    "code: 4001",
];

const INSUFFICIENT_FUNDS: &[&str] = &["insufficient funds", "insufficient balance for transfer"];

const GENERIC_REVERT: &[&str] = &["execution reverted", "reverted", "revert"];

pub const NOT_OWNER: RevertRule = RevertRule {
    patterns: &["not the owner", "not owner", "caller is not token owner", "incorrect owner"],
    reason: RevertReason::NotOwner,
    message: "You do not own this token",
};

pub const NOT_APPROVED: RevertRule = RevertRule {
    patterns: &["not approved", "caller is not token owner or approved", "insufficient approval"],
    reason: RevertReason::NotApproved,
    message: "The marketplace is not approved to transfer this token",
};

pub const NONEXISTENT_TOKEN: RevertRule = RevertRule {
    patterns: &["nonexistent token", "invalid token id", "erc721nonexistenttoken"],
    reason: RevertReason::NonexistentToken,
    message: "This token does not exist",
};

pub const NOT_SELLER: RevertRule = RevertRule {
    patterns: &["not the seller", "not seller", "only seller"],
    reason: RevertReason::NotSeller,
    message: "Only the seller can manage this listing",
};

pub const DUPLICATE_LISTING: RevertRule = RevertRule {
    patterns: &["already listed", "listing exists", "duplicate listing"],
    reason: RevertReason::DuplicateListing,
    message: "This token is already listed",
};

pub const INACTIVE_LISTING: RevertRule = RevertRule {
    patterns: &["listing inactive", "listing not active", "not listed", "listing does not exist"],
    reason: RevertReason::InactiveListing,
    message: "This listing is no longer active",
};

pub const INSUFFICIENT_PAYMENT: RevertRule = RevertRule {
    patterns: &["insufficient payment", "incorrect price", "price not met", "wrong value"],
    reason: RevertReason::InsufficientPayment,
    message: "The payment does not match the listing price",
};

pub const BID_TOO_LOW: RevertRule = RevertRule {
    patterns: &["bid too low", "bid must exceed", "lower than highest bid"],
    reason: RevertReason::BidTooLow,
    message: "Your bid must be higher than the current highest bid",
};

pub const NO_ACTIVE_BID: RevertRule = RevertRule {
    patterns: &["no active bid", "no bids", "no bid"],
    reason: RevertReason::NoActiveBid,
    message: "There is no bid to accept on this listing",
};

pub const OWN_LISTING: RevertRule = RevertRule {
    patterns: &["seller cannot buy", "cannot buy own", "cannot bid on own", "seller cannot bid"],
    reason: RevertReason::OwnListing,
    message: "You cannot buy or bid on your own listing",
};

pub const ROYALTY_OUT_OF_RANGE: RevertRule = RevertRule {
    patterns: &["royalty out of range", "royalty too high", "invalid royalty"],
    reason: RevertReason::RoyaltyOutOfRange,
    message: "The royalty percentage is outside the allowed range",
};

pub const MAX_SUPPLY_REACHED: RevertRule = RevertRule {
    patterns: &["max supply", "sold out", "exceeds supply"],
    reason: RevertReason::MaxSupplyReached,
    message: "This collection has reached its maximum supply",
};

/// Classify a raw failure message for an operation with the given revert table.
pub fn classify(stage: FailureStage, raw: &str, rules: &[RevertRule]) -> OperationError {
    let haystack = raw.to_lowercase();

    if stage == FailureStage::Submission {
        if USER_REJECTED.iter().any(|p| haystack.contains(p)) {
            return OperationError::new(
                ErrorKind::UserRejected,
                "The transaction was rejected in your wallet",
            );
        }
        if INSUFFICIENT_FUNDS.iter().any(|p| haystack.contains(p)) {
            return OperationError::new(
                ErrorKind::InsufficientFunds,
                "Insufficient funds to cover the price and gas",
            );
        }
    }

    if let Some(rule) = rules.iter().find(|rule| rule.matches(&haystack)) {
        return OperationError::rejected(rule.reason, rule.message);
    }

    match stage {
        FailureStage::Submission if GENERIC_REVERT.iter().any(|p| haystack.contains(p)) => {
            OperationError::new(ErrorKind::ContractRejected, "Transaction failed")
        }
        FailureStage::Submission => {
            let message = if raw.trim().is_empty() {
                "Transaction failed for an unknown reason".to_string()
            } else {
                raw.trim().to_string()
            };
            OperationError::new(ErrorKind::Unknown, message)
        }
        FailureStage::Confirmation => OperationError::new(
            ErrorKind::ConfirmationFailed,
            format!("Transaction could not be confirmed: {}", raw.trim()),
        ),
        FailureStage::Execution => {
            OperationError::new(ErrorKind::ContractRejected, "Transaction failed")
        }
    }
}
