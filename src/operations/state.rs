//! Per-operation lifecycle state.
//!
//! # State Transitions
//! ```text
//! Idle → Validating → [AwaitingDependency] → Submitting → PendingConfirmation → Confirmed
//!           │                 │                  │                 │
//!           └─────────────────┴──────────────────┴─────────────────┴──────→ Failed
//!
//! Confirmed | Failed → Idle        (reset)
//! Idle | Confirmed | Failed → Validating   (new attempt)
//! ```
//!
//! Within one attempt phases only move forward. `Submitting → Confirmed` is not
//! a transition: every confirmation passes through `PendingConfirmation`.

use alloy::primitives::TxHash;
use serde::Serialize;
use thiserror::Error;

use crate::operations::error::OperationError;

/// Lifecycle phase of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Validating,
    AwaitingDependency,
    Submitting,
    PendingConfirmation,
    Confirmed,
    Failed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Validating => "validating",
            Phase::AwaitingDependency => "awaiting_dependency",
            Phase::Submitting => "submitting",
            Phase::PendingConfirmation => "pending_confirmation",
            Phase::Confirmed => "confirmed",
            Phase::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Confirmed | Phase::Failed)
    }

    /// An attempt is running; a new one may not start.
    pub fn is_active(&self) -> bool {
        *self != Phase::Idle && !self.is_terminal()
    }

    /// Whether `next` may directly follow `self` within one attempt.
    pub fn can_transition_to(&self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, AwaitingDependency)
                | (Validating, Submitting)
                | (AwaitingDependency, Submitting)
                | (Submitting, PendingConfirmation)
                | (PendingConfirmation, Confirmed)
        ) || (self.is_active() && next == Failed)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transition the lifecycle does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition {from} → {to}")]
pub struct InvalidTransition {
    pub from: Phase,
    pub to: Phase,
}

/// Observable state of one operation instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationState<T> {
    phase: Phase,
    attempt: u64,
    transaction_hash: Option<TxHash>,
    error: Option<OperationError>,
    result_value: Option<T>,
}

impl<T> Default for OperationState<T> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            attempt: 0,
            transaction_hash: None,
            error: None,
            result_value: None,
        }
    }
}

impl<T> OperationState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Attempt counter; bumped by every new attempt.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn transaction_hash(&self) -> Option<TxHash> {
        self.transaction_hash
    }

    pub fn error(&self) -> Option<&OperationError> {
        self.error.as_ref()
    }

    pub fn result_value(&self) -> Option<&T> {
        self.result_value.as_ref()
    }

    /// Validating, waiting on a dependency, or waiting for the wallet.
    pub fn is_loading(&self) -> bool {
        matches!(
            self.phase,
            Phase::Validating | Phase::AwaitingDependency | Phase::Submitting
        )
    }

    /// Submitted and waiting for the receipt.
    pub fn is_pending(&self) -> bool {
        self.phase == Phase::PendingConfirmation
    }

    pub fn is_success(&self) -> bool {
        self.phase == Phase::Confirmed
    }

    pub fn is_failed(&self) -> bool {
        self.phase == Phase::Failed
    }

    pub fn is_processing(&self) -> bool {
        self.phase.is_active()
    }

    pub fn can_execute(&self) -> bool {
        !self.phase.is_active()
    }

    /// Start a new attempt, clearing whatever the previous one left behind.
    pub(crate) fn begin_attempt(&mut self) -> Result<u64, InvalidTransition> {
        if self.phase.is_active() {
            return Err(InvalidTransition {
                from: self.phase,
                to: Phase::Validating,
            });
        }
        self.clear();
        self.attempt += 1;
        self.phase = Phase::Validating;
        Ok(self.attempt)
    }

    pub(crate) fn advance(&mut self, next: Phase) -> Result<(), InvalidTransition> {
        if !self.phase.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Record the wallet-accepted hash. Set at most once per attempt.
    pub(crate) fn mark_pending(&mut self, hash: TxHash) -> Result<(), InvalidTransition> {
        if self.transaction_hash.is_some() {
            return Err(InvalidTransition {
                from: self.phase,
                to: Phase::PendingConfirmation,
            });
        }
        self.advance(Phase::PendingConfirmation)?;
        self.transaction_hash = Some(hash);
        Ok(())
    }

    pub(crate) fn confirm(&mut self, result_value: Option<T>) -> Result<(), InvalidTransition> {
        self.advance(Phase::Confirmed)?;
        self.result_value = result_value;
        Ok(())
    }

    pub(crate) fn fail(&mut self, error: OperationError) -> Result<(), InvalidTransition> {
        self.advance(Phase::Failed)?;
        self.error = Some(error);
        Ok(())
    }

    /// Return to `Idle` from a terminal phase. Resetting an idle state is a no-op.
    pub fn reset(&mut self) -> Result<(), InvalidTransition> {
        match self.phase {
            Phase::Idle => Ok(()),
            phase if phase.is_terminal() => {
                self.clear();
                self.phase = Phase::Idle;
                Ok(())
            }
            from => Err(InvalidTransition {
                from,
                to: Phase::Idle,
            }),
        }
    }

    fn clear(&mut self) {
        self.transaction_hash = None;
        self.error = None;
        self.result_value = None;
    }
}
