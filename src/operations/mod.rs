//! Transaction operations: the lifecycle machine and the marketplace actions built on it.
//!
//! # Data Flow
//! ```text
//! caller params
//!     → kinds/*.rs (validate → typed call → encoded CallRequest)
//!     → lifecycle.rs (guards, OperationState phases, submit, receipt watch)
//!         → classifier.rs (raw failure → ErrorKind + message)
//!         → notify.rs (TransitionEvent → notifications, metrics)
//!     → ExecutionOutcome / watch::Receiver<OperationState>
//!
//! composite.rs: approval.rs pre-check → Approve operation → re-check → dependent operation
//! ```
//!
//! # Invariants
//! - Guards run in order: connected, supported chain, params, not already active
//! - Phases only move forward within an attempt; `reset` is the only way back to `Idle`
//! - A transaction hash is recorded at most once per attempt
//! - Every `Failed` state carries a non-empty message

pub mod approval;
pub mod classifier;
pub mod composite;
pub mod error;
pub mod kinds;
pub mod lifecycle;
pub mod notify;
pub mod params;
pub mod state;

pub use approval::{ApprovalChecker, ApprovalRecord};
pub use classifier::{classify, FailureStage, RevertRule};
pub use composite::{CompositeOperation, RequiresApproval};
pub use error::{ErrorKind, OperationError, ParamError, RevertReason};
pub use lifecycle::{CallContext, ExecutionOutcome, OperationEnv, OperationKind, TransactionOperation};
pub use notify::{
    MetricsObserver, NotificationObserver, NotificationSink, TracingSink, TransitionEvent,
    TransitionObserver,
};
pub use state::{InvalidTransition, OperationState, Phase};
