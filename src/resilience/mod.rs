//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Receipt watch poll fails (RPC error / timeout):
//!     → backoff.rs (delay before the next poll, grows per consecutive failure)
//!     → after max_receipt_errors consecutive failures the watch gives up
//! ```
//!
//! # Design Decisions
//! - Every RPC call has a deadline; the receipt watch as a whole does not
//! - Jittered backoff avoids hammering a struggling node

pub mod backoff;

pub use backoff::{calculate_backoff, Backoff};
