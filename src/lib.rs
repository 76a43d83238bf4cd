//! Marketplace transaction lifecycle library.
//!
//! Drives NFT marketplace actions (approve, list, buy, bid, cancel, accept
//! bid, mint, create collection) through one observable lifecycle machine
//! against an EVM chain.

pub mod blockchain;
pub mod config;
pub mod observability;
pub mod operations;
pub mod resilience;

pub use config::schema::MarketConfig;
pub use operations::{CompositeOperation, OperationEnv, OperationState, Phase, TransactionOperation};
