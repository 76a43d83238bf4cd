//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Config ([chain], [[networks]]) + MARKET_PRIVATE_KEY
//!     → wallet.rs (key loading)
//!     → client.rs (RpcGateway: submit, receipt watch, eth_call)
//!     → addresses.rs (per-chain contract table)
//!     → contracts.rs (sol! bindings used to encode calls / decode logs)
//! ```
//!
//! Operations only ever see the [`ChainGateway`] trait from gateway.rs.
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod addresses;
pub mod client;
pub mod contracts;
pub mod gateway;
pub mod types;
pub mod wallet;

pub use addresses::{AddressError, AddressResolver, ContractName};
pub use client::RpcGateway;
pub use gateway::ChainGateway;
pub use types::{
    AmbientContext, BlockchainError, BlockchainResult, CallRequest, ChainId, ReceiptOutcome,
};
pub use wallet::Wallet;
