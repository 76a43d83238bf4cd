//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the marketplace
//! transaction client. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the marketplace client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MarketConfig {
    /// RPC connection and confirmation settings.
    pub chain: ChainConfig,

    /// Supported networks and their contract address tables.
    pub networks: Vec<NetworkConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            networks: vec![NetworkConfig::anvil()],
            observability: ObservabilityConfig::default(),
        }
    }
}

/// RPC connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Chain ID the node is expected to serve (e.g., 1 for mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,

    /// Number of block confirmations required before a receipt counts as final.
    pub confirmation_blocks: u32,

    /// Consecutive RPC errors tolerated while watching a receipt.
    pub max_receipt_errors: u32,

    /// Base delay for receipt polling backoff in milliseconds.
    pub backoff_base_ms: u64,

    /// Maximum delay for receipt polling backoff in milliseconds.
    pub backoff_max_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 31337,
            rpc_timeout_secs: 10,
            poll_interval_ms: 2000,
            confirmation_blocks: 1,
            max_receipt_errors: 5,
            backoff_base_ms: 250,
            backoff_max_ms: 8000,
        }
    }
}

/// Contract address table for one supported chain.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Chain ID this table applies to.
    pub chain_id: u64,

    /// Human readable network name for logging.
    #[serde(default)]
    pub name: String,

    /// Marketplace contract (listings, sales, bids).
    pub marketplace: String,

    /// Default NFT collection contract.
    pub nft: String,

    /// Factory deploying creator collections.
    pub collection_factory: String,
}

impl NetworkConfig {
    /// Deterministic addresses of the first three contracts deployed by Anvil's account #0.
    pub fn anvil() -> Self {
        Self {
            chain_id: 31337,
            name: "anvil".to_string(),
            marketplace: "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string(),
            nft: "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512".to_string(),
            collection_factory: "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
