//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the address tables parse and reference distinct chains
//! - Validate value ranges (timeouts > 0, poll interval > 0)
//! - Check the configured chain is one of the supported networks
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MarketConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::schema::{MarketConfig, NetworkConfig};

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("chain.rpc_url '{url}' is not a valid URL: {reason}")]
    InvalidRpcUrl { url: String, reason: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("no networks configured")]
    NoNetworks,

    #[error("network for chain {0} is configured more than once")]
    DuplicateNetwork(u64),

    #[error("network {chain_id}: {field} '{value}' is not a valid address")]
    InvalidAddress {
        chain_id: u64,
        field: &'static str,
        value: String,
    },

    #[error("network {chain_id}: {field} must not be the zero address")]
    ZeroAddress { chain_id: u64, field: &'static str },

    #[error("chain.chain_id {0} has no entry in networks")]
    UnknownChain(u64),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &MarketConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = url::Url::parse(&config.chain.rpc_url) {
        errors.push(ValidationError::InvalidRpcUrl {
            url: config.chain.rpc_url.clone(),
            reason: e.to_string(),
        });
    }

    let ranges = [
        ("chain.chain_id", config.chain.chain_id),
        ("chain.rpc_timeout_secs", config.chain.rpc_timeout_secs),
        ("chain.poll_interval_ms", config.chain.poll_interval_ms),
        ("chain.backoff_base_ms", config.chain.backoff_base_ms),
    ];
    for (field, value) in ranges {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    if config.networks.is_empty() {
        errors.push(ValidationError::NoNetworks);
    }

    let mut seen = HashSet::new();
    for network in &config.networks {
        if network.chain_id == 0 {
            errors.push(ValidationError::Zero { field: "networks.chain_id" });
        }
        if !seen.insert(network.chain_id) {
            errors.push(ValidationError::DuplicateNetwork(network.chain_id));
        }
        validate_addresses(network, &mut errors);
    }

    if config.chain.chain_id != 0 && !seen.contains(&config.chain.chain_id) {
        errors.push(ValidationError::UnknownChain(config.chain.chain_id));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_addresses(network: &NetworkConfig, errors: &mut Vec<ValidationError>) {
    let fields = [
        ("marketplace", &network.marketplace),
        ("nft", &network.nft),
        ("collection_factory", &network.collection_factory),
    ];

    for (field, value) in fields {
        match value.parse::<Address>() {
            Ok(address) if address.is_zero() => errors.push(ValidationError::ZeroAddress {
                chain_id: network.chain_id,
                field,
            }),
            Ok(_) => {}
            Err(_) => errors.push(ValidationError::InvalidAddress {
                chain_id: network.chain_id,
                field,
                value: value.clone(),
            }),
        }
    }
}
