//! Static contract address table, keyed by chain.
//!
//! Built once from configuration and only read afterwards.

use std::collections::HashMap;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::types::ChainId;
use crate::config::NetworkConfig;

/// Contracts the marketplace operations talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractName {
    Marketplace,
    Nft,
    CollectionFactory,
}

impl ContractName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractName::Marketplace => "marketplace",
            ContractName::Nft => "nft",
            ContractName::CollectionFactory => "collection_factory",
        }
    }
}

/// Address lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("chain {0} is not supported")]
    UnsupportedChain(ChainId),

    #[error("invalid {contract} address '{value}' for chain {chain_id}")]
    InvalidAddress {
        chain_id: u64,
        contract: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChainContracts {
    marketplace: Address,
    nft: Address,
    collection_factory: Address,
}

/// Per-chain contract address table.
#[derive(Debug, Clone, Default)]
pub struct AddressResolver {
    chains: HashMap<ChainId, ChainContracts>,
}

impl AddressResolver {
    /// Build the table from network entries.
    pub fn from_networks(networks: &[NetworkConfig]) -> Result<Self, AddressError> {
        let mut resolver = Self::default();
        for network in networks {
            let parse = |contract: ContractName, value: &str| {
                value.parse::<Address>().map_err(|_| AddressError::InvalidAddress {
                    chain_id: network.chain_id,
                    contract: contract.as_str(),
                    value: value.to_string(),
                })
            };

            resolver.insert(
                ChainId(network.chain_id),
                parse(ContractName::Marketplace, &network.marketplace)?,
                parse(ContractName::Nft, &network.nft)?,
                parse(ContractName::CollectionFactory, &network.collection_factory)?,
            );
        }
        Ok(resolver)
    }

    /// Register (or replace) the contracts of one chain.
    pub fn insert(
        &mut self,
        chain_id: ChainId,
        marketplace: Address,
        nft: Address,
        collection_factory: Address,
    ) {
        self.chains.insert(
            chain_id,
            ChainContracts {
                marketplace,
                nft,
                collection_factory,
            },
        );
    }

    /// Whether `chain_id` has an address table.
    pub fn is_supported(&self, chain_id: ChainId) -> bool {
        self.chains.contains_key(&chain_id)
    }

    /// Supported chains in ascending order.
    pub fn supported_chains(&self) -> Vec<ChainId> {
        let mut chains: Vec<_> = self.chains.keys().copied().collect();
        chains.sort();
        chains
    }

    /// Look up a contract address. Unknown chains are an error, never a default.
    pub fn resolve(&self, chain_id: ChainId, contract: ContractName) -> Result<Address, AddressError> {
        let contracts = self
            .chains
            .get(&chain_id)
            .ok_or(AddressError::UnsupportedChain(chain_id))?;

        Ok(match contract {
            ContractName::Marketplace => contracts.marketplace,
            ContractName::Nft => contracts.nft,
            ContractName::CollectionFactory => contracts.collection_factory,
        })
    }
}
