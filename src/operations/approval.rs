//! On-chain approval lookups.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::sol_types::{SolCall, SolValue};

use crate::blockchain::contracts::IERC721;
use crate::blockchain::{BlockchainError, BlockchainResult, ChainGateway};

/// Approval state of one token for one spender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalRecord {
    pub nft_contract: Address,
    pub token_id: U256,
    pub spender: Address,
    /// Address returned by `getApproved`.
    pub approved: Address,
    /// Whether `owner` granted the spender operator rights.
    pub operator: bool,
}

impl ApprovalRecord {
    pub fn is_approved(&self) -> bool {
        self.approved == self.spender || self.operator
    }
}

/// Reads ERC-721 approvals through the gateway.
#[derive(Clone)]
pub struct ApprovalChecker {
    gateway: Arc<dyn ChainGateway>,
}

impl ApprovalChecker {
    pub fn new(gateway: Arc<dyn ChainGateway>) -> Self {
        Self { gateway }
    }

    /// Look up whether `spender` may transfer `token_id`.
    ///
    /// Operator approval is only consulted when `owner` is known and the
    /// per-token approval does not match.
    pub async fn check(
        &self,
        nft_contract: Address,
        token_id: U256,
        spender: Address,
        owner: Option<Address>,
    ) -> BlockchainResult<ApprovalRecord> {
        let data = IERC721::getApprovedCall { tokenId: token_id }.abi_encode();
        let raw = self.gateway.read_contract(nft_contract, data.into()).await?;
        let approved = Address::abi_decode(&raw)
            .map_err(|e| BlockchainError::Decode(format!("getApproved: {}", e)))?;

        let mut record = ApprovalRecord {
            nft_contract,
            token_id,
            spender,
            approved,
            operator: false,
        };
        if record.is_approved() {
            return Ok(record);
        }

        if let Some(owner) = owner {
            let data = IERC721::isApprovedForAllCall {
                owner,
                operator: spender,
            }
            .abi_encode();
            let raw = self.gateway.read_contract(nft_contract, data.into()).await?;
            record.operator = bool::abi_decode(&raw)
                .map_err(|e| BlockchainError::Decode(format!("isApprovedForAll: {}", e)))?;
        }

        tracing::debug!(
            nft = %nft_contract,
            token_id = %token_id,
            spender = %spender,
            approved = record.is_approved(),
            "Checked approval"
        );
        Ok(record)
    }
}
