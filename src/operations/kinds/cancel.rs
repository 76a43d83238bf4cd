use alloy::primitives::U256;
use alloy::sol_types::SolCall;

use crate::blockchain::contracts::IMarketplace;
use crate::blockchain::{CallRequest, ContractName};
use crate::operations::classifier::{RevertRule, INACTIVE_LISTING, NOT_SELLER};
use crate::operations::error::{OperationError, ParamError};
use crate::operations::lifecycle::{CallContext, OperationKind};
use crate::operations::params::check_listing_id;

/// Withdraw one of the caller's listings.
#[derive(Debug, Clone, Copy)]
pub struct CancelListing;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CancelParams {
    pub listing_id: u64,
}

impl OperationKind for CancelListing {
    type Params = CancelParams;
    type Call = U256;
    type Output = ();

    const NAME: &'static str = "cancel";
    const REVERT_RULES: &'static [RevertRule] = &[NOT_SELLER, INACTIVE_LISTING];

    fn validate(params: &CancelParams) -> Result<U256, ParamError> {
        check_listing_id(params.listing_id)
    }

    fn encode(listing_id: &U256, ctx: &CallContext<'_>) -> Result<CallRequest, OperationError> {
        Ok(CallRequest {
            to: ctx.resolve(ContractName::Marketplace)?,
            data: IMarketplace::cancelListingCall {
                listingId: *listing_id,
            }
            .abi_encode()
            .into(),
            value: U256::ZERO,
        })
    }

    fn success_message(listing_id: &U256) -> String {
        format!("Listing #{} cancelled", listing_id)
    }
}
