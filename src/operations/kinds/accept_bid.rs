use alloy::primitives::U256;
use alloy::sol_types::SolCall;

use crate::blockchain::contracts::IMarketplace;
use crate::blockchain::{CallRequest, ContractName};
use crate::operations::classifier::{RevertRule, INACTIVE_LISTING, NOT_SELLER, NO_ACTIVE_BID};
use crate::operations::error::{OperationError, ParamError};
use crate::operations::lifecycle::{CallContext, OperationKind};
use crate::operations::params::check_listing_id;

/// Accept the highest bid on one of the caller's listings.
#[derive(Debug, Clone, Copy)]
pub struct AcceptBid;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AcceptBidParams {
    pub listing_id: u64,
}

impl OperationKind for AcceptBid {
    type Params = AcceptBidParams;
    type Call = U256;
    type Output = ();

    const NAME: &'static str = "accept_bid";
    const REVERT_RULES: &'static [RevertRule] = &[NOT_SELLER, NO_ACTIVE_BID, INACTIVE_LISTING];

    fn validate(params: &AcceptBidParams) -> Result<U256, ParamError> {
        check_listing_id(params.listing_id)
    }

    fn encode(listing_id: &U256, ctx: &CallContext<'_>) -> Result<CallRequest, OperationError> {
        Ok(CallRequest {
            to: ctx.resolve(ContractName::Marketplace)?,
            data: IMarketplace::acceptBidCall {
                listingId: *listing_id,
            }
            .abi_encode()
            .into(),
            value: U256::ZERO,
        })
    }

    fn success_message(listing_id: &U256) -> String {
        format!("Bid accepted on listing #{}", listing_id)
    }
}
