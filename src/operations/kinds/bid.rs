use alloy::primitives::U256;
use alloy::sol_types::SolCall;

use crate::blockchain::contracts::IMarketplace;
use crate::blockchain::{CallRequest, ContractName};
use crate::operations::classifier::{RevertRule, BID_TOO_LOW, INACTIVE_LISTING, OWN_LISTING};
use crate::operations::error::{OperationError, ParamError};
use crate::operations::lifecycle::{CallContext, OperationKind};
use crate::operations::params::{check_listing_id, parse_wei};

/// Place a bid on a listing; the amount is escrowed with the call.
#[derive(Debug, Clone, Copy)]
pub struct Bid;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BidParams {
    pub listing_id: u64,
    pub amount_wei: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidCall {
    pub listing_id: U256,
    pub amount: U256,
}

impl OperationKind for Bid {
    type Params = BidParams;
    type Call = BidCall;
    type Output = ();

    const NAME: &'static str = "bid";
    const REVERT_RULES: &'static [RevertRule] = &[OWN_LISTING, INACTIVE_LISTING, BID_TOO_LOW];

    fn validate(params: &BidParams) -> Result<BidCall, ParamError> {
        Ok(BidCall {
            listing_id: check_listing_id(params.listing_id)?,
            amount: parse_wei("amount", &params.amount_wei)?,
        })
    }

    fn encode(call: &BidCall, ctx: &CallContext<'_>) -> Result<CallRequest, OperationError> {
        Ok(CallRequest {
            to: ctx.resolve(ContractName::Marketplace)?,
            data: IMarketplace::placeBidCall {
                listingId: call.listing_id,
            }
            .abi_encode()
            .into(),
            value: call.amount,
        })
    }

    fn success_message(call: &BidCall) -> String {
        format!("Bid of {} wei placed on listing #{}", call.amount, call.listing_id)
    }
}
