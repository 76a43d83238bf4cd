use alloy::primitives::U256;
use alloy::sol_types::SolCall;

use crate::blockchain::contracts::IMarketplace;
use crate::blockchain::{CallRequest, ContractName};
use crate::operations::classifier::{
    RevertRule, INACTIVE_LISTING, INSUFFICIENT_PAYMENT, OWN_LISTING,
};
use crate::operations::error::{OperationError, ParamError};
use crate::operations::lifecycle::{CallContext, OperationKind};
use crate::operations::params::{check_listing_id, parse_wei};

/// Buy a listing, paying its price in native currency.
#[derive(Debug, Clone, Copy)]
pub struct Buy;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuyParams {
    pub listing_id: u64,
    pub price_wei: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyCall {
    pub listing_id: U256,
    pub price: U256,
}

impl OperationKind for Buy {
    type Params = BuyParams;
    type Call = BuyCall;
    type Output = ();

    const NAME: &'static str = "buy";
    const REVERT_RULES: &'static [RevertRule] =
        &[OWN_LISTING, INACTIVE_LISTING, INSUFFICIENT_PAYMENT];

    fn validate(params: &BuyParams) -> Result<BuyCall, ParamError> {
        Ok(BuyCall {
            listing_id: check_listing_id(params.listing_id)?,
            price: parse_wei("price", &params.price_wei)?,
        })
    }

    fn encode(call: &BuyCall, ctx: &CallContext<'_>) -> Result<CallRequest, OperationError> {
        Ok(CallRequest {
            to: ctx.resolve(ContractName::Marketplace)?,
            data: IMarketplace::buyItemCall {
                listingId: call.listing_id,
            }
            .abi_encode()
            .into(),
            value: call.price,
        })
    }

    fn success_message(call: &BuyCall) -> String {
        format!("Purchased listing #{}", call.listing_id)
    }
}
