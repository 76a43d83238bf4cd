use alloy::primitives::{Address, U256};
use alloy::sol_types::{SolCall, SolEvent};

use crate::blockchain::contracts::IMarketplace;
use crate::blockchain::{CallRequest, ContractName, ReceiptOutcome};
use crate::operations::classifier::{
    RevertRule, DUPLICATE_LISTING, NONEXISTENT_TOKEN, NOT_APPROVED, NOT_OWNER,
};
use crate::operations::composite::RequiresApproval;
use crate::operations::error::{OperationError, ParamError};
use crate::operations::lifecycle::{CallContext, OperationKind};
use crate::operations::params::{parse_address, parse_token_id, parse_wei};

/// List an owned token on the marketplace at a fixed price.
///
/// Needs the marketplace approved for the token; run it through
/// [`CompositeOperation`](crate::operations::CompositeOperation) to get the
/// approval step handled.
#[derive(Debug, Clone, Copy)]
pub struct List;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListParams {
    pub nft_contract: String,
    pub token_id: String,
    pub price_wei: String,
    /// Passed through to the marketplace as a flag; no bridging happens here.
    pub cross_chain: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCall {
    pub nft_contract: Address,
    pub token_id: U256,
    pub price: U256,
    pub cross_chain: bool,
}

impl OperationKind for List {
    type Params = ListParams;
    type Call = ListCall;
    /// Listing id from `ItemListed`.
    type Output = U256;

    const NAME: &'static str = "list";
    const REVERT_RULES: &'static [RevertRule] =
        &[NOT_APPROVED, NOT_OWNER, DUPLICATE_LISTING, NONEXISTENT_TOKEN];

    fn validate(params: &ListParams) -> Result<ListCall, ParamError> {
        Ok(ListCall {
            nft_contract: parse_address("nft_contract", &params.nft_contract)?,
            token_id: parse_token_id(&params.token_id)?,
            price: parse_wei("price", &params.price_wei)?,
            cross_chain: params.cross_chain,
        })
    }

    fn encode(call: &ListCall, ctx: &CallContext<'_>) -> Result<CallRequest, OperationError> {
        Ok(CallRequest {
            to: ctx.resolve(ContractName::Marketplace)?,
            data: IMarketplace::listItemCall {
                nftContract: call.nft_contract,
                tokenId: call.token_id,
                price: call.price,
                crossChain: call.cross_chain,
            }
            .abi_encode()
            .into(),
            value: U256::ZERO,
        })
    }

    fn decode(call: &ListCall, marketplace: Address, receipt: &ReceiptOutcome) -> Option<U256> {
        receipt
            .logs
            .iter()
            .filter(|log| log.address == marketplace)
            .filter_map(|log| IMarketplace::ItemListed::decode_log_data(&log.data).ok())
            .find(|event| event.nftContract == call.nft_contract && event.tokenId == call.token_id)
            .map(|event| event.listingId)
    }

    fn success_message(call: &ListCall) -> String {
        format!("Token #{} listed for {} wei", call.token_id, call.price)
    }
}

impl RequiresApproval for List {
    fn approval_subject(call: &ListCall) -> (Address, U256) {
        (call.nft_contract, call.token_id)
    }
}
