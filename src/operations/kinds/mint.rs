use alloy::primitives::{Address, U256};
use alloy::sol_types::{SolCall, SolEvent};

use crate::blockchain::contracts::{ICollection, IERC721};
use crate::blockchain::{CallRequest, ContractName, ReceiptOutcome};
use crate::operations::classifier::{RevertRule, MAX_SUPPLY_REACHED};
use crate::operations::error::{OperationError, ParamError};
use crate::operations::lifecycle::{CallContext, OperationKind};
use crate::operations::params::{parse_address, require_text};

/// Mint a token into a collection.
///
/// Without a collection the chain's default NFT contract is used; without a
/// recipient the token goes to the connected account.
#[derive(Debug, Clone, Copy)]
pub struct Mint;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MintParams {
    pub collection: Option<String>,
    pub token_uri: String,
    pub recipient: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintCall {
    pub collection: Option<Address>,
    pub token_uri: String,
    pub recipient: Option<Address>,
}

fn optional_address(field: &'static str, value: &Option<String>) -> Result<Option<Address>, ParamError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_address(field, value).map(Some),
    }
}

impl OperationKind for Mint {
    type Params = MintParams;
    type Call = MintCall;
    /// Token id from the mint `Transfer` event.
    type Output = U256;

    const NAME: &'static str = "mint";
    const REVERT_RULES: &'static [RevertRule] = &[MAX_SUPPLY_REACHED];

    fn validate(params: &MintParams) -> Result<MintCall, ParamError> {
        Ok(MintCall {
            collection: optional_address("collection", &params.collection)?,
            token_uri: require_text("token_uri", &params.token_uri)?,
            recipient: optional_address("recipient", &params.recipient)?,
        })
    }

    fn encode(call: &MintCall, ctx: &CallContext<'_>) -> Result<CallRequest, OperationError> {
        let collection = match call.collection {
            Some(collection) => collection,
            None => ctx.resolve(ContractName::Nft)?,
        };
        Ok(CallRequest {
            to: collection,
            data: ICollection::mintCall {
                to: call.recipient.unwrap_or(ctx.account),
                tokenURI: call.token_uri.clone(),
            }
            .abi_encode()
            .into(),
            value: U256::ZERO,
        })
    }

    fn decode(_call: &MintCall, collection: Address, receipt: &ReceiptOutcome) -> Option<U256> {
        receipt
            .logs
            .iter()
            .filter(|log| log.address == collection)
            .filter_map(|log| IERC721::Transfer::decode_log_data(&log.data).ok())
            .find(|event| event.from.is_zero())
            .map(|event| event.tokenId)
    }

    fn success_message(_call: &MintCall) -> String {
        "Token minted".to_string()
    }
}
