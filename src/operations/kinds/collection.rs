use alloy::primitives::{Address, U256};
use alloy::sol_types::{SolCall, SolEvent};

use crate::blockchain::contracts::ICollectionFactory;
use crate::blockchain::{CallRequest, ContractName, ReceiptOutcome};
use crate::operations::classifier::{RevertRule, ROYALTY_OUT_OF_RANGE};
use crate::operations::error::{OperationError, ParamError};
use crate::operations::lifecycle::{CallContext, OperationKind};
use crate::operations::params::{check_royalty, parse_positive, require_text};

/// Deploy a new creator collection through the factory.
#[derive(Debug, Clone, Copy)]
pub struct CreateCollection;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateCollectionParams {
    pub name: String,
    pub symbol: String,
    pub max_supply: String,
    pub royalty_bps: u16,
    /// May be empty when token URIs are set per mint.
    pub base_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCollectionCall {
    pub name: String,
    pub symbol: String,
    pub max_supply: U256,
    pub royalty_bps: u16,
    pub base_uri: String,
}

impl OperationKind for CreateCollection {
    type Params = CreateCollectionParams;
    type Call = CreateCollectionCall;
    /// Address of the deployed collection.
    type Output = Address;

    const NAME: &'static str = "create_collection";
    const REVERT_RULES: &'static [RevertRule] = &[ROYALTY_OUT_OF_RANGE];

    fn validate(params: &CreateCollectionParams) -> Result<CreateCollectionCall, ParamError> {
        Ok(CreateCollectionCall {
            name: require_text("name", &params.name)?,
            symbol: require_text("symbol", &params.symbol)?,
            max_supply: parse_positive("max_supply", &params.max_supply)?,
            royalty_bps: check_royalty(params.royalty_bps)?,
            base_uri: params.base_uri.trim().to_string(),
        })
    }

    fn encode(
        call: &CreateCollectionCall,
        ctx: &CallContext<'_>,
    ) -> Result<CallRequest, OperationError> {
        Ok(CallRequest {
            to: ctx.resolve(ContractName::CollectionFactory)?,
            data: ICollectionFactory::createCollectionCall {
                name: call.name.clone(),
                symbol: call.symbol.clone(),
                maxSupply: call.max_supply,
                royaltyBps: U256::from(call.royalty_bps),
                baseURI: call.base_uri.clone(),
            }
            .abi_encode()
            .into(),
            value: U256::ZERO,
        })
    }

    fn decode(
        _call: &CreateCollectionCall,
        factory: Address,
        receipt: &ReceiptOutcome,
    ) -> Option<Address> {
        receipt
            .logs
            .iter()
            .filter(|log| log.address == factory)
            .find_map(|log| ICollectionFactory::CollectionCreated::decode_log_data(&log.data).ok())
            .map(|event| event.collection)
    }

    fn success_message(call: &CreateCollectionCall) -> String {
        format!("Collection {} ({}) created", call.name, call.symbol)
    }
}
