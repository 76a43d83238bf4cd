use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;

use crate::blockchain::contracts::IERC721;
use crate::blockchain::{CallRequest, ContractName};
use crate::operations::classifier::{RevertRule, NONEXISTENT_TOKEN, NOT_OWNER};
use crate::operations::error::{OperationError, ParamError};
use crate::operations::lifecycle::{CallContext, OperationKind};
use crate::operations::params::{parse_address, parse_token_id};

/// Approve a marketplace contract to transfer one token.
#[derive(Debug, Clone, Copy)]
pub struct Approve;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproveParams {
    pub nft_contract: String,
    pub token_id: String,
    pub spender: ContractName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproveCall {
    pub nft_contract: Address,
    pub token_id: U256,
    pub spender: ContractName,
}

impl OperationKind for Approve {
    type Params = ApproveParams;
    type Call = ApproveCall;
    type Output = ();

    const NAME: &'static str = "approve";
    const REVERT_RULES: &'static [RevertRule] = &[NOT_OWNER, NONEXISTENT_TOKEN];

    fn validate(params: &ApproveParams) -> Result<ApproveCall, ParamError> {
        Ok(ApproveCall {
            nft_contract: parse_address("nft_contract", &params.nft_contract)?,
            token_id: parse_token_id(&params.token_id)?,
            spender: params.spender,
        })
    }

    fn encode(call: &ApproveCall, ctx: &CallContext<'_>) -> Result<CallRequest, OperationError> {
        let spender = ctx.resolve(call.spender)?;
        Ok(CallRequest {
            to: call.nft_contract,
            data: IERC721::approveCall {
                to: spender,
                tokenId: call.token_id,
            }
            .abi_encode()
            .into(),
            value: U256::ZERO,
        })
    }

    fn success_message(call: &ApproveCall) -> String {
        format!("Token #{} approved for the {}", call.token_id, call.spender.as_str())
    }
}
