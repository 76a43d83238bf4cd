//! Approve-then-act orchestration.
//!
//! ```text
//! execute(params)
//!     → dependent guards (claims the dependent operation)
//!     → ApprovalChecker pre-check
//!         approved  → dependent submit
//!         otherwise → dependent AwaitingDependency
//!                   → approval operation to terminal
//!                       Failed    → dependent Failed, nothing submitted
//!                       Confirmed → re-check → dependent submit (original params)
//! ```

use alloy::primitives::{Address, U256};

use crate::blockchain::ContractName;
use crate::operations::approval::ApprovalChecker;
use crate::operations::error::{OperationError, RevertReason};
use crate::operations::kinds::{Approve, ApproveParams};
use crate::operations::lifecycle::{
    CallContext, ExecutionOutcome, OperationEnv, OperationKind, Prepared, TransactionOperation,
};

/// An operation that needs the spender approved for a token first.
pub trait RequiresApproval: OperationKind {
    /// Contract that must be approved.
    const SPENDER: ContractName = ContractName::Marketplace;

    /// Token the approval is for.
    fn approval_subject(call: &Self::Call) -> (Address, U256);
}

/// Runs an approval sub-operation only when the token is not yet approved.
pub struct CompositeOperation<K: RequiresApproval> {
    approval: TransactionOperation<Approve>,
    dependent: TransactionOperation<K>,
    checker: ApprovalChecker,
    env: OperationEnv,
}

impl<K: RequiresApproval> CompositeOperation<K> {
    pub fn new(env: OperationEnv) -> Self {
        Self {
            approval: TransactionOperation::new(env.clone()),
            dependent: TransactionOperation::new(env.clone()),
            checker: ApprovalChecker::new(env.gateway.clone()),
            env,
        }
    }

    /// The approval sub-step, observable on its own.
    pub fn approval(&self) -> &TransactionOperation<Approve> {
        &self.approval
    }

    pub fn dependent(&self) -> &TransactionOperation<K> {
        &self.dependent
    }

    /// Approve if needed, then submit the dependent operation with `params`.
    ///
    /// Returns once the dependent transaction is accepted by the wallet, or
    /// as soon as any step fails.
    pub async fn execute(&self, params: K::Params) -> ExecutionOutcome<K::Output> {
        let prepared = match self.dependent.prepare(&params) {
            Ok(prepared) => prepared,
            Err(error) => return ExecutionOutcome::failed(error),
        };

        let (nft_contract, token_id) = K::approval_subject(&prepared.call);
        let ctx = CallContext::new(prepared.account, prepared.chain_id, &self.env.resolver);
        let spender = match ctx.resolve(K::SPENDER) {
            Ok(spender) => spender,
            Err(error) => return self.dependent.abort(prepared, error),
        };

        if self
            .is_approved(nft_contract, token_id, spender, &prepared)
            .await
            .unwrap_or(false)
        {
            tracing::info!(operation = K::NAME, nft = %nft_contract, token_id = %token_id, "Already approved");
            return self.dependent.submit(prepared).await;
        }

        self.dependent.await_dependency(&prepared);
        let approval = self
            .approval
            .execute_and_confirm(ApproveParams {
                nft_contract: nft_contract.to_string(),
                token_id: token_id.to_string(),
                spender: K::SPENDER,
            })
            .await;
        if !approval.success {
            let error = approval
                .error
                .unwrap_or_else(|| OperationError::rejected(RevertReason::NotApproved, "Approval failed"));
            tracing::warn!(operation = K::NAME, kind = %error.kind, "Approval failed; not submitting");
            return self.dependent.abort(prepared, error);
        }

        match self.is_approved(nft_contract, token_id, spender, &prepared).await {
            Some(false) => self.dependent.abort(
                prepared,
                OperationError::rejected(
                    RevertReason::NotApproved,
                    "Approval was not recorded on-chain",
                ),
            ),
            Some(true) | None => self.dependent.submit(prepared).await,
        }
    }

    /// Like [`execute`](Self::execute), but resolves once the dependent
    /// operation is terminal.
    pub async fn execute_and_confirm(&self, params: K::Params) -> ExecutionOutcome<K::Output> {
        let outcome = self.execute(params).await;
        if !outcome.success {
            return outcome;
        }
        let state = self.dependent.wait_for_terminal().await;
        ExecutionOutcome::from_state(&state)
    }

    /// `None` when the approval state could not be read.
    async fn is_approved(
        &self,
        nft_contract: Address,
        token_id: U256,
        spender: Address,
        prepared: &Prepared<K>,
    ) -> Option<bool> {
        match self
            .checker
            .check(nft_contract, token_id, spender, Some(prepared.account))
            .await
        {
            Ok(record) => Some(record.is_approved()),
            Err(e) => {
                tracing::warn!(operation = K::NAME, error = %e, "Approval check failed");
                None
            }
        }
    }
}
