//! Alloy-backed [`ChainGateway`] talking to a JSON-RPC node.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint, optionally with a signing wallet
//! - Sign calls locally and broadcast the raw transaction
//! - Poll receipts until the configured confirmation depth is reached
//! - Replay reverted transactions to recover the revert reason
//! - Bound every RPC request with a timeout
//!
//! The hash is computed before broadcast. A broadcast whose answer is lost
//! (timeout, dropped connection) still hands the hash back, so the receipt
//! watch decides the outcome instead of a blind resubmission.

use std::future::Future;
use std::time::Duration;

use alloy::eips::eip2718::Encodable2718;
use alloy::eips::BlockId;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::{interval, sleep, timeout, MissedTickBehavior};

use crate::blockchain::gateway::ChainGateway;
use crate::blockchain::types::{
    AmbientContext, BlockchainError, BlockchainResult, CallRequest, ChainId, ReceiptOutcome,
};
use crate::blockchain::wallet::Wallet;
use crate::config::ChainConfig;
use crate::resilience::Backoff;

/// Revert text used when the node does not say why execution failed.
const GENERIC_REVERT: &str = "execution reverted";

/// JSON-RPC gateway with an optional local signer.
pub struct RpcGateway {
    provider: DynProvider,
    signer: Option<EthereumWallet>,
    account: Option<Address>,
    chain_id: Option<ChainId>,
    config: ChainConfig,
    timeout_duration: Duration,
    /// Calls broadcast by this gateway and still being watched, keyed by hash.
    /// Kept for replaying a reverted transaction.
    in_flight: DashMap<TxHash, TransactionRequest>,
}

/// What the node said about a raw transaction broadcast.
#[derive(Debug)]
enum Broadcast {
    Accepted,
    /// The node answered with a JSON-RPC error.
    Refused(String),
    /// No usable answer: timeout or transport failure.
    Unknown(String),
}

impl Broadcast {
    fn from_result<T>(result: Result<T, RpcError<TransportErrorKind>>) -> Self {
        match result {
            Ok(_) => Broadcast::Accepted,
            Err(e @ RpcError::ErrorResp(_)) => Broadcast::Refused(e.to_string()),
            Err(e) => Broadcast::Unknown(e.to_string()),
        }
    }
}

/// Decide the submit result once a signed transaction has been broadcast.
///
/// Only a definite refusal from the node means nothing is in flight. A node that
/// already holds the transaction counts as accepted.
fn settle_broadcast(hash: TxHash, broadcast: Broadcast) -> BlockchainResult<TxHash> {
    match broadcast {
        Broadcast::Accepted => Ok(hash),
        Broadcast::Refused(msg) => {
            let lower = msg.to_lowercase();
            if lower.contains("already known") || lower.contains("known transaction") {
                Ok(hash)
            } else {
                Err(BlockchainError::Rejected(msg))
            }
        }
        Broadcast::Unknown(msg) => {
            tracing::warn!(
                tx_hash = %hash,
                error = %msg,
                "Broadcast outcome unknown, watching signed hash"
            );
            Ok(hash)
        }
    }
}

/// Revert text recovered by replaying a reverted transaction with `eth_call`.
///
/// `None` means the replay itself could not complete. A replay that succeeds
/// says nothing about the original failure.
fn replay_reason(replay: Option<Result<Bytes, String>>) -> String {
    match replay {
        Some(Err(msg)) if !msg.trim().is_empty() => msg,
        _ => GENERIC_REVERT.to_string(),
    }
}

/// Sign a fully populated request, returning its hash and 2718 encoding.
async fn sign_request(
    signer: &EthereumWallet,
    tx: TransactionRequest,
) -> BlockchainResult<(TxHash, Bytes)> {
    let envelope = tx
        .build(signer)
        .await
        .map_err(|e| BlockchainError::Wallet(format!("Failed to sign transaction: {}", e)))?;
    Ok((*envelope.tx_hash(), envelope.encoded_2718().into()))
}

impl RpcGateway {
    /// Connect to the configured node.
    ///
    /// Without a wallet the gateway is read-only and reports no connected account.
    /// An unreachable node does not fail construction; the chain id stays unknown.
    pub async fn connect(config: ChainConfig, wallet: Option<Wallet>) -> BlockchainResult<Self> {
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        let provider = ProviderBuilder::new().connect_http(url).erased();

        let mut gateway = Self {
            provider,
            signer: wallet.as_ref().map(Wallet::to_ethereum_wallet),
            account: wallet.as_ref().map(Wallet::address),
            chain_id: None,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            config,
            in_flight: DashMap::new(),
        };

        match gateway.fetch_chain_id().await {
            Ok(chain_id) => {
                if chain_id.0 != gateway.config.chain_id {
                    tracing::warn!(
                        error = %BlockchainError::ChainMismatch {
                            expected: gateway.config.chain_id,
                            actual: chain_id.0,
                        },
                        "Node serves a different chain than configured"
                    );
                }
                tracing::info!(
                    rpc_url = %gateway.config.rpc_url,
                    chain_id = chain_id.0,
                    account = ?gateway.account,
                    "Chain gateway connected"
                );
                gateway.chain_id = Some(chain_id);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chain gateway created but chain id is unknown");
            }
        }

        Ok(gateway)
    }

    /// Get the chain ID from the RPC.
    pub async fn fetch_chain_id(&self) -> BlockchainResult<ChainId> {
        self.bounded(async { self.provider.get_chain_id().await })
            .await
            .map(ChainId)
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.bounded(async { self.provider.get_block_number().await })
            .await
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        self.bounded(async { self.provider.get_transaction_receipt(tx_hash).await })
            .await
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Run an RPC future under the request timeout.
    async fn bounded<T, E, F>(&self, fut: F) -> BlockchainResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(BlockchainError::Rpc(e.to_string())),
            Err(_) => Err(BlockchainError::Timeout(self.config.rpc_timeout_secs)),
        }
    }

    /// Number of confirmations a receipt in `tx_block` has at `current_block`,
    /// counting its own block.
    fn confirmations(tx_block: Option<u64>, current_block: u64) -> u64 {
        let tx_block = tx_block.unwrap_or(current_block);
        current_block.saturating_sub(tx_block).saturating_add(1)
    }

    /// Fill nonce, gas and fees so the request can be signed offline.
    async fn populate(
        &self,
        tx: TransactionRequest,
        from: Address,
    ) -> BlockchainResult<TransactionRequest> {
        let chain_id = self
            .chain_id
            .ok_or_else(|| BlockchainError::NotAvailable("chain id unknown".to_string()))?;

        let nonce = self
            .bounded(async { self.provider.get_transaction_count(from).pending().await })
            .await?;

        // Estimation executes the call, so a revert surfaces here with its reason
        let gas = self
            .bounded(async { self.provider.estimate_gas(tx.clone()).await })
            .await
            .map_err(|e| match e {
                BlockchainError::Rpc(msg) => BlockchainError::Rejected(msg),
                other => other,
            })?;

        let fees = self
            .bounded(async { self.provider.estimate_eip1559_fees().await })
            .await?;

        Ok(tx
            .with_chain_id(chain_id.0)
            .with_nonce(nonce)
            .with_gas_limit(gas)
            .with_max_fee_per_gas(fees.max_fee_per_gas)
            .with_max_priority_fee_per_gas(fees.max_priority_fee_per_gas))
    }

    /// Replay a reverted transaction at its block to recover the revert text.
    async fn revert_reason(&self, hash: TxHash, block: Option<u64>) -> String {
        let Some((_, tx)) = self.in_flight.remove(&hash) else {
            return GENERIC_REVERT.to_string();
        };

        let replay = timeout(self.timeout_duration, async {
            match block {
                Some(number) => self.provider.call(tx).block(BlockId::number(number)).await,
                None => self.provider.call(tx).await,
            }
        })
        .await
        .ok()
        .map(|result| result.map_err(|e| e.to_string()));

        replay_reason(replay)
    }
}

#[async_trait]
impl ChainGateway for RpcGateway {
    fn ambient(&self) -> AmbientContext {
        AmbientContext {
            account: self.account,
            chain_id: self.chain_id,
        }
    }

    async fn submit(&self, request: CallRequest) -> BlockchainResult<TxHash> {
        let (Some(from), Some(signer)) = (self.account, self.signer.as_ref()) else {
            return Err(BlockchainError::NotAvailable("no signing wallet loaded".to_string()));
        };

        let call = TransactionRequest::default()
            .with_from(from)
            .with_to(request.to)
            .with_input(request.data)
            .with_value(request.value);

        let tx = self.populate(call.clone(), from).await?;
        let (hash, raw) = sign_request(signer, tx).await?;
        self.in_flight.insert(hash, call);

        let broadcast = match timeout(self.timeout_duration, async {
            self.provider.send_raw_transaction(&raw).await
        })
        .await
        {
            Ok(result) => Broadcast::from_result(result),
            Err(_) => Broadcast::Unknown(
                BlockchainError::Timeout(self.config.rpc_timeout_secs).to_string(),
            ),
        };

        let settled = settle_broadcast(hash, broadcast);
        match &settled {
            Ok(_) => tracing::debug!(tx_hash = %hash, "Transaction broadcast"),
            Err(_) => {
                self.in_flight.remove(&hash);
            }
        }
        settled
    }

    async fn watch_receipt(&self, hash: TxHash) -> BlockchainResult<ReceiptOutcome> {
        let required = self.config.confirmation_blocks.max(1);
        let mut backoff = Backoff::new(
            self.config.backoff_base_ms,
            self.config.backoff_max_ms,
            self.config.max_receipt_errors,
        );
        let mut ticker = interval(Duration::from_millis(self.config.poll_interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let polled = match self.get_transaction_receipt(hash).await {
                Ok(Some(receipt)) => self
                    .get_block_number()
                    .await
                    .map(|current| {
                        Some((Self::confirmations(receipt.block_number, current), receipt))
                    }),
                Ok(None) => Ok(None),
                Err(e) => Err(e),
            };

            let (confirmations, receipt) = match polled {
                Ok(Some(found)) => {
                    backoff.succeed();
                    found
                }
                Ok(None) => {
                    backoff.succeed();
                    tracing::debug!(tx_hash = %hash, "Transaction pending");
                    continue;
                }
                Err(e) => match backoff.fail() {
                    Some(delay) => {
                        tracing::warn!(
                            tx_hash = %hash,
                            error = %e,
                            failures = backoff.failures(),
                            delay_ms = delay.as_millis() as u64,
                            "Receipt poll failed, backing off"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    None => {
                        self.in_flight.remove(&hash);
                        return Err(e);
                    }
                },
            };

            if !receipt.status() {
                let reason = self.revert_reason(hash, receipt.block_number).await;
                tracing::warn!(tx_hash = %hash, reason = %reason, "Transaction reverted");
                return Err(BlockchainError::Reverted(reason));
            }

            if confirmations >= u64::from(required) {
                self.in_flight.remove(&hash);
                return Ok(ReceiptOutcome {
                    status: true,
                    block_number: receipt.block_number,
                    logs: receipt.inner.logs().iter().map(|log| log.inner.clone()).collect(),
                });
            }

            tracing::debug!(
                tx_hash = %hash,
                confirmations = confirmations,
                required = required,
                "Waiting for confirmations"
            );
        }
    }

    async fn read_contract(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        self.bounded(async { self.provider.call(tx).await }).await
    }
}

impl std::fmt::Debug for RpcGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcGateway")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.chain_id)
            .field("account", &self.account)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
