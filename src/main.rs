//! Marketplace transaction CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   marketplace-cli <command>
//!          │
//!          ▼
//!   ┌──────────────┐    ┌──────────────────────┐    ┌──────────────┐
//!   │    config    │───▶│ TransactionOperation │───▶│  RpcGateway  │───▶ JSON-RPC node
//!   │ (TOML, env)  │    │  / CompositeOperation│    │ (alloy)      │
//!   └──────────────┘    └──────────┬───────────┘    └──────────────┘
//!                                  │ TransitionEvent
//!                                  ▼
//!                       ┌──────────────────────┐
//!                       │ TracingSink, metrics │
//!                       └──────────────────────┘
//! ```
//!
//! Signing key comes from `MARKET_PRIVATE_KEY`. Without it the CLI can still
//! read approvals, but every transaction fails with `not_connected`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;

use marketplace_tx::blockchain::{AddressResolver, ChainGateway, ContractName, RpcGateway, Wallet};
use marketplace_tx::config::{load_config, MarketConfig};
use marketplace_tx::observability::{logging, metrics};
use marketplace_tx::operations::kinds::{
    AcceptBid, AcceptBidParams, Approve, ApproveParams, Bid, BidParams, Buy, BuyParams,
    CancelListing, CancelParams, CreateCollection, CreateCollectionParams, List, ListParams,
    Mint, MintParams,
};
use marketplace_tx::operations::params::{parse_address, parse_token_id};
use marketplace_tx::operations::{
    ApprovalChecker, CompositeOperation, ExecutionOutcome, MetricsObserver, NotificationObserver,
    OperationEnv, OperationKind, TracingSink, TransactionOperation,
};

#[derive(Parser)]
#[command(name = "marketplace-cli")]
#[command(about = "Submit NFT marketplace transactions and follow them to confirmation", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in Anvil defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wait for the receipt instead of returning once the wallet accepts
    #[arg(short, long)]
    wait: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Approve the marketplace to transfer a token
    Approve { nft: String, token_id: String },
    /// List a token, approving the marketplace first when needed
    List {
        nft: String,
        token_id: String,
        price_wei: String,
        #[arg(long)]
        cross_chain: bool,
    },
    /// Buy a listing at its price
    Buy { listing_id: u64, price_wei: String },
    /// Bid on a listing
    Bid { listing_id: u64, amount_wei: String },
    /// Cancel one of your listings
    Cancel { listing_id: u64 },
    /// Accept the highest bid on one of your listings
    AcceptBid { listing_id: u64 },
    /// Mint a token
    Mint {
        token_uri: String,
        /// Collection contract; defaults to the network's NFT contract
        #[arg(long)]
        collection: Option<String>,
        /// Recipient; defaults to the signing account
        #[arg(long)]
        to: Option<String>,
    },
    /// Deploy a new collection
    CreateCollection {
        name: String,
        symbol: String,
        max_supply: String,
        #[arg(long, default_value_t = 0)]
        royalty_bps: u16,
        #[arg(long, default_value = "")]
        base_uri: String,
    },
    /// Show whether the marketplace may transfer a token
    CheckApproval {
        nft: String,
        token_id: String,
        /// Owner to check operator approval for; defaults to the signing account
        #[arg(long)]
        owner: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => MarketConfig::default(),
    };
    logging::init(&config.observability);

    tracing::info!(
        rpc_url = %config.chain.rpc_url,
        chain_id = config.chain.chain_id,
        networks = config.networks.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let wallet = match Wallet::from_env() {
        Ok(wallet) => {
            tracing::info!(account = %wallet.address(), "Signing account loaded");
            Some(wallet)
        }
        Err(e) => {
            tracing::warn!(error = %e, "No signing account; transactions will be rejected");
            None
        }
    };

    let resolver = Arc::new(AddressResolver::from_networks(&config.networks)?);
    let gateway: Arc<dyn ChainGateway> =
        Arc::new(RpcGateway::connect(config.chain.clone(), wallet).await?);
    let env = OperationEnv::new(gateway.clone(), resolver.clone())
        .with_observer(Arc::new(NotificationObserver::new(TracingSink)))
        .with_observer(Arc::new(MetricsObserver));

    let wait = cli.wait;
    let (output, success) = match cli.command {
        Commands::Approve { nft, token_id } => {
            let params = ApproveParams {
                nft_contract: nft,
                token_id,
                spender: ContractName::Marketplace,
            };
            run::<Approve>(&env, params, wait).await?
        }
        Commands::List {
            nft,
            token_id,
            price_wei,
            cross_chain,
        } => {
            let params = ListParams {
                nft_contract: nft,
                token_id,
                price_wei,
                cross_chain,
            };
            let composite = CompositeOperation::<List>::new(env.clone());
            let outcome = if wait {
                composite.execute_and_confirm(params).await
            } else {
                composite.execute(params).await
            };
            render(&outcome)?
        }
        Commands::Buy {
            listing_id,
            price_wei,
        } => {
            let params = BuyParams {
                listing_id,
                price_wei,
            };
            run::<Buy>(&env, params, wait).await?
        }
        Commands::Bid {
            listing_id,
            amount_wei,
        } => {
            let params = BidParams {
                listing_id,
                amount_wei,
            };
            run::<Bid>(&env, params, wait).await?
        }
        Commands::Cancel { listing_id } => {
            run::<CancelListing>(&env, CancelParams { listing_id }, wait).await?
        }
        Commands::AcceptBid { listing_id } => {
            run::<AcceptBid>(&env, AcceptBidParams { listing_id }, wait).await?
        }
        Commands::Mint {
            token_uri,
            collection,
            to,
        } => {
            let params = MintParams {
                collection,
                token_uri,
                recipient: to,
            };
            run::<Mint>(&env, params, wait).await?
        }
        Commands::CreateCollection {
            name,
            symbol,
            max_supply,
            royalty_bps,
            base_uri,
        } => {
            let params = CreateCollectionParams {
                name,
                symbol,
                max_supply,
                royalty_bps,
                base_uri,
            };
            run::<CreateCollection>(&env, params, wait).await?
        }
        Commands::CheckApproval {
            nft,
            token_id,
            owner,
        } => {
            let chain_id = gateway
                .ambient()
                .chain_id
                .ok_or("The connected network could not be determined")?;
            let spender = resolver.resolve(chain_id, ContractName::Marketplace)?;
            let nft = parse_address("nft", &nft)?;
            let token_id = parse_token_id(&token_id)?;
            let owner = match owner {
                Some(owner) => Some(parse_address("owner", &owner)?),
                None => gateway.ambient().account,
            };
            let record = ApprovalChecker::new(gateway.clone())
                .check(nft, token_id, spender, owner)
                .await?;
            let output = serde_json::json!({
                "nft_contract": record.nft_contract,
                "token_id": record.token_id,
                "spender": record.spender,
                "approved": record.approved,
                "operator": record.operator,
                "is_approved": record.is_approved(),
            });
            (serde_json::to_string_pretty(&output)?, true)
        }
    };

    println!("{}", output);
    if !success {
        std::process::exit(1);
    }
    Ok(())
}

async fn run<K>(
    env: &OperationEnv,
    params: K::Params,
    wait: bool,
) -> Result<(String, bool), serde_json::Error>
where
    K: OperationKind,
    K::Output: Serialize,
{
    let operation = TransactionOperation::<K>::new(env.clone());
    let outcome = if wait {
        operation.execute_and_confirm(params).await
    } else {
        operation.execute(params).await
    };
    render(&outcome)
}

fn render<T: Serialize + Clone>(
    outcome: &ExecutionOutcome<T>,
) -> Result<(String, bool), serde_json::Error> {
    Ok((serde_json::to_string_pretty(outcome)?, outcome.success))
}
