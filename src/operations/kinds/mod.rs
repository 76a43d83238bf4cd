//! Concrete marketplace operations.
//!
//! Each kind is a zero-sized marker implementing
//! [`OperationKind`](crate::operations::OperationKind); run it through a
//! [`TransactionOperation`](crate::operations::TransactionOperation).

mod accept_bid;
mod approve;
mod bid;
mod buy;
mod cancel;
mod collection;
mod list;
mod mint;

pub use accept_bid::{AcceptBid, AcceptBidParams};
pub use approve::{Approve, ApproveCall, ApproveParams};
pub use bid::{Bid, BidCall, BidParams};
pub use buy::{Buy, BuyCall, BuyParams};
pub use cancel::{CancelListing, CancelParams};
pub use collection::{CreateCollection, CreateCollectionCall, CreateCollectionParams};
pub use list::{List, ListCall, ListParams};
pub use mint::{Mint, MintCall, MintParams};
