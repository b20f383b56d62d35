//! Current-holder discovery for ERC-721 contracts.
//!
//! Two derivation strategies are provided:
//! - event replay over the contract's `Transfer` logs (primary)
//! - enumeration of `ownerOf` over `0..totalSupply`
//!
//! Both run behind [`HolderSetResolver`], which receives its network
//! capabilities ([`EventSource`], [`ContractReader`]) from the caller.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use holder_set::{HolderSetResolver, ResolverConfig, RpcHolderSource};
//!
//! let source = Arc::new(RpcHolderSource::connect_http("https://rpc.sepolia.linea.build")?);
//! let resolver = HolderSetResolver::new(ResolverConfig::default())
//!     .with_event_source(source.clone())
//!     .with_contract_reader(source);
//!
//! for holder in resolver.resolve_holders("0x...").await? {
//!     println!("{}", holder);
//! }
//! ```

pub mod interfaces {
    pub mod erc721;
}

pub mod address;
pub mod errors;
pub mod resolver;
pub mod rpc;
pub mod source;
pub mod strategy;
pub mod types;

pub use address::{is_address, parse_address};
pub use errors::ResolverError;
pub use resolver::{HolderSetResolver, ResolverConfig, StrategyKind};
pub use rpc::{RpcHolderSource, DEFAULT_RPC_URL};
pub use source::{ContractReader, EventSource};
pub use strategy::{derive_holders_by_enumeration, derive_holders_from_events};
pub use types::{
    BlockRange, CallOutput, ContractCall, EventKind, HolderBalance, HolderSet, TransferEvent,
};
