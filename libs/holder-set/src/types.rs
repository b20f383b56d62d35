//! Data model shared by the derivation strategies and the capabilities.

use std::collections::BTreeSet;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// A single ERC-721 `Transfer` log, reduced to what holder derivation needs.
///
/// `from` is the zero address for mints. The chain position is optional
/// because pending logs carry neither a block number nor a log index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferEvent {
    /// Previous owner (zero address on mint)
    pub from: Address,
    /// New owner
    pub to: Address,
    /// Token being moved
    pub token_id: U256,
    /// Block the log was emitted in
    pub block_number: Option<u64>,
    /// Position of the log within its block
    pub log_index: Option<u64>,
}

impl TransferEvent {
    /// Create an event without chain position.
    pub fn new(from: Address, to: Address, token_id: U256) -> Self {
        Self {
            from,
            to,
            token_id,
            block_number: None,
            log_index: None,
        }
    }

    /// Attach the block number and log index the event was emitted at.
    pub fn at(mut self, block_number: u64, log_index: u64) -> Self {
        self.block_number = Some(block_number);
        self.log_index = Some(log_index);
        self
    }

    /// True when the event creates a token rather than moving one.
    pub fn is_mint(&self) -> bool {
        self.from == Address::ZERO
    }

    /// Chronological sort key. Logs without a position sort last.
    pub(crate) fn position(&self) -> (u64, u64) {
        (
            self.block_number.unwrap_or(u64::MAX),
            self.log_index.unwrap_or(u64::MAX),
        )
    }
}

/// Set of addresses currently holding at least one token.
///
/// Membership only: an address is either in the set or not, no per-address
/// balance is tracked. Iterates in ascending address order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HolderSet {
    holders: BTreeSet<Address>,
}

impl HolderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a holder. Returns false if it was already present.
    pub fn insert(&mut self, holder: Address) -> bool {
        self.holders.insert(holder)
    }

    /// Remove a holder. Returns false if it was not present.
    pub fn remove(&mut self, holder: &Address) -> bool {
        self.holders.remove(holder)
    }

    pub fn contains(&self, holder: &Address) -> bool {
        self.holders.contains(holder)
    }

    pub fn len(&self) -> usize {
        self.holders.len()
    }

    /// An empty set is a valid outcome, not a failure.
    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.holders.iter()
    }

    pub fn to_vec(&self) -> Vec<Address> {
        self.holders.iter().copied().collect()
    }
}

impl FromIterator<Address> for HolderSet {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        Self {
            holders: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for HolderSet {
    type Item = Address;
    type IntoIter = std::collections::btree_set::IntoIter<Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.holders.into_iter()
    }
}

impl<'a> IntoIterator for &'a HolderSet {
    type Item = &'a Address;
    type IntoIter = std::collections::btree_set::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.holders.iter()
    }
}

/// Inclusive block range for event queries. `to_block = None` means latest.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockRange {
    pub from_block: u64,
    pub to_block: Option<u64>,
}

impl BlockRange {
    pub fn new(from_block: u64, to_block: Option<u64>) -> Self {
        Self {
            from_block,
            to_block,
        }
    }

    /// Genesis to latest
    pub fn all() -> Self {
        Self::default()
    }
}

impl core::fmt::Display for BlockRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.to_block {
            Some(to) => write!(f, "{}..={}", self.from_block, to),
            None => write!(f, "{}..=latest", self.from_block),
        }
    }
}

/// Events the event capability knows how to fetch and decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// ERC-721 `Transfer(address indexed,address indexed,uint256 indexed)`
    Transfer,
}

impl EventKind {
    pub fn signature(&self) -> &'static str {
        match self {
            EventKind::Transfer => "Transfer(address,address,uint256)",
        }
    }
}

/// Read-only contract methods the call capability supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractCall {
    TotalSupply,
    OwnerOf(U256),
    BalanceOf(Address),
}

impl ContractCall {
    /// Solidity method name, used in error messages and logs.
    pub fn method(&self) -> &'static str {
        match self {
            ContractCall::TotalSupply => "totalSupply",
            ContractCall::OwnerOf(_) => "ownerOf",
            ContractCall::BalanceOf(_) => "balanceOf",
        }
    }
}

impl core::fmt::Display for ContractCall {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ContractCall::TotalSupply => write!(f, "totalSupply()"),
            ContractCall::OwnerOf(token_id) => write!(f, "ownerOf({})", token_id),
            ContractCall::BalanceOf(owner) => write!(f, "balanceOf({})", owner),
        }
    }
}

/// Decoded return value of a [`ContractCall`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutput {
    Uint(U256),
    Address(Address),
}

/// Token count held by one address, as reported by `balanceOf`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HolderBalance {
    pub holder: Address,
    pub balance: U256,
}
