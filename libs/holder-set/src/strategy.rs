//! Holder derivation strategies.
//!
//! Both functions are pure with respect to the network: event replay works on
//! an already fetched log, enumeration drives an injected `owner_of` lookup.

use std::future::Future;

use alloy_primitives::{Address, U256};

use crate::types::{HolderSet, TransferEvent};

/// Replay `Transfer` events to derive the current holder set.
///
/// Events are sorted by block number then log index before replay; events
/// without a position keep their relative order after all positioned ones.
/// For each event the sender is removed (unless it is the zero address) and
/// the receiver is added.
///
/// # Known limitation
///
/// Membership is binary. An address holding several tokens that transfers
/// one of them away is removed even though it still holds the others, unless
/// a later event sends it a token again. Exact per-token accounting would need
/// a balance map instead of a set.
pub fn derive_holders_from_events(mut events: Vec<TransferEvent>) -> HolderSet {
    events.sort_by_key(TransferEvent::position);

    let mut holders = HolderSet::new();
    for event in &events {
        if !event.is_mint() {
            holders.remove(&event.from);
        }
        holders.insert(event.to);
    }
    holders
}

/// Derive holders by asking `owner_of` for every token id in
/// `first_token_id .. first_token_id + total_supply`.
///
/// Calls are issued one at a time; the first error aborts the enumeration and
/// is returned as is, with no partial result.
pub async fn derive_holders_by_enumeration<F, Fut, E>(
    total_supply: U256,
    first_token_id: U256,
    mut owner_of: F,
) -> Result<HolderSet, E>
where
    F: FnMut(U256) -> Fut,
    Fut: Future<Output = Result<Address, E>>,
{
    let mut holders = HolderSet::new();
    let mut offset = U256::ZERO;
    while offset < total_supply {
        let owner = owner_of(first_token_id.saturating_add(offset)).await?;
        holders.insert(owner);
        offset += U256::from(1);
    }
    Ok(holders)
}
