//! Capabilities the resolver consumes from a network client.
//!
//! Both traits are transport agnostic. [`crate::rpc::RpcHolderSource`]
//! implements them over JSON-RPC; tests implement them in memory.

use alloy_primitives::Address;
use eyre::Result;

use crate::types::{BlockRange, CallOutput, ContractCall, EventKind, TransferEvent};

/// Fetches historical logs of a contract.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch and decode every `event` emitted by `contract` within `range`.
    async fn fetch_events(
        &self,
        contract: Address,
        event: EventKind,
        range: BlockRange,
    ) -> Result<Vec<TransferEvent>>;
}

/// Performs read-only contract calls.
#[async_trait::async_trait]
pub trait ContractReader: Send + Sync {
    /// Execute `call` against `contract` and decode its return value.
    async fn call(&self, contract: Address, call: ContractCall) -> Result<CallOutput>;
}
