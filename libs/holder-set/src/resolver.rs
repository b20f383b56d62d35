//! Holder query entry point.
//!
//! [`HolderSetResolver`] validates the contract identifier, picks a strategy
//! based on the capabilities it was given, and runs it under the configured
//! per-call timeout and its cancellation token.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::address::parse_address;
use crate::errors::ResolverError;
use crate::source::{ContractReader, EventSource};
use crate::strategy::{derive_holders_by_enumeration, derive_holders_from_events};
use crate::types::{BlockRange, CallOutput, ContractCall, EventKind, HolderBalance, HolderSet};

/// Which derivation strategy a query uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Event replay when an event source is configured, enumeration otherwise
    #[default]
    Auto,
    /// Replay `Transfer` logs
    Events,
    /// Walk `ownerOf` over `totalSupply`
    Enumeration,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Auto => write!(f, "auto"),
            StrategyKind::Events => write!(f, "events"),
            StrategyKind::Enumeration => write!(f, "enumeration"),
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(StrategyKind::Auto),
            "events" => Ok(StrategyKind::Events),
            "enumeration" => Ok(StrategyKind::Enumeration),
            other => Err(format!(
                "unknown strategy '{}', expected auto, events or enumeration",
                other
            )),
        }
    }
}

/// Configuration for the HolderSetResolver
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Strategy selection
    pub strategy: StrategyKind,
    /// Block range scanned by event replay
    pub block_range: BlockRange,
    /// First token id walked by enumeration
    pub first_token_id: U256,
    /// Upper bound on each remote call; `None` waits indefinitely
    pub call_timeout: Option<Duration>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Auto,
            block_range: BlockRange::all(),
            first_token_id: U256::ZERO,
            call_timeout: None,
        }
    }
}

impl ResolverConfig {
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_block_range(mut self, block_range: BlockRange) -> Self {
        self.block_range = block_range;
        self
    }

    pub fn with_first_token_id(mut self, first_token_id: U256) -> Self {
        self.first_token_id = first_token_id;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = Some(call_timeout);
        self
    }
}

enum Selected<'a> {
    Events(&'a dyn EventSource),
    Enumeration(&'a dyn ContractReader),
}

/// Resolves the current holder set of a contract.
///
/// Capabilities are injected by the caller; the resolver owns no network
/// client of its own.
pub struct HolderSetResolver {
    config: ResolverConfig,
    event_source: Option<Arc<dyn EventSource>>,
    contract_reader: Option<Arc<dyn ContractReader>>,
    cancel_token: CancellationToken,
}

impl HolderSetResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            event_source: None,
            contract_reader: None,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn with_event_source(mut self, source: Arc<dyn EventSource>) -> Self {
        self.event_source = Some(source);
        self
    }

    pub fn with_contract_reader(mut self, reader: Arc<dyn ContractReader>) -> Self {
        self.contract_reader = Some(reader);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Get the cancellation token. Cancelling it aborts the in-flight query
    /// with [`ResolverError::Cancelled`].
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Strategy a query would run with the current capabilities.
    pub fn effective_strategy(&self) -> Result<StrategyKind, ResolverError> {
        Ok(match self.select()? {
            Selected::Events(_) => StrategyKind::Events,
            Selected::Enumeration(_) => StrategyKind::Enumeration,
        })
    }

    /// Validate `contract` and derive its current holders.
    ///
    /// The address is checked before any capability is touched. Any
    /// capability failure aborts the query; no partial set is returned.
    pub async fn resolve_holders(&self, contract: &str) -> Result<HolderSet, ResolverError> {
        let contract = parse_address(contract)?;

        match self.select()? {
            Selected::Events(source) => self.resolve_from_events(source, contract).await,
            Selected::Enumeration(reader) => self.resolve_by_enumeration(reader, contract).await,
        }
    }

    /// Query `balanceOf` for every holder, in set order.
    pub async fn holder_balances(
        &self,
        contract: &str,
        holders: &HolderSet,
    ) -> Result<Vec<HolderBalance>, ResolverError> {
        let contract = parse_address(contract)?;
        let reader = self
            .contract_reader
            .as_deref()
            .ok_or(ResolverError::MissingCapability("contract reader"))?;

        let mut balances = Vec::with_capacity(holders.len());
        for holder in holders {
            let balance = self
                .call_uint(reader, contract, ContractCall::BalanceOf(*holder))
                .await?;
            balances.push(HolderBalance {
                holder: *holder,
                balance,
            });
        }
        Ok(balances)
    }

    fn select(&self) -> Result<Selected<'_>, ResolverError> {
        let events: Option<&dyn EventSource> = self.event_source.as_deref();
        let reader: Option<&dyn ContractReader> = self.contract_reader.as_deref();

        match self.config.strategy {
            StrategyKind::Events => events
                .map(Selected::Events)
                .ok_or(ResolverError::MissingCapability("event source")),
            StrategyKind::Enumeration => reader
                .map(Selected::Enumeration)
                .ok_or(ResolverError::MissingCapability("contract reader")),
            StrategyKind::Auto => match (events, reader) {
                (Some(source), _) => Ok(Selected::Events(source)),
                (None, Some(reader)) => Ok(Selected::Enumeration(reader)),
                (None, None) => Err(ResolverError::MissingCapability(
                    "event source or contract reader",
                )),
            },
        }
    }

    async fn resolve_from_events(
        &self,
        source: &dyn EventSource,
        contract: Address,
    ) -> Result<HolderSet, ResolverError> {
        let range = self.config.block_range;
        let events = self
            .guarded("fetch Transfer events", async {
                source
                    .fetch_events(contract, EventKind::Transfer, range)
                    .await
                    .map_err(|e| ResolverError::FetchError(format!("{:#}", e)))
            })
            .await?;

        Ok(derive_holders_from_events(events))
    }

    async fn resolve_by_enumeration(
        &self,
        reader: &dyn ContractReader,
        contract: Address,
    ) -> Result<HolderSet, ResolverError> {
        let total_supply = self
            .call_uint(reader, contract, ContractCall::TotalSupply)
            .await?;

        derive_holders_by_enumeration(total_supply, self.config.first_token_id, move |token_id| {
            self.call_address(reader, contract, ContractCall::OwnerOf(token_id))
        })
        .await
    }

    async fn call_uint(
        &self,
        reader: &dyn ContractReader,
        contract: Address,
        call: ContractCall,
    ) -> Result<U256, ResolverError> {
        match self.call(reader, contract, call).await? {
            CallOutput::Uint(value) => Ok(value),
            other => Err(ResolverError::call(
                call.method(),
                format!("expected uint256, got {:?}", other),
            )),
        }
    }

    async fn call_address(
        &self,
        reader: &dyn ContractReader,
        contract: Address,
        call: ContractCall,
    ) -> Result<Address, ResolverError> {
        match self.call(reader, contract, call).await? {
            CallOutput::Address(address) => Ok(address),
            other => Err(ResolverError::call(
                call.method(),
                format!("expected address, got {:?}", other),
            )),
        }
    }

    async fn call(
        &self,
        reader: &dyn ContractReader,
        contract: Address,
        call: ContractCall,
    ) -> Result<CallOutput, ResolverError> {
        self.guarded(&call.to_string(), async {
            reader
                .call(contract, call)
                .await
                .map_err(|e| ResolverError::call(call.method(), format!("{:#}", e)))
        })
        .await
    }

    /// Run one remote operation under the call timeout and cancellation token.
    async fn guarded<T, F>(&self, operation: &str, fut: F) -> Result<T, ResolverError>
    where
        F: Future<Output = Result<T, ResolverError>>,
    {
        let timed = async {
            match self.config.call_timeout {
                Some(after) => match tokio::time::timeout(after, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(ResolverError::Timeout {
                        operation: operation.to_string(),
                        after,
                    }),
                },
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => Err(ResolverError::Cancelled),
            result = timed => result,
        }
    }
}
