//! JSON-RPC implementation of the resolver capabilities.
//!
//! Logs are read with `eth_getLogs` filtered on the contract address and the
//! ERC-721 `Transfer` topic; method calls go through the `sol!` bindings in
//! [`crate::interfaces::erc721`].

use alloy::providers::{Provider, RootProvider};
use alloy::rpc::types::{Filter, Log};
use alloy::transports::http::reqwest::Url;
use alloy_primitives::Address;
use alloy_sol_types::SolEvent;
use eyre::{Result, WrapErr};

use crate::interfaces::erc721::{IERC721Enumerable, Transfer};
use crate::source::{ContractReader, EventSource};
use crate::types::{BlockRange, CallOutput, ContractCall, EventKind, TransferEvent};

/// Linea Sepolia public endpoint
pub const DEFAULT_RPC_URL: &str = "https://rpc.sepolia.linea.build";

/// Event and call capability backed by an alloy provider.
///
/// Generic over the provider type so callers can pass any transport or
/// layered provider they already own.
#[derive(Debug, Clone)]
pub struct RpcHolderSource<P: Provider + Clone> {
    provider: P,
}

impl RpcHolderSource<RootProvider> {
    /// Build a read-only HTTP provider for `rpc_url`.
    pub fn connect_http(rpc_url: &str) -> Result<Self> {
        let url: Url = rpc_url
            .parse()
            .map_err(|e| eyre::eyre!("Invalid RPC URL '{}': {}", rpc_url, e))?;

        Ok(Self::new(RootProvider::new_http(url)))
    }
}

impl<P> RpcHolderSource<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    async fn resolve_to_block(&self, range: BlockRange) -> Result<u64> {
        match range.to_block {
            Some(block) => Ok(block),
            None => self
                .provider
                .get_block_number()
                .await
                .wrap_err("Failed to get block number"),
        }
    }
}

/// Decode one raw log into a [`TransferEvent`].
pub fn decode_transfer_log(log: &Log) -> Result<TransferEvent> {
    let decoded = Transfer::decode_log(&log.inner)
        .map_err(|e| eyre::eyre!("Failed to parse Transfer event: {}", e))?;

    Ok(TransferEvent {
        from: decoded.data.from,
        to: decoded.data.to,
        token_id: decoded.data.tokenId,
        block_number: log.block_number,
        log_index: log.log_index,
    })
}

#[async_trait::async_trait]
impl<P> EventSource for RpcHolderSource<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    async fn fetch_events(
        &self,
        contract: Address,
        event: EventKind,
        range: BlockRange,
    ) -> Result<Vec<TransferEvent>> {
        let signature_hash = match event {
            EventKind::Transfer => Transfer::SIGNATURE_HASH,
        };

        let to_block = self.resolve_to_block(range).await?;

        let filter = Filter::new()
            .address(contract)
            .event_signature(signature_hash)
            .from_block(range.from_block)
            .to_block(to_block);

        tracing::debug!(
            %contract,
            event = event.signature(),
            from_block = range.from_block,
            to_block,
            "Querying logs"
        );

        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .wrap_err("Failed to get logs")?;

        let events = logs
            .iter()
            .map(decode_transfer_log)
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(%contract, count = events.len(), to_block, "Fetched Transfer events");
        Ok(events)
    }
}

#[async_trait::async_trait]
impl<P> ContractReader for RpcHolderSource<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    async fn call(&self, contract: Address, call: ContractCall) -> Result<CallOutput> {
        let token = IERC721Enumerable::new(contract, &self.provider);

        tracing::trace!(%contract, %call, "eth_call");

        let output = match call {
            ContractCall::TotalSupply => CallOutput::Uint(
                token
                    .totalSupply()
                    .call()
                    .await
                    .wrap_err("totalSupply failed")?,
            ),
            ContractCall::OwnerOf(token_id) => CallOutput::Address(
                token
                    .ownerOf(token_id)
                    .call()
                    .await
                    .wrap_err_with(|| format!("ownerOf({}) failed", token_id))?,
            ),
            ContractCall::BalanceOf(owner) => CallOutput::Uint(
                token
                    .balanceOf(owner)
                    .call()
                    .await
                    .wrap_err_with(|| format!("balanceOf({}) failed", owner))?,
            ),
        };

        Ok(output)
    }
}
