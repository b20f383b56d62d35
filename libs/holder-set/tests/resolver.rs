use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use holder_set::{
    BlockRange, CallOutput, ContractCall, ContractReader, EventKind, EventSource,
    HolderSetResolver, ResolverConfig, ResolverError, StrategyKind, TransferEvent,
};

const CONTRACT: &str = "0x1234567890abcdef1234567890abcdef12345678";

fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

/// In-memory chain serving both capabilities and counting every call.
#[derive(Default)]
struct FakeChain {
    events: Vec<TransferEvent>,
    owners: Vec<Address>,
    balances: Vec<(Address, u64)>,
    fail_fetch: bool,
    fail_owner_of: Option<u64>,
    delay: Option<Duration>,
    fetches: AtomicUsize,
    calls: AtomicUsize,
    last_range: std::sync::Mutex<Option<BlockRange>>,
}

impl FakeChain {
    fn total_calls(&self) -> usize {
        self.fetches.load(Ordering::SeqCst) + self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EventSource for FakeChain {
    async fn fetch_events(
        &self,
        _contract: Address,
        event: EventKind,
        range: BlockRange,
    ) -> eyre::Result<Vec<TransferEvent>> {
        assert_eq!(event, EventKind::Transfer);
        self.fetches.fetch_add(1, Ordering::SeqCst);
        *self.last_range.lock().unwrap() = Some(range);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_fetch {
            eyre::bail!("node returned 503");
        }
        Ok(self.events.clone())
    }
}

#[async_trait::async_trait]
impl ContractReader for FakeChain {
    async fn call(&self, _contract: Address, call: ContractCall) -> eyre::Result<CallOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match call {
            ContractCall::TotalSupply => Ok(CallOutput::Uint(U256::from(self.owners.len()))),
            ContractCall::OwnerOf(token_id) => {
                let id = token_id.to::<u64>();
                if self.fail_owner_of == Some(id) {
                    eyre::bail!("execution reverted: invalid token ID");
                }
                Ok(CallOutput::Address(self.owners[id as usize]))
            }
            ContractCall::BalanceOf(owner) => {
                let balance = self
                    .balances
                    .iter()
                    .find(|(a, _)| *a == owner)
                    .map(|(_, b)| *b)
                    .unwrap_or(0);
                Ok(CallOutput::Uint(U256::from(balance)))
            }
        }
    }
}

fn build_resolver(chain: &Arc<FakeChain>, config: ResolverConfig) -> HolderSetResolver {
    HolderSetResolver::new(config)
        .with_event_source(chain.clone())
        .with_contract_reader(chain.clone())
}

#[tokio::test]
async fn test_invalid_address_never_reaches_network() {
    let chain = Arc::new(FakeChain::default());

    for strategy in [StrategyKind::Auto, StrategyKind::Events, StrategyKind::Enumeration] {
        let resolver = build_resolver(&chain, ResolverConfig::default().with_strategy(strategy));
        let result = resolver.resolve_holders("not-an-address").await;
        assert!(matches!(result, Err(ResolverError::InvalidAddress { .. })));
    }

    assert_eq!(chain.total_calls(), 0);
}

#[tokio::test]
async fn test_event_replay() {
    let chain = Arc::new(FakeChain {
        events: vec![
            TransferEvent::new(Address::ZERO, addr(0xa), U256::from(1)).at(10, 0),
            TransferEvent::new(Address::ZERO, addr(0xa), U256::from(2)).at(10, 1),
            TransferEvent::new(Address::ZERO, addr(0xc), U256::from(3)).at(11, 0),
            TransferEvent::new(addr(0xa), addr(0xb), U256::from(1)).at(12, 0),
        ],
        ..Default::default()
    });

    let resolver = build_resolver(
        &chain,
        ResolverConfig::default().with_block_range(BlockRange::new(5, Some(20))),
    );
    let holders = resolver.resolve_holders(CONTRACT).await.unwrap();

    // 0xa still owns token 2 but is dropped by binary membership.
    assert_eq!(holders.to_vec(), vec![addr(0xb), addr(0xc)]);
    assert_eq!(chain.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(chain.calls.load(Ordering::SeqCst), 0);
    assert_eq!(*chain.last_range.lock().unwrap(), Some(BlockRange::new(5, Some(20))));
}

#[tokio::test]
async fn test_empty_history_is_not_an_error() {
    let chain = Arc::new(FakeChain::default());
    let holders = build_resolver(&chain, ResolverConfig::default())
        .resolve_holders(CONTRACT)
        .await
        .unwrap();
    assert!(holders.is_empty());
}

#[tokio::test]
async fn test_fetch_error_propagates() {
    let chain = Arc::new(FakeChain {
        fail_fetch: true,
        ..Default::default()
    });

    match build_resolver(&chain, ResolverConfig::default())
        .resolve_holders(CONTRACT)
        .await
    {
        Err(ResolverError::FetchError(msg)) => assert!(msg.contains("503")),
        other => panic!("expected FetchError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_enumeration() {
    let chain = Arc::new(FakeChain {
        owners: vec![addr(0xa), addr(0xa), addr(0xb)],
        ..Default::default()
    });

    let resolver = build_resolver(
        &chain,
        ResolverConfig::default().with_strategy(StrategyKind::Enumeration),
    );
    let holders = resolver.resolve_holders(CONTRACT).await.unwrap();

    assert_eq!(holders.to_vec(), vec![addr(0xa), addr(0xb)]);
    // totalSupply + one ownerOf per token
    assert_eq!(chain.calls.load(Ordering::SeqCst), 4);
    assert_eq!(chain.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_enumeration_aborts_on_first_failed_call() {
    let chain = Arc::new(FakeChain {
        owners: vec![addr(0xa), addr(0xb), addr(0xc), addr(0xd)],
        fail_owner_of: Some(1),
        ..Default::default()
    });

    let resolver = build_resolver(
        &chain,
        ResolverConfig::default().with_strategy(StrategyKind::Enumeration),
    );

    match resolver.resolve_holders(CONTRACT).await {
        Err(ResolverError::CallError { method, reason }) => {
            assert_eq!(method, "ownerOf");
            assert!(reason.contains("invalid token ID"));
        }
        other => panic!("expected CallError, got {:?}", other),
    }
    // totalSupply, ownerOf(0), ownerOf(1)
    assert_eq!(chain.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_auto_falls_back_to_enumeration() {
    let chain = Arc::new(FakeChain {
        owners: vec![addr(0xa)],
        ..Default::default()
    });

    let resolver =
        HolderSetResolver::new(ResolverConfig::default()).with_contract_reader(chain.clone());

    assert_eq!(resolver.effective_strategy().unwrap(), StrategyKind::Enumeration);
    let holders = resolver.resolve_holders(CONTRACT).await.unwrap();
    assert_eq!(holders.to_vec(), vec![addr(0xa)]);
}

#[tokio::test]
async fn test_missing_capability() {
    let chain = Arc::new(FakeChain::default());
    let resolver = HolderSetResolver::new(
        ResolverConfig::default().with_strategy(StrategyKind::Enumeration),
    )
    .with_event_source(chain.clone());

    assert!(matches!(
        resolver.resolve_holders(CONTRACT).await,
        Err(ResolverError::MissingCapability("contract reader"))
    ));
    assert_eq!(chain.total_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_call_timeout() {
    let chain = Arc::new(FakeChain {
        delay: Some(Duration::from_secs(60)),
        ..Default::default()
    });

    let resolver = build_resolver(
        &chain,
        ResolverConfig::default().with_call_timeout(Duration::from_secs(5)),
    );

    match resolver.resolve_holders(CONTRACT).await {
        Err(ResolverError::Timeout { after, .. }) => assert_eq!(after, Duration::from_secs(5)),
        other => panic!("expected Timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cancelled_before_query() {
    let chain = Arc::new(FakeChain::default());
    let resolver = build_resolver(&chain, ResolverConfig::default());

    resolver.cancel_token().cancel();

    assert!(matches!(
        resolver.resolve_holders(CONTRACT).await,
        Err(ResolverError::Cancelled)
    ));
    assert_eq!(chain.total_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_in_flight_query() {
    let chain = Arc::new(FakeChain {
        delay: Some(Duration::from_secs(60)),
        ..Default::default()
    });
    let resolver = build_resolver(&chain, ResolverConfig::default());
    let token = resolver.cancel_token();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();
    });

    assert!(matches!(
        resolver.resolve_holders(CONTRACT).await,
        Err(ResolverError::Cancelled)
    ));
    canceller.await.unwrap();
}

#[tokio::test]
async fn test_holder_balances() {
    let chain = Arc::new(FakeChain {
        owners: vec![addr(0xa), addr(0xa), addr(0xb)],
        balances: vec![(addr(0xa), 2), (addr(0xb), 1)],
        ..Default::default()
    });

    let resolver = build_resolver(
        &chain,
        ResolverConfig::default().with_strategy(StrategyKind::Enumeration),
    );
    let holders = resolver.resolve_holders(CONTRACT).await.unwrap();
    let balances = resolver.holder_balances(CONTRACT, &holders).await.unwrap();

    assert_eq!(balances.len(), 2);
    assert_eq!(balances[0].holder, addr(0xa));
    assert_eq!(balances[0].balance, U256::from(2));
    assert_eq!(balances[1].holder, addr(0xb));
    assert_eq!(balances[1].balance, U256::from(1));
}

#[tokio::test]
#[ignore] // Requires network access to Linea Sepolia
async fn test_live_rpc_holders() {
    // Run with: HOLDERS_TEST_CONTRACT=0x... cargo test test_live_rpc_holders -- --ignored --nocapture
    let contract = std::env::var("HOLDERS_TEST_CONTRACT").expect("HOLDERS_TEST_CONTRACT not set");
    let source = Arc::new(holder_set::RpcHolderSource::connect_http(holder_set::DEFAULT_RPC_URL).unwrap());

    let resolver = HolderSetResolver::new(
        ResolverConfig::default().with_call_timeout(Duration::from_secs(30)),
    )
    .with_event_source(source.clone())
    .with_contract_reader(source);

    let holders = resolver.resolve_holders(&contract).await.unwrap();
    println!("{} holders", holders.len());
    for holder in &holders {
        println!("  {}", holder);
    }
}
