use clap::Parser;
use eyre::Result;
use holder_set::{HolderSetResolver, RpcHolderSource, StrategyKind};
use std::{path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod output;

use config::{HoldersConfig, CONFIG_FILE_NAME};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// NFT contract address (0x followed by 40 hex digits)
    #[arg(short, long)]
    contract: String,

    /// Path to configuration directory
    #[arg(long, default_value = "./configs")]
    config_path: String,

    /// RPC endpoint, overrides config and environment
    #[arg(long)]
    rpc_url: Option<String>,

    /// Derivation strategy (auto, events, enumeration)
    #[arg(long)]
    strategy: Option<StrategyKind>,

    /// First block scanned for Transfer events
    #[arg(long)]
    from_block: Option<u64>,

    /// Last block scanned for Transfer events (defaults to latest)
    #[arg(long)]
    to_block: Option<u64>,

    /// Query balanceOf for every holder
    #[arg(long)]
    balances: bool,

    /// Also write the holder table to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn apply_overrides(&self, mut config: HoldersConfig) -> HoldersConfig {
        if let Some(rpc_url) = &self.rpc_url {
            config.rpc_url = rpc_url.clone();
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(from_block) = self.from_block {
            config.start_block = from_block;
        }
        if let Some(to_block) = self.to_block {
            config.end_block = Some(to_block);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config_path = PathBuf::from(&cli.config_path).join(CONFIG_FILE_NAME);
    let config = if config_path.exists() {
        HoldersConfig::load_from_file(&config_path).await?
    } else {
        tracing::debug!(path = %config_path.display(), "Config file not found, using defaults");
        HoldersConfig::default()
    };
    let config = cli.apply_overrides(config.with_env_overrides());

    tracing::info!(
        rpc_url = %config.rpc_url,
        strategy = %config.strategy,
        start_block = config.start_block,
        end_block = ?config.end_block,
        "Config loaded"
    );

    let source = Arc::new(RpcHolderSource::connect_http(&config.rpc_url)?);
    let resolver = HolderSetResolver::new(config.resolver_config())
        .with_event_source(source.clone())
        .with_contract_reader(source);

    // Ctrl-C aborts the in-flight query
    let cancel_token = resolver.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling query");
            cancel_token.cancel();
        }
    });

    let strategy = resolver.effective_strategy()?;
    tracing::info!(contract = %cli.contract, %strategy, "Fetching holders");

    let holders = match resolver.resolve_holders(&cli.contract).await {
        Ok(holders) => holders,
        Err(e) => {
            tracing::error!(contract = %cli.contract, error = %e, "Holder query failed");
            return Err(e.into());
        }
    };

    tracing::info!(count = holders.len(), "Holders resolved");

    let balances = if cli.balances {
        Some(resolver.holder_balances(&cli.contract, &holders).await?)
    } else {
        None
    };

    let rows = output::holder_rows(&holders, balances.as_deref());
    print!("{}", output::render_table(&rows));

    if let Some(path) = &cli.csv {
        output::write_csv_file(path, &rows)?;
        tracing::info!(path = %path.display(), rows = rows.len(), "CSV written");
    }

    Ok(())
}
