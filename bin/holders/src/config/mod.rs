use std::path::Path;
use std::time::Duration;

use alloy_primitives::U256;
use holder_set::{BlockRange, ResolverConfig, StrategyKind, DEFAULT_RPC_URL};
use serde::{Deserialize, Serialize};

/// File name looked up inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "holders.json";

/// Environment variable overriding the RPC URL
pub const HOLDERS_RPC_URL_ENV: &str = "HOLDERS_RPC_URL";

/// Environment variable overriding the first block scanned for events
pub const HOLDERS_START_BLOCK_ENV: &str = "HOLDERS_START_BLOCK";

/// Environment variable overriding the per-call timeout
pub const HOLDERS_CALL_TIMEOUT_SECS_ENV: &str = "HOLDERS_CALL_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldersConfig {
    pub rpc_url: String,
    pub strategy: StrategyKind,
    pub start_block: u64,
    pub end_block: Option<u64>,
    pub first_token_id: u64,
    /// `None` disables the timeout
    pub call_timeout_secs: Option<u64>,
}

impl Default for HoldersConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            strategy: StrategyKind::Auto,
            start_block: 0,
            end_block: None,
            first_token_id: 0,
            call_timeout_secs: Some(30),
        }
    }
}

impl HoldersConfig {
    pub async fn load_from_file(path: &Path) -> eyre::Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Apply `HOLDERS_*` environment variables on top of the loaded values.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Unparsable values are ignored and the existing setting is kept.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(rpc_url) = lookup(HOLDERS_RPC_URL_ENV) {
            self.rpc_url = rpc_url;
        }
        if let Some(start_block) = lookup(HOLDERS_START_BLOCK_ENV).and_then(|v| v.parse().ok()) {
            self.start_block = start_block;
        }
        if let Some(secs) = lookup(HOLDERS_CALL_TIMEOUT_SECS_ENV).and_then(|v| v.parse::<u64>().ok()) {
            // 0 disables
            self.call_timeout_secs = (secs > 0).then_some(secs);
        }
        self
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        let config = ResolverConfig::default()
            .with_strategy(self.strategy)
            .with_block_range(BlockRange::new(self.start_block, self.end_block))
            .with_first_token_id(U256::from(self.first_token_id));

        match self.call_timeout_secs {
            Some(secs) => config.with_call_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}
