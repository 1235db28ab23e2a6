use alloy_primitives::{I256, U256};
use config::{Config, ConfigError, Environment};
use fundme_core::{chain::ChainConfig, deployments::MockFeedParams, gas::BLOCK_GAS_LIMIT};
use fundme_utils::{deserialize_network, ether, LogFormat, Network};
use serde::Deserialize;

/// Settings for the CLI.
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// The network to deploy to.
    #[serde(deserialize_with = "deserialize_network")]
    pub network: Network,
    /// The format for logging.
    pub log_format: LogFormat,
    /// The gas price of the dev chain, in wei.
    pub gas_price: u64,
    /// The number of dev accounts.
    pub accounts: usize,
    /// The initial balance of each dev account, in ether.
    pub initial_balance_eth: u64,
    /// The decimals of the mock price feed.
    pub price_feed_decimals: u8,
    /// The initial answer of the mock price feed.
    pub price_feed_initial_answer: i64,
}

impl Settings {
    /// Create a new Settings instance from environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("network", "hardhat")?
            .set_default("log_format", "Minimal")?
            .set_default("gas_price", 1_000_000_000i64)?
            .set_default("accounts", 20i64)?
            .set_default("initial_balance_eth", 10_000i64)?
            .set_default("price_feed_decimals", 8i64)?
            .set_default("price_feed_initial_answer", 2000_00000000i64)?
            .add_source(Environment::with_prefix("FUNDME").try_parsing(true))
            .build()?;

        config.try_deserialize()
    }

    /// The parameters of the dev chain.
    pub fn chain_config(&self) -> ChainConfig {
        ChainConfig {
            chain_id: self.network.chain_id,
            gas_price: u128::from(self.gas_price),
            accounts: self.accounts,
            initial_balance: ether(self.initial_balance_eth),
            block_gas_limit: BLOCK_GAS_LIMIT,
        }
    }

    /// The parameters of the mock price feed.
    pub fn mock_feed_params(&self) -> MockFeedParams {
        let magnitude = U256::from(self.price_feed_initial_answer.unsigned_abs());
        let initial_answer = if self.price_feed_initial_answer < 0 {
            -I256::from_raw(magnitude)
        } else {
            I256::from_raw(magnitude)
        };
        MockFeedParams { decimals: self.price_feed_decimals, initial_answer }
    }
}
