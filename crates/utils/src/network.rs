use alloy_primitives::{address, Address};
use anyhow::Result;
use serde::{Deserialize, Deserializer};

/// A network the contracts can be deployed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Network {
    /// The name used to select the network.
    pub name: &'static str,
    /// The EIP-155 chain id.
    pub chain_id: u64,
    /// The number of blocks to wait for before treating a transaction as final.
    pub block_confirmations: u64,
    /// The ETH/USD price feed already deployed on the network, if any.
    ///
    /// Development networks have none and get a mock aggregator instead.
    pub eth_usd_price_feed: Option<Address>,
    /// Whether the network is a local development chain.
    pub development: bool,
}

/// The in-process development network.
pub const HARDHAT: Network = Network {
    name: "hardhat",
    chain_id: 31337,
    block_confirmations: 1,
    eth_usd_price_feed: None,
    development: true,
};

/// A standalone development node listening locally.
pub const LOCALHOST: Network = Network {
    name: "localhost",
    chain_id: 31337,
    block_confirmations: 1,
    eth_usd_price_feed: None,
    development: true,
};

/// The Sepolia testnet.
pub const SEPOLIA: Network = Network {
    name: "sepolia",
    chain_id: 11155111,
    block_confirmations: 6,
    eth_usd_price_feed: Some(address!("694aa1769357215de4fac081bf1f309adc325306")),
    development: false,
};

/// The names of the networks that run a development chain.
pub const DEVELOPMENT_CHAINS: [&str; 2] = [HARDHAT.name, LOCALHOST.name];

/// Returns the network for the given name.
pub fn get_network(name: &str) -> Result<Network> {
    match name {
        "hardhat" => Ok(HARDHAT),
        "localhost" => Ok(LOCALHOST),
        "sepolia" => Ok(SEPOLIA),
        _ => Err(anyhow::anyhow!("Invalid network name: {}", name)),
    }
}

/// Deserializes a network name into a [Network].
pub fn deserialize_network<'de, D>(deserializer: D) -> Result<Network, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    get_network(&name).map_err(serde::de::Error::custom)
}
