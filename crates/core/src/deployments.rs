//! Deployments.
//!
//! This module contains the named accounts of a chain and [`deploy_all`], which deploys a price
//! feed and a FundMe contract on a development chain.

use alloy_primitives::{Address, I256, U256};
use eyre::{bail, eyre, Result};
use fundme_utils::Network;
use tracing::info;

use crate::{
    chain::LocalChain,
    client::FundMeContract,
    errors::FundMePanic,
    feed::{DECIMALS, INITIAL_ANSWER},
};

/// The accounts that can be referred to by name, mapped to their dev account index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedAccounts {
    /// The account that deploys and owns the contracts.
    pub deployer: usize,
}

impl Default for NamedAccounts {
    fn default() -> Self {
        Self { deployer: 0 }
    }
}

impl NamedAccounts {
    /// Returns the dev account index of the account called `name`.
    pub fn resolve(&self, name: &str) -> Result<usize, FundMePanic> {
        match name {
            "deployer" => Ok(self.deployer),
            _ => Err(FundMePanic::UnknownNamedAccount { name: name.to_string() }),
        }
    }
}

/// The parameters of the mock price feed deployed on development chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockFeedParams {
    /// The decimals of the answers.
    pub decimals: u8,
    /// The first answer reported.
    pub initial_answer: I256,
}

impl Default for MockFeedParams {
    fn default() -> Self {
        let initial_answer = I256::from_raw(U256::from(INITIAL_ANSWER.unsigned_abs()));
        Self { decimals: DECIMALS, initial_answer }
    }
}

/// The contracts deployed by [`deploy_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    /// The account that deployed and owns the contracts.
    pub deployer: Address,
    /// The mock price feed.
    pub price_feed: Address,
    /// The FundMe contract.
    pub fund_me: FundMeContract,
}

/// Deploys a mock price feed and a FundMe contract reading from it, both from the `deployer`
/// named account.
///
/// Fails on networks that are not development chains.
pub fn deploy_all(
    chain: &mut LocalChain,
    network: &Network,
    accounts: &NamedAccounts,
    params: MockFeedParams,
) -> Result<Deployment> {
    if !network.development {
        bail!("{} is not a development chain", network.name);
    }
    if network.chain_id != chain.chain_id() {
        bail!(
            "network {} has chain id {}, chain has {}",
            network.name,
            network.chain_id,
            chain.chain_id()
        );
    }

    let index = accounts.resolve("deployer")?;
    let deployer = chain.signer(index)?.address();
    info!("DEPLOY ALL: network={}, deployer={}", network.name, deployer);

    let receipt = chain.deploy_price_feed(deployer, params.decimals, params.initial_answer)?;
    let price_feed =
        receipt.contract_address.ok_or_else(|| eyre!("price feed deployment has no address"))?;

    let receipt = chain.deploy_fund_me(deployer, price_feed)?;
    let fund_me =
        receipt.contract_address.ok_or_else(|| eyre!("FundMe deployment has no address"))?;

    info!("├── MockV3Aggregator: {}", price_feed);
    info!("└── FundMe: {}", fund_me);
    Ok(Deployment { deployer, price_feed, fund_me: FundMeContract::at(fund_me) })
}

#[cfg(test)]
mod tests {
    use fundme_utils::{HARDHAT, SEPOLIA};

    use super::*;
    use crate::chain::ChainConfig;

    #[test]
    fn test_deploy_all_on_development_chain() {
        let mut chain = LocalChain::new(ChainConfig { accounts: 2, ..ChainConfig::default() }).unwrap();
        let deployment =
            deploy_all(&mut chain, &HARDHAT, &NamedAccounts::default(), MockFeedParams::default())
                .unwrap();

        assert_eq!(deployment.deployer, chain.signer(0).unwrap().address());
        assert_eq!(deployment.fund_me.get_owner(&chain).unwrap(), deployment.deployer);
        assert_eq!(deployment.fund_me.get_price_feed(&chain).unwrap(), deployment.price_feed);
        let feed = chain.price_feed(deployment.price_feed).unwrap();
        assert_eq!(feed.latest_answer(), I256::try_from(INITIAL_ANSWER).unwrap());
    }

    #[test]
    fn test_deploy_all_rejects_live_network() {
        let mut chain = LocalChain::new(ChainConfig { accounts: 1, ..ChainConfig::default() }).unwrap();
        let err =
            deploy_all(&mut chain, &SEPOLIA, &NamedAccounts::default(), MockFeedParams::default())
                .unwrap_err();
        assert!(err.to_string().contains("not a development chain"));
        assert_eq!(chain.block_number(), 0);
    }

    #[test]
    fn test_resolve_named_accounts() {
        let accounts = NamedAccounts::default();
        assert_eq!(accounts.resolve("deployer").unwrap(), 0);
        assert_eq!(
            accounts.resolve("funder"),
            Err(FundMePanic::UnknownNamedAccount { name: "funder".to_string() })
        );
    }
}
