#![allow(dead_code)]

use alloy_primitives::{Address, U256};
use alloy_signer_local::PrivateKeySigner;
use fundme_core::{
    chain::{ChainConfig, LocalChain},
    client::FundMeContract,
    deployments::{deploy_all, Deployment, MockFeedParams, NamedAccounts},
    errors::{FundMeError, FundMeRevert},
    receipts::TransactionReceipt,
};
use fundme_utils::{ether, HARDHAT};

/// Test environment containing a dev chain with the contracts deployed.
pub struct FundMeTestContext {
    /// The chain.
    pub chain: LocalChain,
    /// The deployed contracts.
    pub deployment: Deployment,
    /// The deployer, which owns the FundMe contract.
    pub deployer: PrivateKeySigner,
    /// The dev accounts, starting with the deployer.
    pub signers: Vec<PrivateKeySigner>,
}

impl FundMeTestContext {
    /// The FundMe contract.
    pub fn fund_me(&self) -> FundMeContract {
        self.deployment.fund_me
    }
}

/// The value sent by each contribution.
pub fn send_value() -> U256 {
    ether(1)
}

/// Sets up a dev chain and deploys the mock price feed and the FundMe contract.
#[must_use]
pub fn setup() -> FundMeTestContext {
    let mut chain = LocalChain::new(ChainConfig::default()).unwrap();
    let deployment =
        deploy_all(&mut chain, &HARDHAT, &NamedAccounts::default(), MockFeedParams::default())
            .unwrap();
    let signers = chain.signers().to_vec();
    let deployer = signers[0].clone();
    FundMeTestContext { chain, deployment, deployer, signers }
}

/// Funds the contract with [`send_value`] from the dev accounts `1..=count`.
pub fn fund_from_accounts(test: &mut FundMeTestContext, count: usize) {
    let fund_me = test.fund_me();
    for signer in &test.signers[1..=count] {
        fund_me.connect(signer).fund(&mut test.chain, send_value()).unwrap();
    }
}

/// Asserts that the ledger entry of `funder` equals `expected`.
pub fn assert_amount_funded(test: &FundMeTestContext, funder: Address, expected: U256) {
    let actual = test.fund_me().get_address_to_amount_funded(&test.chain, funder).unwrap();
    assert_eq!(actual, expected, "amount funded by {funder}");
}

/// Asserts that the native balance of `account` equals `expected`.
pub fn assert_balance(test: &FundMeTestContext, account: Address, expected: U256) {
    assert_eq!(test.chain.balance_of(account), expected, "balance of {account}");
}

/// Asserts that the funder list is empty.
pub fn assert_no_funders(test: &FundMeTestContext) {
    let result = test.fund_me().get_funder(&test.chain, 0);
    assert!(
        matches!(
            result,
            Err(FundMeError::Revert(FundMeRevert::FunderIndexOutOfBounds { index: 0, len: 0 }))
        ),
        "expected no funders, got {result:?}"
    );
}

/// Withdraws as the deployer and asserts the owner received the whole contract balance minus the
/// gas cost of the withdrawal.
pub fn withdraw_and_assert_settled(
    test: &mut FundMeTestContext,
    withdraw: impl FnOnce(&mut FundMeTestContext) -> TransactionReceipt,
) -> TransactionReceipt {
    let fund_me = test.fund_me().address();
    let owner = test.deployer.address();
    let starting_fund_me_balance = test.chain.balance_of(fund_me);
    let starting_deployer_balance = test.chain.balance_of(owner);

    let receipt = withdraw(test);

    assert_balance(test, fund_me, U256::ZERO);
    assert_balance(
        test,
        owner,
        starting_fund_me_balance + starting_deployer_balance - receipt.gas_cost(),
    );
    receipt
}
