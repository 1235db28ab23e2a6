//! Local Chain.
//!
//! This module contains [`LocalChain`], an in-memory development chain. It holds funded dev
//! accounts, verifies signed transactions, meters their gas and executes them against the
//! deployed contracts. Every transaction is atomic: if execution fails, the world state is
//! restored and the sender is not charged.

use std::collections::BTreeMap;

use alloy_primitives::{keccak256, Address, B256, I256, U256};
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolValue;
use fundme_utils::{ether, time_now, WEI_PER_GWEI};
use tracing::{debug, info};

use crate::{
    errors::{FundMeError, FundMePanic},
    feed::{MockV3Aggregator, PriceFeed},
    gas::{self, intrinsic_gas, GasMeter, Slot},
    host::{CallContext, Host},
    receipts::{ReceiptAction, TransactionReceipt},
    signing::{recover_sender, signer},
    sol::TransactionRequest,
    sparse::SparseStorage,
    state::LocalFundMe,
    storage::{Storage, StorageKey},
    transactions::{FundMeCall, SignedTransaction},
};

/// The chain id of development chains.
pub const DEVELOPMENT_CHAIN_ID: u64 = 31337;

/// The number of dev accounts created by default.
pub const DEFAULT_ACCOUNTS: usize = 20;

/// The balance of each dev account, in ether.
pub const DEFAULT_INITIAL_BALANCE_ETH: u64 = 10_000;

/// The code deposit charged when deploying a price feed.
pub const PRICE_FEED_CODE_DEPOSIT: u64 = 350_000;

/// The code deposit charged when deploying a FundMe contract.
pub const FUND_ME_CODE_DEPOSIT: u64 = 700_000;

/// The parameters of a [`LocalChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// The EIP-155 chain id transactions must be signed for.
    pub chain_id: u64,
    /// The price paid per unit of gas, in wei.
    pub gas_price: u128,
    /// The number of dev accounts.
    pub accounts: usize,
    /// The initial balance of each dev account, in wei.
    pub initial_balance: U256,
    /// The maximum gas limit of a transaction.
    pub block_gas_limit: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: DEVELOPMENT_CHAIN_ID,
            gas_price: WEI_PER_GWEI,
            accounts: DEFAULT_ACCOUNTS,
            initial_balance: ether(DEFAULT_INITIAL_BALANCE_ETH),
            block_gas_limit: gas::BLOCK_GAS_LIMIT,
        }
    }
}

/// The account state of the chain.
#[derive(Debug, Clone, Default)]
pub struct World {
    balances: SparseStorage<Address, U256>,
    nonces: SparseStorage<Address, u64>,
    feeds: BTreeMap<Address, MockV3Aggregator>,
}

impl World {
    /// Returns the nonce of `account`.
    #[must_use]
    pub fn nonce(&self, account: Address) -> u64 {
        self.nonces.get(&account).copied().unwrap_or_default()
    }

    fn increment_nonce(&mut self, account: Address) {
        *self.nonces.entry(account).or_default() += 1;
    }

    fn set_balance(&mut self, account: Address, balance: U256) {
        self.balances.insert(account, balance);
    }

    fn debit(&mut self, account: Address, amount: U256) -> Result<(), FundMePanic> {
        let balance = self.balance(account);
        let remaining = crate::u256::sub(balance, amount)
            .map_err(|_| FundMePanic::InsufficientBalance { account, amount, balance })?;
        self.balances.insert(account, remaining);
        Ok(())
    }
}

impl Host for World {
    fn price_feed(&self, address: Address) -> Option<&dyn PriceFeed> {
        self.feeds.get(&address).map(|feed| feed as &dyn PriceFeed)
    }

    fn balance(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), FundMePanic> {
        if from == to {
            return Ok(());
        }
        let from_balance = self.balance(from);
        let to_balance = self.balance(to);
        let from_balance = crate::u256::sub(from_balance, amount).map_err(|_| {
            FundMePanic::InsufficientBalance { account: from, amount, balance: from_balance }
        })?;
        let to_balance = crate::u256::add(to_balance, amount)?;
        self.balances.insert(from, from_balance);
        self.balances.insert(to, to_balance);
        Ok(())
    }
}

/// An in-memory development chain.
pub struct LocalChain {
    /// The parameters of the chain.
    config: ChainConfig,
    /// The number of the last mined block.
    block_number: u64,
    /// The timestamp of the last mined block.
    timestamp: u64,
    /// The dev accounts, in order.
    signers: Vec<PrivateKeySigner>,
    /// Balances, nonces and price feeds.
    world: World,
    /// The deployed FundMe contracts.
    contracts: BTreeMap<Address, LocalFundMe>,
}

impl LocalChain {
    /// Creates a new chain whose dev accounts are funded with the configured initial balance.
    pub fn new(config: ChainConfig) -> Result<Self, FundMePanic> {
        let signers = (0..config.accounts)
            .map(|index| signer(&format!("fundme-dev-account-{index}")))
            .collect::<Result<Vec<_>, _>>()?;
        let mut world = World::default();
        for account in &signers {
            world.set_balance(account.address(), config.initial_balance);
        }
        info!(
            "CHAIN {}: {} accounts with {} wei each",
            config.chain_id,
            signers.len(),
            config.initial_balance
        );
        Ok(Self {
            config,
            block_number: 0,
            timestamp: time_now(),
            signers,
            world,
            contracts: BTreeMap::new(),
        })
    }

    /// Returns the parameters of the chain.
    #[must_use]
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Returns the chain id.
    #[must_use]
    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    /// Returns the gas price, in wei.
    #[must_use]
    pub fn gas_price(&self) -> u128 {
        self.config.gas_price
    }

    /// Returns the number of the last mined block.
    #[must_use]
    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    /// Returns the dev accounts.
    #[must_use]
    pub fn signers(&self) -> &[PrivateKeySigner] {
        &self.signers
    }

    /// Returns the dev account at `index`.
    pub fn signer(&self, index: usize) -> Result<&PrivateKeySigner, FundMePanic> {
        self.signers
            .get(index)
            .ok_or(FundMePanic::AccountIndexOutOfRange { index, len: self.signers.len() })
    }

    /// Returns the addresses of the dev accounts.
    #[must_use]
    pub fn accounts(&self) -> Vec<Address> {
        self.signers.iter().map(PrivateKeySigner::address).collect()
    }

    /// Returns the native balance of `account`.
    #[must_use]
    pub fn balance_of(&self, account: Address) -> U256 {
        self.world.balance(account)
    }

    /// Sets the native balance of `account`.
    pub fn set_balance(&mut self, account: Address, balance: U256) {
        self.world.set_balance(account, balance);
    }

    /// Returns the nonce of `account`.
    #[must_use]
    pub fn nonce_of(&self, account: Address) -> u64 {
        self.world.nonce(account)
    }

    /// Returns the FundMe contract deployed at `address`.
    #[must_use]
    pub fn fund_me(&self, address: Address) -> Option<&LocalFundMe> {
        self.contracts.get(&address)
    }

    /// Returns the price feed deployed at `address`.
    #[must_use]
    pub fn price_feed(&self, address: Address) -> Option<&MockV3Aggregator> {
        self.world.feeds.get(&address)
    }

    /// Returns the version of the price feed used by the FundMe contract at `address`.
    pub fn get_version(&self, address: Address) -> Result<U256, FundMeError> {
        let contract =
            self.fund_me(address).ok_or(FundMePanic::ContractDoesNotExist { address })?;
        contract.get_version(&self.world)
    }

    /// Reports a new answer on the price feed at `address`.
    pub fn update_price(&mut self, address: Address, answer: I256) -> Result<(), FundMePanic> {
        let timestamp = self.timestamp;
        let feed = self
            .world
            .feeds
            .get_mut(&address)
            .ok_or(FundMePanic::PriceFeedDoesNotExist { address })?;
        info!("FEED {}: answer = {}", address, answer);
        feed.update_answer(answer, timestamp);
        Ok(())
    }

    /// Builds a call request from `from` with its next nonce and the default gas limit.
    #[must_use]
    pub fn transaction_request(
        &self,
        from: Address,
        to: Address,
        value: U256,
        call: FundMeCall,
    ) -> TransactionRequest {
        TransactionRequest {
            chainId: self.config.chain_id,
            nonce: self.nonce_of(from),
            to,
            value,
            gasLimit: gas::DEFAULT_CALL_GAS_LIMIT,
            input: call.calldata(),
        }
    }

    /// Deploys a [`MockV3Aggregator`] from `deployer`.
    pub fn deploy_price_feed(
        &mut self,
        deployer: Address,
        decimals: u8,
        initial_answer: I256,
    ) -> Result<TransactionReceipt, FundMeError> {
        let address = deployer.create(self.nonce_of(deployer));
        info!("DEPLOY {}: MockV3Aggregator(decimals={}, answer={})", address, decimals, initial_answer);

        debug!("charge deployment");
        let mut meter = GasMeter::new(self.config.block_gas_limit).with_warm_accounts([deployer]);
        meter.charge(intrinsic_gas(&[], true))?;
        meter.charge(PRICE_FEED_CODE_DEPOSIT)?;

        let feed = MockV3Aggregator::new(address, decimals, initial_answer, self.timestamp);
        let action = ReceiptAction::DeployPriceFeed { address };
        self.settle_deployment(deployer, address, meter.used(), action, |chain| {
            chain.world.feeds.insert(address, feed);
        })
    }

    /// Deploys a FundMe contract owned by `deployer` that reads prices from `price_feed`.
    pub fn deploy_fund_me(
        &mut self,
        deployer: Address,
        price_feed: Address,
    ) -> Result<TransactionReceipt, FundMeError> {
        let address = deployer.create(self.nonce_of(deployer));
        info!("DEPLOY {}: FundMe(owner={}, price_feed={})", address, deployer, price_feed);

        debug!("verify price feed exists");
        if !self.world.feeds.contains_key(&price_feed) {
            return Err(FundMePanic::PriceFeedDoesNotExist { address: price_feed }.into());
        }

        debug!("charge deployment");
        let mut meter = GasMeter::new(self.config.block_gas_limit).with_warm_accounts([deployer]);
        meter.charge(intrinsic_gas(price_feed.as_slice(), true))?;
        meter.charge(FUND_ME_CODE_DEPOSIT)?;
        meter.sstore(Slot::PriceFeed, U256::ZERO, price_feed.index())?;

        let contract = LocalFundMe::new(address, deployer, price_feed);
        let action = ReceiptAction::DeployFundMe { address, owner: deployer, price_feed };
        self.settle_deployment(deployer, address, meter.used(), action, |chain| {
            chain.contracts.insert(address, contract);
        })
    }

    /// Verifies and executes a signed transaction, then mines it into a new block.
    ///
    /// Returns an error without changing any state if the transaction is invalid, the sender
    /// cannot afford it or execution fails.
    pub fn send(&mut self, tx: &SignedTransaction) -> Result<TransactionReceipt, FundMeError> {
        let request = &tx.request;

        debug!("verify signature");
        let from = recover_sender(tx)?;

        debug!("verify chain id");
        if request.chainId != self.config.chain_id {
            return Err(FundMePanic::ChainIdMismatch {
                expected: self.config.chain_id,
                actual: request.chainId,
            }
            .into());
        }

        debug!("verify nonce");
        let nonce = self.nonce_of(from);
        if request.nonce != nonce {
            return Err(FundMePanic::NonceMismatch {
                account: from,
                expected: nonce,
                actual: request.nonce,
            }
            .into());
        }

        debug!("verify gas limit");
        if request.gasLimit > self.config.block_gas_limit {
            return Err(FundMePanic::GasLimitExceedsBlock {
                gas_limit: request.gasLimit,
                block_gas_limit: self.config.block_gas_limit,
            }
            .into());
        }

        debug!("verify contract exists");
        let to = request.to;
        if !self.contracts.contains_key(&to) {
            return Err(FundMePanic::ContractDoesNotExist { address: to }.into());
        }

        debug!("verify sender can pay value and maximum fee");
        let max_fee = crate::u256::mul(U256::from(request.gasLimit), U256::from(self.config.gas_price))?;
        let upfront = crate::u256::add(request.value, max_fee)?;
        let balance = self.balance_of(from);
        if balance < upfront {
            return Err(FundMePanic::InsufficientBalance { account: from, amount: upfront, balance }
                .into());
        }

        let call = FundMeCall::decode(&request.input);
        info!("TX {}: {}(from={}, to={}, value={})", nonce, call.name(), from, to, request.value);

        let snapshot = (self.world.clone(), self.contracts.clone());
        let (gas_used, action) = match self.execute(from, request, call) {
            Ok(result) => result,
            Err(err) => {
                debug!("restore state after failed execution");
                (self.world, self.contracts) = snapshot;
                info!("└── Rejected: {}", err);
                return Err(err);
            }
        };

        let mut payload = request.abi_encode();
        payload.extend_from_slice(&tx.signature);
        let tx_hash = keccak256(payload);
        let receipt = self.mine(tx_hash, from, Some(to), None, gas_used, action)?;
        Ok(receipt)
    }

    /// Executes a verified call, leaving partial state behind on error.
    fn execute(
        &mut self,
        from: Address,
        request: &TransactionRequest,
        call: FundMeCall,
    ) -> Result<(u64, ReceiptAction), FundMeError> {
        let to = request.to;
        let mut meter = GasMeter::new(request.gasLimit).with_warm_accounts([from, to]);
        meter.charge(intrinsic_gas(&request.input, false))?;

        debug!("transfer value to contract");
        self.world.transfer(from, to, request.value)?;

        let contract =
            self.contracts.get_mut(&to).ok_or(FundMePanic::ContractDoesNotExist { address: to })?;
        let mut ctx =
            CallContext { sender: from, value: request.value, gas: &mut meter, host: &mut self.world };
        let action = contract.execute(call, &mut ctx)?;
        Ok((meter.used(), action))
    }

    /// Charges a deployment, applies it and mines it into a new block.
    fn settle_deployment(
        &mut self,
        deployer: Address,
        address: Address,
        gas_used: u64,
        action: ReceiptAction,
        apply: impl FnOnce(&mut Self),
    ) -> Result<TransactionReceipt, FundMeError> {
        debug!("verify deployer can pay fee");
        let fee = crate::u256::mul(U256::from(gas_used), U256::from(self.config.gas_price))?;
        let balance = self.balance_of(deployer);
        if balance < fee {
            return Err(FundMePanic::InsufficientBalance { account: deployer, amount: fee, balance }
                .into());
        }

        apply(self);
        let nonce = self.nonce_of(deployer);
        let mut payload = deployer.to_vec();
        payload.extend_from_slice(&nonce.to_be_bytes());
        payload.extend_from_slice(address.as_slice());
        let tx_hash = keccak256(payload);
        self.mine(tx_hash, deployer, None, Some(address), gas_used, action)
    }

    /// Charges the gas fee to the sender, bumps its nonce and mines a new block.
    fn mine(
        &mut self,
        tx_hash: B256,
        from: Address,
        to: Option<Address>,
        contract_address: Option<Address>,
        gas_used: u64,
        action: ReceiptAction,
    ) -> Result<TransactionReceipt, FundMeError> {
        let receipt = TransactionReceipt {
            tx_hash,
            block_number: self.block_number + 1,
            from,
            to,
            contract_address,
            gas_used,
            effective_gas_price: self.config.gas_price,
            action,
        };

        debug!("charge gas fee");
        self.world.debit(from, receipt.gas_cost())?;
        self.world.increment_nonce(from);

        self.block_number += 1;
        self.timestamp = self.timestamp.max(time_now());
        info!(
            "└── Block {}: {} gas × {} wei = {} wei",
            self.block_number,
            gas_used,
            self.config.gas_price,
            receipt.gas_cost()
        );
        Ok(receipt)
    }
}

impl std::fmt::Debug for LocalChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalChain")
            .field("config", &self.config)
            .field("block_number", &self.block_number)
            .field("accounts", &self.accounts())
            .field("contracts", &self.contracts.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloy_signer::SignerSync;

    use super::*;
    use crate::{
        errors::FundMeRevert,
        feed::{DECIMALS, INITIAL_ANSWER},
        signing::sign_transaction,
    };

    fn setup() -> (LocalChain, Address) {
        let config = ChainConfig { accounts: 3, ..ChainConfig::default() };
        let mut chain = LocalChain::new(config).unwrap();
        let deployer = chain.signer(0).unwrap().address();
        let answer = I256::try_from(INITIAL_ANSWER).unwrap();
        let feed = chain.deploy_price_feed(deployer, DECIMALS, answer).unwrap();
        let feed = feed.contract_address.unwrap();
        let fund_me = chain.deploy_fund_me(deployer, feed).unwrap();
        (chain, fund_me.contract_address.unwrap())
    }

    #[test]
    fn test_new_funds_accounts() {
        let chain = LocalChain::new(ChainConfig { accounts: 2, ..ChainConfig::default() }).unwrap();
        assert_eq!(chain.accounts().len(), 2);
        for account in chain.accounts() {
            assert_eq!(chain.balance_of(account), ether(DEFAULT_INITIAL_BALANCE_ETH));
            assert_eq!(chain.nonce_of(account), 0);
        }
        assert!(chain.signer(2).is_err());
    }

    #[test]
    fn test_deployments_bump_nonce_and_charge_deployer() {
        let (chain, fund_me) = setup();
        let deployer = chain.signer(0).unwrap().address();
        assert_eq!(chain.nonce_of(deployer), 2);
        assert_eq!(chain.block_number(), 2);
        assert!(chain.balance_of(deployer) < ether(DEFAULT_INITIAL_BALANCE_ETH));
        assert_eq!(chain.fund_me(fund_me).unwrap().get_owner(), deployer);
        assert_eq!(fund_me, deployer.create(1));
    }

    #[test]
    fn test_deploy_fund_me_without_feed() {
        let mut chain = LocalChain::new(ChainConfig { accounts: 1, ..ChainConfig::default() }).unwrap();
        let deployer = chain.signer(0).unwrap().address();
        let result = chain.deploy_fund_me(deployer, Address::repeat_byte(0xfe));
        assert!(matches!(
            result,
            Err(FundMeError::Panic(FundMePanic::PriceFeedDoesNotExist { .. }))
        ));
        assert_eq!(chain.nonce_of(deployer), 0);
    }

    #[test]
    fn test_send_charges_value_and_gas() {
        let (mut chain, fund_me) = setup();
        let signer = chain.signer(1).unwrap().clone();
        let before = chain.balance_of(signer.address());

        let request =
            chain.transaction_request(signer.address(), fund_me, ether(1), FundMeCall::Fund);
        let tx = sign_transaction(&signer, request).unwrap();
        let receipt = chain.send(&tx).unwrap();

        assert_eq!(chain.balance_of(signer.address()), before - ether(1) - receipt.gas_cost());
        assert_eq!(chain.balance_of(fund_me), ether(1));
        assert_eq!(chain.nonce_of(signer.address()), 1);
        assert!(receipt.gas_used > gas::TX_BASE);
    }

    #[test]
    fn test_send_rejects_replayed_nonce() {
        let (mut chain, fund_me) = setup();
        let signer = chain.signer(1).unwrap().clone();
        let request =
            chain.transaction_request(signer.address(), fund_me, ether(1), FundMeCall::Fund);
        let tx = sign_transaction(&signer, request).unwrap();
        chain.send(&tx).unwrap();

        let result = chain.send(&tx);
        assert!(matches!(result, Err(FundMeError::Panic(FundMePanic::NonceMismatch { .. }))));
        assert_eq!(chain.balance_of(fund_me), ether(1));
    }

    #[test]
    fn test_send_rejects_wrong_chain_id() {
        let (mut chain, fund_me) = setup();
        let signer = chain.signer(1).unwrap().clone();
        let mut request =
            chain.transaction_request(signer.address(), fund_me, ether(1), FundMeCall::Fund);
        request.chainId = 1;
        let tx = sign_transaction(&signer, request).unwrap();
        let result = chain.send(&tx);
        assert!(matches!(result, Err(FundMeError::Panic(FundMePanic::ChainIdMismatch { .. }))));
    }

    #[test]
    fn test_send_rejects_unaffordable_transaction() {
        let (mut chain, fund_me) = setup();
        let signer = chain.signer(1).unwrap().clone();
        chain.set_balance(signer.address(), ether(1));
        let request =
            chain.transaction_request(signer.address(), fund_me, ether(1), FundMeCall::Fund);
        let tx = sign_transaction(&signer, request).unwrap();
        let result = chain.send(&tx);
        assert!(matches!(
            result,
            Err(FundMeError::Panic(FundMePanic::InsufficientBalance { .. }))
        ));
        assert_eq!(chain.balance_of(signer.address()), ether(1));
    }

    #[test]
    fn test_failed_execution_restores_state() {
        let (mut chain, fund_me) = setup();
        let signer = chain.signer(1).unwrap().clone();
        let before = chain.balance_of(signer.address());
        let block = chain.block_number();

        let request = chain.transaction_request(
            signer.address(),
            fund_me,
            U256::from(1),
            FundMeCall::Fund,
        );
        let tx = sign_transaction(&signer, request).unwrap();
        let err = chain.send(&tx).unwrap_err();

        assert!(matches!(err.as_revert(), Some(FundMeRevert::InsufficientContribution { .. })));
        assert_eq!(chain.balance_of(signer.address()), before);
        assert_eq!(chain.balance_of(fund_me), U256::ZERO);
        assert_eq!(chain.nonce_of(signer.address()), 0);
        assert_eq!(chain.block_number(), block);
    }

    #[test]
    fn test_send_rejects_forged_signature() {
        let (mut chain, fund_me) = setup();
        let signer = chain.signer(1).unwrap().clone();
        let request =
            chain.transaction_request(signer.address(), fund_me, ether(1), FundMeCall::Fund);
        let mut tx = sign_transaction(&signer, request).unwrap();
        let other = chain.signer(2).unwrap();
        tx.signature = other.sign_message_sync(b"other").unwrap().as_bytes().to_vec();

        // The signature recovers to some account that has neither the nonce nor the funds.
        assert!(chain.send(&tx).is_err());
        assert_eq!(chain.balance_of(fund_me), U256::ZERO);
    }

    #[test]
    fn test_update_price() {
        let (mut chain, fund_me) = setup();
        let feed = chain.fund_me(fund_me).unwrap().get_price_feed();
        let answer = I256::try_from(3000_00000000i64).unwrap();
        chain.update_price(feed, answer).unwrap();
        assert_eq!(chain.price_feed(feed).unwrap().latest_answer(), answer);
        assert_eq!(chain.get_version(fund_me).unwrap(), U256::ZERO);
    }
}
