//! Client.
//!
//! This module contains [`FundMeContract`], a handle to a deployed FundMe contract, and
//! [`ConnectedFundMe`], the same handle bound to a signer that submits state-changing calls.

use alloy_primitives::{Address, U256};
use alloy_signer_local::PrivateKeySigner;

use crate::{
    chain::LocalChain,
    errors::{FundMeError, FundMePanic},
    receipts::TransactionReceipt,
    signing::sign_transaction,
    state::LocalFundMe,
    transactions::FundMeCall,
};

/// A handle to a FundMe contract deployed on a [`LocalChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundMeContract {
    address: Address,
}

impl FundMeContract {
    /// Creates a handle to the contract deployed at `address`.
    #[must_use]
    pub fn at(address: Address) -> Self {
        Self { address }
    }

    /// Returns the address of the contract.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Binds the handle to `signer`.
    #[must_use]
    pub fn connect<'a>(&self, signer: &'a PrivateKeySigner) -> ConnectedFundMe<'a> {
        ConnectedFundMe { contract: *self, signer }
    }

    /// Returns the owner.
    pub fn get_owner(&self, chain: &LocalChain) -> Result<Address, FundMeError> {
        Ok(self.state(chain)?.get_owner())
    }

    /// Returns the address of the price feed.
    pub fn get_price_feed(&self, chain: &LocalChain) -> Result<Address, FundMeError> {
        Ok(self.state(chain)?.get_price_feed())
    }

    /// Returns the funder at `index`.
    pub fn get_funder(&self, chain: &LocalChain, index: usize) -> Result<Address, FundMeError> {
        Ok(self.state(chain)?.get_funder(index)?)
    }

    /// Returns the amount `funder` contributed since the last withdrawal.
    pub fn get_address_to_amount_funded(
        &self,
        chain: &LocalChain,
        funder: Address,
    ) -> Result<U256, FundMeError> {
        Ok(self.state(chain)?.get_address_to_amount_funded(funder))
    }

    /// Returns the version of the price feed.
    pub fn get_version(&self, chain: &LocalChain) -> Result<U256, FundMeError> {
        chain.get_version(self.address)
    }

    /// Returns the native balance held by the contract.
    #[must_use]
    pub fn balance(&self, chain: &LocalChain) -> U256 {
        chain.balance_of(self.address)
    }

    fn state<'c>(&self, chain: &'c LocalChain) -> Result<&'c LocalFundMe, FundMePanic> {
        chain.fund_me(self.address).ok_or(FundMePanic::ContractDoesNotExist { address: self.address })
    }
}

/// A [`FundMeContract`] bound to the signer that sends its transactions.
#[derive(Debug, Clone, Copy)]
pub struct ConnectedFundMe<'a> {
    contract: FundMeContract,
    signer: &'a PrivateKeySigner,
}

impl ConnectedFundMe<'_> {
    /// Returns the unbound handle.
    #[must_use]
    pub fn contract(&self) -> FundMeContract {
        self.contract
    }

    /// Returns the address of the bound signer.
    #[must_use]
    pub fn sender(&self) -> Address {
        self.signer.address()
    }

    /// Contributes `value` by calling `fund()`.
    pub fn fund(
        &self,
        chain: &mut LocalChain,
        value: U256,
    ) -> Result<TransactionReceipt, FundMeError> {
        self.send(chain, value, FundMeCall::Fund)
    }

    /// Calls `withdraw()`.
    pub fn withdraw(&self, chain: &mut LocalChain) -> Result<TransactionReceipt, FundMeError> {
        self.send(chain, U256::ZERO, FundMeCall::Withdraw)
    }

    /// Calls `cheaperWithdraw()`.
    pub fn cheaper_withdraw(
        &self,
        chain: &mut LocalChain,
    ) -> Result<TransactionReceipt, FundMeError> {
        self.send(chain, U256::ZERO, FundMeCall::CheaperWithdraw)
    }

    /// Sends `value` to the contract with empty calldata.
    pub fn send_value(
        &self,
        chain: &mut LocalChain,
        value: U256,
    ) -> Result<TransactionReceipt, FundMeError> {
        self.send(chain, value, FundMeCall::Receive)
    }

    /// Signs and sends a call with the signer's next nonce.
    fn send(
        &self,
        chain: &mut LocalChain,
        value: U256,
        call: FundMeCall,
    ) -> Result<TransactionReceipt, FundMeError> {
        let request = chain.transaction_request(self.sender(), self.contract.address, value, call);
        let tx = sign_transaction(self.signer, request)?;
        chain.send(&tx)
    }
}
