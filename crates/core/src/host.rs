//! Host Environment.
//!
//! This module contains the interface between contract code and the chain executing it. The
//! contract only needs to read prices and balances and to move native currency.

use alloy_primitives::{Address, U256};

use crate::{errors::FundMePanic, feed::PriceFeed, gas::GasMeter};

/// The services the chain provides to executing contract code.
pub trait Host {
    /// Returns the price feed deployed at `address`.
    fn price_feed(&self, address: Address) -> Option<&dyn PriceFeed>;

    /// Returns the native balance of `account`.
    fn balance(&self, account: Address) -> U256;

    /// Moves `amount` from `from` to `to`. Either both balances change or neither does.
    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), FundMePanic>;
}

/// The context of a single call into a contract.
pub struct CallContext<'a, H: Host> {
    /// The immediate caller.
    pub sender: Address,
    /// The native amount attached to the call. It is already credited to the contract.
    pub value: U256,
    /// The meter charged for the call.
    pub gas: &'a mut GasMeter,
    /// The executing chain.
    pub host: &'a mut H,
}
