//! Gas Metering.
//!
//! This module contains the gas schedule and the [`GasMeter`] charged while executing a
//! transaction. Storage and account accesses follow the warm/cold pricing of EIP-2929. Refunds
//! are not modelled.

use std::collections::BTreeSet;

use alloy_primitives::{Address, U256};

use crate::errors::FundMePanic;

/// The base cost of every transaction.
pub const TX_BASE: u64 = 21_000;

/// The additional base cost of a contract creation.
pub const TX_CREATE: u64 = 32_000;

/// The cost of a zero calldata byte.
pub const CALLDATA_ZERO_BYTE: u64 = 4;

/// The cost of a non-zero calldata byte.
pub const CALLDATA_NONZERO_BYTE: u64 = 16;

/// The surcharge of the first access to a storage slot.
pub const COLD_SLOAD: u64 = 2_100;

/// The surcharge of the first access to an account.
pub const COLD_ACCOUNT_ACCESS: u64 = 2_600;

/// The cost of accessing an already accessed slot or account.
pub const WARM_ACCESS: u64 = 100;

/// Writing a non-zero value to an empty slot.
pub const SSTORE_SET: u64 = 20_000;

/// Changing a non-empty slot.
pub const SSTORE_RESET: u64 = 2_900;

/// Attaching value to a call.
pub const CALL_VALUE: u64 = 9_000;

/// Reading or writing a word of memory, or pushing an immutable.
pub const VERY_LOW: u64 = 3;

/// Reading the executing contract's balance.
pub const SELF_BALANCE: u64 = 5;

/// The gas limit used for calls that don't specify one.
pub const DEFAULT_CALL_GAS_LIMIT: u64 = 3_000_000;

/// The gas limit of a block.
pub const BLOCK_GAS_LIMIT: u64 = 30_000_000;

/// A storage slot of the FundMe contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Slot {
    /// The price feed address.
    PriceFeed,
    /// The length of the funder list.
    FundersLength,
    /// An element of the funder list.
    Funder(usize),
    /// The ledger entry of an address.
    AmountFunded(Address),
}

/// Returns the intrinsic gas of a transaction with the given calldata.
#[must_use]
pub fn intrinsic_gas(input: &[u8], create: bool) -> u64 {
    let calldata: u64 = input
        .iter()
        .map(|byte| if *byte == 0 { CALLDATA_ZERO_BYTE } else { CALLDATA_NONZERO_BYTE })
        .sum();
    let base = if create { TX_BASE + TX_CREATE } else { TX_BASE };
    base + calldata
}

/// Tracks the gas consumed by a single transaction.
#[derive(Debug, Clone)]
pub struct GasMeter {
    limit: u64,
    used: u64,
    warm_slots: BTreeSet<Slot>,
    warm_accounts: BTreeSet<Address>,
}

impl GasMeter {
    /// Creates a meter that fails once more than `limit` gas is consumed.
    #[must_use]
    pub fn new(limit: u64) -> Self {
        Self { limit, used: 0, warm_slots: BTreeSet::new(), warm_accounts: BTreeSet::new() }
    }

    /// Marks accounts as already accessed, e.g. the sender and the callee.
    #[must_use]
    pub fn with_warm_accounts(mut self, accounts: impl IntoIterator<Item = Address>) -> Self {
        self.warm_accounts.extend(accounts);
        self
    }

    /// The gas consumed so far.
    #[must_use]
    pub fn used(&self) -> u64 {
        self.used
    }

    /// The gas limit.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Consumes `amount` gas.
    pub fn charge(&mut self, amount: u64) -> Result<(), FundMePanic> {
        let used = self.used.saturating_add(amount);
        if used > self.limit {
            return Err(FundMePanic::OutOfGas { used, limit: self.limit });
        }
        self.used = used;
        Ok(())
    }

    /// Charges a storage read.
    pub fn sload(&mut self, slot: Slot) -> Result<(), FundMePanic> {
        let cost = if self.warm_slots.insert(slot) { COLD_SLOAD } else { WARM_ACCESS };
        self.charge(cost)
    }

    /// Charges a storage write of `after` over `before`.
    pub fn sstore(&mut self, slot: Slot, before: U256, after: U256) -> Result<(), FundMePanic> {
        let cold = if self.warm_slots.insert(slot) { COLD_SLOAD } else { 0 };
        let cost = if before == after {
            WARM_ACCESS
        } else if before.is_zero() {
            SSTORE_SET
        } else {
            SSTORE_RESET
        };
        self.charge(cold + cost)
    }

    /// Charges an access to another account.
    pub fn account_access(&mut self, account: Address) -> Result<(), FundMePanic> {
        let cost =
            if self.warm_accounts.insert(account) { COLD_ACCOUNT_ACCESS } else { WARM_ACCESS };
        self.charge(cost)
    }

    /// Charges `words` memory reads or writes.
    pub fn memory(&mut self, words: u64) -> Result<(), FundMePanic> {
        self.charge(VERY_LOW.saturating_mul(words))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intrinsic_gas() {
        assert_eq!(intrinsic_gas(&[], false), TX_BASE);
        assert_eq!(intrinsic_gas(&[0, 1], false), TX_BASE + 4 + 16);
        assert_eq!(intrinsic_gas(&[], true), TX_BASE + TX_CREATE);
    }

    #[test]
    fn test_sload_cold_then_warm() {
        let mut meter = GasMeter::new(u64::MAX);
        meter.sload(Slot::FundersLength).unwrap();
        meter.sload(Slot::FundersLength).unwrap();
        assert_eq!(meter.used(), COLD_SLOAD + WARM_ACCESS);
    }

    #[test]
    fn test_sstore_costs() {
        let mut meter = GasMeter::new(u64::MAX);
        let slot = Slot::AmountFunded(Address::ZERO);

        // Cold write creating the slot.
        meter.sstore(slot, U256::ZERO, U256::from(1)).unwrap();
        assert_eq!(meter.used(), COLD_SLOAD + SSTORE_SET);

        // Warm update.
        meter.sstore(slot, U256::from(1), U256::from(2)).unwrap();
        assert_eq!(meter.used(), COLD_SLOAD + SSTORE_SET + SSTORE_RESET);

        // Warm no-op.
        meter.sstore(slot, U256::from(2), U256::from(2)).unwrap();
        assert_eq!(meter.used(), COLD_SLOAD + SSTORE_SET + SSTORE_RESET + WARM_ACCESS);
    }

    #[test]
    fn test_warm_accounts() {
        let sender = Address::repeat_byte(1);
        let mut meter = GasMeter::new(u64::MAX).with_warm_accounts([sender]);
        meter.account_access(sender).unwrap();
        meter.account_access(Address::repeat_byte(2)).unwrap();
        assert_eq!(meter.used(), WARM_ACCESS + COLD_ACCOUNT_ACCESS);
    }

    #[test]
    fn test_out_of_gas() {
        let mut meter = GasMeter::new(TX_BASE);
        meter.charge(TX_BASE).unwrap();
        assert_eq!(meter.charge(1), Err(FundMePanic::OutOfGas { used: TX_BASE + 1, limit: TX_BASE }));
        assert_eq!(meter.used(), TX_BASE);
    }
}
