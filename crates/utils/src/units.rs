use alloy_primitives::U256;

/// The number of wei in one ether.
pub const WEI_PER_ETHER: u128 = 10u128.pow(18);

/// The number of wei in one gwei.
pub const WEI_PER_GWEI: u128 = 10u128.pow(9);

/// Returns `amount` ether expressed in wei.
#[must_use]
pub fn ether(amount: u64) -> U256 {
    U256::from(amount) * U256::from(WEI_PER_ETHER)
}

/// Returns `amount` gwei expressed in wei.
#[must_use]
pub fn gwei(amount: u64) -> U256 {
    U256::from(amount) * U256::from(WEI_PER_GWEI)
}
