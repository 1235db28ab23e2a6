//! U256 Safe Arithmetic Operations.
//!
//! This module contains the safe arithmetic operations for the U256 type.

use alloy_primitives::U256;

use crate::errors::FundMePanic;

/// Safe addition of two U256 values.
pub fn add(a: U256, b: U256) -> Result<U256, FundMePanic> {
    a.checked_add(b).ok_or(FundMePanic::ArithmeticOverflow)
}

/// Safe subtraction of two U256 values.
pub fn sub(a: U256, b: U256) -> Result<U256, FundMePanic> {
    a.checked_sub(b).ok_or(FundMePanic::ArithmeticOverflow)
}

/// Safe multiplication of two U256 values.
pub fn mul(a: U256, b: U256) -> Result<U256, FundMePanic> {
    a.checked_mul(b).ok_or(FundMePanic::ArithmeticOverflow)
}

/// Safe division of two U256 values.
pub fn div(a: U256, b: U256) -> Result<U256, FundMePanic> {
    a.checked_div(b).ok_or(FundMePanic::DivisionByZero)
}

/// Returns `10^exponent`.
pub fn pow10(exponent: u8) -> Result<U256, FundMePanic> {
    U256::from(10).checked_pow(U256::from(exponent)).ok_or(FundMePanic::ArithmeticOverflow)
}
