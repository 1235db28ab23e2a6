//! Errors.
//!
//! This module contains error types that can be emitted by the crate.

use alloy_primitives::{Address, Bytes, I256, U256};
use alloy_sol_types::{Panic, Revert, SolError};
use std::error::Error as StdError;
use thiserror::Error;

use crate::sol::IFundMe;

/// The message a contribution below the minimum reverts with.
pub const INSUFFICIENT_FUNDS_MESSAGE: &str = "Not enough funds.!";

/// The `Panic(uint256)` code for an out-of-bounds array access.
pub const PANIC_ARRAY_OUT_OF_BOUNDS: u64 = 0x32;

/// The error that can be emitted while executing a transaction against the contract.
#[derive(Debug)]
pub enum FundMeError {
    /// The contract rejected the call. Callers can branch on the variant or its revert data.
    Revert(FundMeRevert),
    /// The call could not be executed at all.
    Panic(FundMePanic),
}

/// A revert raised by contract code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum FundMeRevert {
    #[error("{message}")]
    InsufficientContribution { message: String },

    #[error("FundMe__NotOwner()")]
    NotOwner,

    #[error("Funder index out of bounds: {index} >= {len}")]
    FunderIndexOutOfBounds { index: usize, len: usize },

    #[error("No data present for round {round_id}")]
    RoundNotFound { round_id: u64 },
}

/// An unrecoverable error raised by the chain or the host environment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum FundMePanic {
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid price feed answer: {answer}")]
    InvalidPrice { answer: I256 },

    #[error("Price feed does not exist: {address}")]
    PriceFeedDoesNotExist { address: Address },

    #[error("Contract does not exist: {address}")]
    ContractDoesNotExist { address: Address },

    #[error("Insufficient balance for account {account}: {amount} > {balance}")]
    InsufficientBalance { account: Address, amount: U256, balance: U256 },

    #[error("Invalid signature: {error}")]
    InvalidSignature { error: String },

    #[error("Invalid account key: {error}")]
    InvalidAccountKey { error: String },

    #[error("Nonce mismatch for account {account}: {expected} != {actual}")]
    NonceMismatch { account: Address, expected: u64, actual: u64 },

    #[error("Chain id mismatch: {expected} != {actual}")]
    ChainIdMismatch { expected: u64, actual: u64 },

    #[error("Out of gas: {used} > {limit}")]
    OutOfGas { used: u64, limit: u64 },

    #[error("Gas limit {gas_limit} exceeds block gas limit {block_gas_limit}")]
    GasLimitExceedsBlock { gas_limit: u64, block_gas_limit: u64 },

    #[error("Unknown named account: {name}")]
    UnknownNamedAccount { name: String },

    #[error("Account index out of range: {index} >= {len}")]
    AccountIndexOutOfRange { index: usize, len: usize },
}

impl FundMeRevert {
    /// Returns the ABI-encoded revert data a caller would observe.
    ///
    /// Message reverts use `Error(string)`, the ownership check uses the `FundMe__NotOwner()`
    /// custom error and out-of-bounds reads use `Panic(0x32)`.
    #[must_use]
    pub fn revert_data(&self) -> Bytes {
        match self {
            FundMeRevert::InsufficientContribution { message } => {
                Revert { reason: message.clone() }.abi_encode().into()
            }
            FundMeRevert::NotOwner => {
                <IFundMe::FundMe__NotOwner as SolError>::SELECTOR.to_vec().into()
            }
            FundMeRevert::FunderIndexOutOfBounds { .. } => {
                Panic { code: U256::from(PANIC_ARRAY_OUT_OF_BOUNDS) }.abi_encode().into()
            }
            FundMeRevert::RoundNotFound { .. } => {
                Revert { reason: "No data present".to_string() }.abi_encode().into()
            }
        }
    }
}

impl FundMeError {
    /// Returns the revert if the contract rejected the call.
    #[must_use]
    pub fn as_revert(&self) -> Option<&FundMeRevert> {
        match self {
            FundMeError::Revert(err) => Some(err),
            FundMeError::Panic(_) => None,
        }
    }

    /// Returns the ABI-encoded revert data, if any.
    #[must_use]
    pub fn revert_data(&self) -> Option<Bytes> {
        self.as_revert().map(FundMeRevert::revert_data)
    }
}

impl From<FundMeRevert> for FundMeError {
    fn from(err: FundMeRevert) -> Self {
        FundMeError::Revert(err)
    }
}

impl From<FundMePanic> for FundMeError {
    fn from(err: FundMePanic) -> Self {
        FundMeError::Panic(err)
    }
}

impl StdError for FundMeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            FundMeError::Revert(err) => Some(err),
            FundMeError::Panic(err) => Some(err),
        }
    }
}

impl std::fmt::Display for FundMeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FundMeError::Revert(err) => write!(f, "FundMe Revert: {err}"),
            FundMeError::Panic(err) => write!(f, "FundMe Panic: {err}"),
        }
    }
}
