//! FundMe Core Library.
//!
//! A crowdfunding contract modelled as a state machine: contributors fund it with native currency
//! as long as the contribution is worth at least [`state::MINIMUM_USD`] according to a price feed,
//! and the owner fixed at deployment drains the whole balance, resetting the ledger.
//!
//! The contract runs on a [`chain::LocalChain`], an in-memory development chain that verifies
//! signed transactions, meters gas and rolls back every failed transaction atomically.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]
#![warn(missing_docs)]

pub mod chain;
pub mod client;
pub mod converter;
pub mod deployments;
pub mod errors;
pub mod feed;
pub mod gas;
pub mod host;
pub mod receipts;
pub mod signing;
pub mod sol;
pub mod sparse;
pub mod state;
pub mod storage;
pub mod transactions;
pub mod u256;
