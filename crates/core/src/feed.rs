//! Price Feeds.
//!
//! This module contains the [`PriceFeed`] oracle interface the contract reads the ETH/USD price
//! from, and [`MockV3Aggregator`], an in-memory aggregator deployed on development chains.

use std::collections::BTreeMap;

use alloy_primitives::{Address, I256, U256};
use serde::{Deserialize, Serialize};

use crate::errors::FundMeRevert;

/// The decimals of the mock aggregator deployed on development chains.
pub const DECIMALS: u8 = 8;

/// The initial answer of the mock aggregator: 2000 USD with [`DECIMALS`] decimals.
pub const INITIAL_ANSWER: i64 = 2000_00000000;

/// A single round reported by an aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundData {
    /// The round id.
    pub round_id: u64,
    /// The price, with the feed's decimals.
    pub answer: I256,
    /// When the round started.
    pub started_at: u64,
    /// When the round was last updated.
    pub updated_at: u64,
    /// The round the answer was computed in.
    pub answered_in_round: u64,
}

/// A read-only price oracle.
pub trait PriceFeed: std::fmt::Debug {
    /// The address the feed is deployed at.
    fn address(&self) -> Address;

    /// The number of decimals of the answers.
    fn decimals(&self) -> u8;

    /// A human-readable description of the feed.
    fn description(&self) -> &str;

    /// The version of the aggregator.
    fn version(&self) -> U256;

    /// The most recent round.
    fn latest_round_data(&self) -> RoundData;

    /// A historical round.
    fn get_round_data(&self, round_id: u64) -> Result<RoundData, FundMeRevert>;
}

/// An aggregator whose answers are set directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockV3Aggregator {
    address: Address,
    decimals: u8,
    latest_round: u64,
    rounds: BTreeMap<u64, RoundData>,
}

impl MockV3Aggregator {
    /// The version reported by the mock.
    pub const VERSION: u64 = 0;

    /// The description reported by the mock.
    pub const DESCRIPTION: &'static str = "v0.6/tests/MockV3Aggregator.sol";

    /// Creates a new aggregator and reports `initial_answer` as its first round.
    #[must_use]
    pub fn new(address: Address, decimals: u8, initial_answer: I256, timestamp: u64) -> Self {
        let mut aggregator = Self { address, decimals, latest_round: 0, rounds: BTreeMap::new() };
        aggregator.update_answer(initial_answer, timestamp);
        aggregator
    }

    /// Reports a new answer in a fresh round.
    pub fn update_answer(&mut self, answer: I256, timestamp: u64) {
        self.latest_round += 1;
        let round_id = self.latest_round;
        self.rounds.insert(
            round_id,
            RoundData {
                round_id,
                answer,
                started_at: timestamp,
                updated_at: timestamp,
                answered_in_round: round_id,
            },
        );
    }

    /// Overwrites a round and makes it the latest one.
    pub fn update_round_data(
        &mut self,
        round_id: u64,
        answer: I256,
        updated_at: u64,
        started_at: u64,
    ) {
        self.latest_round = round_id;
        self.rounds.insert(
            round_id,
            RoundData { round_id, answer, started_at, updated_at, answered_in_round: round_id },
        );
    }

    /// The latest reported answer.
    #[must_use]
    pub fn latest_answer(&self) -> I256 {
        self.latest_round_data().answer
    }

    /// The id of the latest round.
    #[must_use]
    pub fn latest_round(&self) -> u64 {
        self.latest_round
    }
}

impl PriceFeed for MockV3Aggregator {
    fn address(&self) -> Address {
        self.address
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }

    fn version(&self) -> U256 {
        U256::from(Self::VERSION)
    }

    fn latest_round_data(&self) -> RoundData {
        // The constructor always reports a first round.
        self.rounds.get(&self.latest_round).copied().unwrap_or(RoundData {
            round_id: self.latest_round,
            answer: I256::ZERO,
            started_at: 0,
            updated_at: 0,
            answered_in_round: self.latest_round,
        })
    }

    fn get_round_data(&self, round_id: u64) -> Result<RoundData, FundMeRevert> {
        self.rounds.get(&round_id).copied().ok_or(FundMeRevert::RoundNotFound { round_id })
    }
}
