//! Price Conversion.
//!
//! This module converts native-currency amounts into USD using a [`PriceFeed`]. All USD values are
//! fixed point with 18 decimals, the same scale as wei.

use alloy_primitives::{I256, U256};
use fundme_utils::WEI_PER_ETHER;

use crate::{errors::FundMePanic, feed::PriceFeed, u256};

/// The number of decimals of the values returned by [`get_price`] and [`get_conversion_rate`].
pub const PRICE_DECIMALS: u8 = 18;

/// Returns the price of one ether in USD, scaled to [`PRICE_DECIMALS`] decimals.
pub fn get_price(feed: &dyn PriceFeed) -> Result<U256, FundMePanic> {
    let answer = feed.latest_round_data().answer;
    if answer <= I256::ZERO {
        return Err(FundMePanic::InvalidPrice { answer });
    }
    let answer = answer.into_raw();

    let decimals = feed.decimals();
    if decimals <= PRICE_DECIMALS {
        u256::mul(answer, u256::pow10(PRICE_DECIMALS - decimals)?)
    } else {
        u256::div(answer, u256::pow10(decimals - PRICE_DECIMALS)?)
    }
}

/// Returns the USD value of `eth_amount` wei, scaled to [`PRICE_DECIMALS`] decimals.
pub fn get_conversion_rate(eth_amount: U256, feed: &dyn PriceFeed) -> Result<U256, FundMePanic> {
    let price = get_price(feed)?;
    u256::div(u256::mul(price, eth_amount)?, U256::from(WEI_PER_ETHER))
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;
    use fundme_utils::ether;

    use super::*;
    use crate::feed::{MockV3Aggregator, DECIMALS, INITIAL_ANSWER};

    fn feed(decimals: u8, answer: i64) -> MockV3Aggregator {
        MockV3Aggregator::new(Address::ZERO, decimals, I256::try_from(answer).unwrap(), 0)
    }

    #[test]
    fn test_get_price_scales_to_18_decimals() {
        let price = get_price(&feed(DECIMALS, INITIAL_ANSWER)).unwrap();
        assert_eq!(price, ether(2000));
    }

    #[test]
    fn test_get_price_with_more_than_18_decimals() {
        // 2 USD with 20 decimals.
        let feed = MockV3Aggregator::new(
            Address::ZERO,
            20,
            I256::from_raw(U256::from(2) * U256::from(10).pow(U256::from(20))),
            0,
        );
        assert_eq!(get_price(&feed).unwrap(), ether(2));
    }

    #[test]
    fn test_get_price_rejects_non_positive_answers() {
        assert!(matches!(
            get_price(&feed(DECIMALS, 0)),
            Err(FundMePanic::InvalidPrice { .. })
        ));
        assert!(matches!(
            get_price(&feed(DECIMALS, -1)),
            Err(FundMePanic::InvalidPrice { .. })
        ));
    }

    #[test]
    fn test_get_conversion_rate() {
        let feed = feed(DECIMALS, INITIAL_ANSWER);
        assert_eq!(get_conversion_rate(ether(1), &feed).unwrap(), ether(2000));
        assert_eq!(get_conversion_rate(U256::ZERO, &feed).unwrap(), U256::ZERO);

        // 0.025 ETH at 2000 USD is exactly 50 USD.
        let amount = ether(25) / U256::from(1000);
        assert_eq!(get_conversion_rate(amount, &feed).unwrap(), ether(50));
    }

    #[test]
    fn test_get_conversion_rate_overflow() {
        let feed = feed(DECIMALS, INITIAL_ANSWER);
        assert_eq!(
            get_conversion_rate(U256::MAX, &feed),
            Err(FundMePanic::ArithmeticOverflow)
        );
    }
}
