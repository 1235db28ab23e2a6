mod common;

use alloy_primitives::{I256, U256};
use fundme_core::{
    errors::{FundMeError, FundMeRevert, INSUFFICIENT_FUNDS_MESSAGE},
    receipts::ReceiptAction,
};
use fundme_utils::ether;

use crate::common::*;

#[test]
fn test_fund_fails_without_enough_eth() {
    let mut test = setup();
    let fund_me = test.fund_me();
    let deployer = test.deployer.address();
    let starting_balance = test.chain.balance_of(deployer);

    let err = fund_me.connect(&test.deployer).fund(&mut test.chain, U256::ZERO).unwrap_err();

    let Some(FundMeRevert::InsufficientContribution { message }) = err.as_revert() else {
        panic!("expected an insufficient contribution revert, got {err:?}");
    };
    assert_eq!(message, INSUFFICIENT_FUNDS_MESSAGE);
    assert_amount_funded(&test, deployer, U256::ZERO);
    assert_no_funders(&test);

    // Rejected transactions are not charged.
    assert_balance(&test, deployer, starting_balance);
}

#[test]
fn test_fund_revert_data_is_error_string() {
    let mut test = setup();
    let fund_me = test.fund_me();
    let err = fund_me.connect(&test.deployer).fund(&mut test.chain, U256::from(1)).unwrap_err();
    let data = err.revert_data().unwrap();

    // Error(string) selector.
    assert_eq!(&data[..4], &[0x08, 0xc3, 0x79, 0xa0]);
}

#[test]
fn test_fund_updates_amount_funded() {
    let mut test = setup();
    let fund_me = test.fund_me();

    fund_me.connect(&test.deployer).fund(&mut test.chain, send_value()).unwrap();

    assert_amount_funded(&test, test.deployer.address(), send_value());
    assert_balance(&test, fund_me.address(), send_value());
}

#[test]
fn test_fund_adds_funder_to_array() {
    let mut test = setup();
    let fund_me = test.fund_me();

    let receipt = fund_me.connect(&test.deployer).fund(&mut test.chain, send_value()).unwrap();

    assert_eq!(fund_me.get_funder(&test.chain, 0).unwrap(), test.deployer.address());
    let ReceiptAction::Fund(outcome) = receipt.action else { panic!("expected fund") };
    assert_eq!(outcome.funder, test.deployer.address());
    assert_eq!(outcome.amount, send_value());
    assert_eq!(outcome.total, send_value());
}

#[test]
fn test_fund_twice_accumulates_and_lists_funder_once() {
    let mut test = setup();
    let fund_me = test.fund_me();
    let funder = test.signers[1].clone();

    fund_me.connect(&funder).fund(&mut test.chain, send_value()).unwrap();
    let receipt = fund_me.connect(&funder).fund(&mut test.chain, ether(2)).unwrap();

    assert_amount_funded(&test, funder.address(), ether(3));
    assert_eq!(fund_me.get_funder(&test.chain, 0).unwrap(), funder.address());
    assert!(matches!(
        fund_me.get_funder(&test.chain, 1),
        Err(FundMeError::Revert(FundMeRevert::FunderIndexOutOfBounds { index: 1, len: 1 }))
    ));
    let ReceiptAction::Fund(outcome) = receipt.action else { panic!("expected fund") };
    assert_eq!(outcome.total, ether(3));
}

#[test]
fn test_fund_lists_funders_in_order() {
    let mut test = setup();
    fund_from_accounts(&mut test, 3);
    let fund_me = test.fund_me();
    for index in 0..3 {
        assert_eq!(
            fund_me.get_funder(&test.chain, index).unwrap(),
            test.signers[index + 1].address()
        );
    }
    assert_balance(&test, fund_me.address(), send_value() * U256::from(3));
}

#[test]
fn test_send_value_is_treated_as_fund() {
    let mut test = setup();
    let fund_me = test.fund_me();
    let funder = test.signers[1].clone();

    fund_me.connect(&funder).send_value(&mut test.chain, send_value()).unwrap();

    assert_amount_funded(&test, funder.address(), send_value());
    assert_eq!(fund_me.get_funder(&test.chain, 0).unwrap(), funder.address());

    // The minimum also applies to plain transfers.
    let err = fund_me.connect(&funder).send_value(&mut test.chain, U256::from(1)).unwrap_err();
    assert!(matches!(err.as_revert(), Some(FundMeRevert::InsufficientContribution { .. })));
}

#[test]
fn test_fund_minimum_follows_price_feed() {
    let mut test = setup();
    let fund_me = test.fund_me();
    let funder = test.signers[1].clone();

    // 0.02 ETH is worth 40 USD at 2000 USD/ETH.
    let value = ether(2) / U256::from(100);
    let err = fund_me.connect(&funder).fund(&mut test.chain, value).unwrap_err();
    assert!(err.as_revert().is_some());

    // ... and 60 USD at 3000 USD/ETH.
    let answer = I256::try_from(3000_00000000i64).unwrap();
    test.chain.update_price(test.deployment.price_feed, answer).unwrap();
    fund_me.connect(&funder).fund(&mut test.chain, value).unwrap();
    assert_amount_funded(&test, funder.address(), value);
}
