//! Receipts.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// The effect of a successfully executed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ReceiptAction {
    DeployPriceFeed { address: Address },
    DeployFundMe { address: Address, owner: Address, price_feed: Address },
    Fund(FundOutcome),
    Withdraw(WithdrawOutcome),
    CheaperWithdraw(WithdrawOutcome),
}

/// A contribution recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct FundOutcome {
    pub funder: Address,
    pub amount: U256,
    pub total: U256,
}

/// A withdrawal to the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct WithdrawOutcome {
    pub owner: Address,
    pub amount: U256,
    pub funders: u64,
}

/// The receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct TransactionReceipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub from: Address,
    pub to: Option<Address>,
    pub contract_address: Option<Address>,
    pub gas_used: u64,
    pub effective_gas_price: u128,
    pub action: ReceiptAction,
}

impl TransactionReceipt {
    /// The native amount the sender paid for gas.
    #[must_use]
    pub fn gas_cost(&self) -> U256 {
        U256::from(self.gas_used) * U256::from(self.effective_gas_price)
    }
}
