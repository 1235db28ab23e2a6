//! Transactions.
//!
//! This module contains the calls that can be executed against the FundMe contract and the signed
//! envelope they are submitted in.

use alloy_primitives::Bytes;
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};

use crate::sol::{IFundMe, TransactionRequest};

/// A state-changing call into the FundMe contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundMeCall {
    /// Contribute the attached value.
    Fund,
    /// Send the whole balance to the owner, re-reading the funder list from storage.
    Withdraw,
    /// Send the whole balance to the owner, reading the funder list once.
    CheaperWithdraw,
    /// A plain value transfer with empty calldata.
    ///
    /// Treated as a contribution.
    Receive,
}

impl FundMeCall {
    /// Returns the calldata that encodes the call.
    #[must_use]
    pub fn calldata(&self) -> Bytes {
        match self {
            FundMeCall::Fund => IFundMe::fundCall::SELECTOR.to_vec().into(),
            FundMeCall::Withdraw => IFundMe::withdrawCall::SELECTOR.to_vec().into(),
            FundMeCall::CheaperWithdraw => IFundMe::cheaperWithdrawCall::SELECTOR.to_vec().into(),
            FundMeCall::Receive => Bytes::new(),
        }
    }

    /// Decodes calldata into a call.
    ///
    /// Calldata that matches no state-changing function falls back to [`FundMeCall::Fund`].
    #[must_use]
    pub fn decode(input: &[u8]) -> Self {
        if input.is_empty() {
            return FundMeCall::Receive;
        }
        match input.get(..4) {
            Some(selector) if selector == IFundMe::withdrawCall::SELECTOR => FundMeCall::Withdraw,
            Some(selector) if selector == IFundMe::cheaperWithdrawCall::SELECTOR => {
                FundMeCall::CheaperWithdraw
            }
            _ => FundMeCall::Fund,
        }
    }

    /// Returns the name of the contract function.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            FundMeCall::Fund => "fund",
            FundMeCall::Withdraw => "withdraw",
            FundMeCall::CheaperWithdraw => "cheaperWithdraw",
            FundMeCall::Receive => "receive",
        }
    }
}

/// A [`TransactionRequest`] together with the sender's signature over its ABI encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// The request.
    pub request: TransactionRequest,
    /// The 65-byte signature.
    pub signature: Vec<u8>,
}
