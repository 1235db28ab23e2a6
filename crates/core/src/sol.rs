//! Solidity types.
//!
//! This module contains the ABI of the FundMe contract and the transaction payload that accounts
//! sign before submitting calls to the [`crate::chain::LocalChain`].

use alloy_sol_types::sol;
use serde::{Deserialize, Serialize};

sol! {
    /// @notice The external interface of the FundMe contract.
    interface IFundMe {
        /// @notice Raised when anyone but the owner tries to withdraw.
        error FundMe__NotOwner();

        /// @notice Contributes the attached value.
        function fund() external payable;

        /// @notice Sends the whole balance to the owner and resets the ledger.
        function withdraw() external;

        /// @notice Same as `withdraw`, reading the funder list from storage only once.
        function cheaperWithdraw() external;

        function getAddressToAmountFunded(address fundingAddress) external view returns (uint256);
        function getFunder(uint256 index) external view returns (address);
        function getOwner() external view returns (address);
        function getPriceFeed() external view returns (address);
        function getVersion() external view returns (uint256);
    }

    /// @notice A call submitted to the chain.
    ///
    /// The ABI encoding of this struct is what the sender signs.
    #[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    struct TransactionRequest {
        /// @notice The chain the request is meant for.
        uint64 chainId;
        /// @notice The sender's transaction count.
        uint64 nonce;
        /// @notice The contract being called.
        address to;
        /// @notice The native amount attached to the call.
        uint256 value;
        /// @notice The maximum gas the call may consume.
        uint64 gasLimit;
        /// @notice The calldata.
        bytes input;
    }
}
