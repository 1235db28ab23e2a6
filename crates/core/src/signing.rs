//! Signing.
//!
//! This module contains the functions for signing transaction requests and recovering their
//! senders.

use alloy_primitives::{keccak256, Address, Signature};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolValue;

use crate::{errors::FundMePanic, sol::TransactionRequest, transactions::SignedTransaction};

/// Creates a signer whose private key is the keccak256 hash of `key`.
pub fn signer(key: &str) -> Result<PrivateKeySigner, FundMePanic> {
    PrivateKeySigner::from_bytes(&keccak256(key))
        .map_err(|e| FundMePanic::InvalidAccountKey { error: e.to_string() })
}

/// Signs the ABI encoding of `request` using the `personal_sign` format.
pub fn sign_transaction(
    signer: &PrivateKeySigner,
    request: TransactionRequest,
) -> Result<SignedTransaction, FundMePanic> {
    let signature = signer
        .sign_message_sync(&request.abi_encode())
        .map_err(|e| FundMePanic::InvalidSignature { error: e.to_string() })?;
    Ok(SignedTransaction { request, signature: signature.as_bytes().to_vec() })
}

/// Recovers the sender of a signed transaction.
pub fn recover_sender(tx: &SignedTransaction) -> Result<Address, FundMePanic> {
    eth_sign_verify(&tx.request.abi_encode(), &tx.signature)
}

/// Verifies an Ethereum signature using the `personal_sign` format.
pub fn eth_sign_verify(message: &[u8], signature: &[u8]) -> Result<Address, FundMePanic> {
    let signature = Signature::from_raw(signature)
        .map_err(|e| FundMePanic::InvalidSignature { error: e.to_string() })?;
    let address = signature
        .recover_address_from_msg(message)
        .map_err(|e| FundMePanic::InvalidSignature { error: e.to_string() })?;
    Ok(address)
}
