//! # Digest Engine
//!
//! Canonical transaction hash, bit-for-bit identical to the verifier's
//! `getTransactionHash`:
//!
//! ```text
//! domain    = keccak256(DOMAIN_TYPEHASH ‖ chainId ‖ account)
//! structure = keccak256(SAFE_TX_TYPEHASH ‖ to ‖ value ‖ keccak256(data) ‖ operation
//!                       ‖ safeTxGas ‖ baseGas ‖ gasPrice ‖ gasToken ‖ refundReceiver ‖ nonce)
//! digest    = keccak256(0x19 ‖ 0x01 ‖ domain ‖ structure)
//! ```
//!
//! The five gas/refund fields are always zero here.
//!
//! Pure functions only: no I/O, no state.

use super::abi::{encode, Token};
use super::entities::SafeAccount;
use cosigner_types::{keccak256, Address, Hash, SafeTransaction, U256};
use serde_json::{json, Value};

/// `keccak256("EIP712Domain(uint256 chainId,address verifyingContract)")`
pub const DOMAIN_SEPARATOR_TYPEHASH: Hash = Hash([
    0x47, 0xe7, 0x95, 0x34, 0xa2, 0x45, 0x95, 0x2e, 0x8b, 0x16, 0x89, 0x3a, 0x33, 0x6b, 0x85, 0xa3,
    0xd9, 0xea, 0x9f, 0xa8, 0xc5, 0x73, 0xf3, 0xd8, 0x03, 0xaf, 0xb9, 0x2a, 0x79, 0x46, 0x92, 0x18,
]);

/// `keccak256("SafeTx(address to,uint256 value,bytes data,uint8 operation,uint256 safeTxGas,uint256 baseGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)")`
pub const SAFE_TX_TYPEHASH: Hash = Hash([
    0xbb, 0x83, 0x10, 0xd4, 0x86, 0x36, 0x8d, 0xb6, 0xbd, 0x6f, 0x84, 0x94, 0x02, 0xfd, 0xd7, 0x3a,
    0xd5, 0x3d, 0x31, 0x6b, 0x5a, 0x4b, 0x26, 0x44, 0xad, 0x6e, 0xfe, 0x0f, 0x94, 0x12, 0x86, 0xd8,
]);

/// EIP-712 domain separator of `account`.
#[must_use]
pub fn domain_separator(account: &SafeAccount) -> Hash {
    keccak256(&encode(&[
        Token::FixedBytes(DOMAIN_SEPARATOR_TYPEHASH),
        Token::Uint(U256::from(account.chain_id)),
        Token::Address(account.address),
    ]))
}

/// EIP-712 struct hash of the transaction with zeroed gas fields.
#[must_use]
pub fn safe_tx_struct_hash(tx: &SafeTransaction) -> Hash {
    keccak256(&encode(&[
        Token::FixedBytes(SAFE_TX_TYPEHASH),
        Token::Address(tx.to),
        Token::Uint(tx.value),
        Token::FixedBytes(keccak256(tx.data.as_slice())),
        Token::Uint(U256::from(tx.operation.as_u8())),
        Token::Uint(U256::zero()),
        Token::Uint(U256::zero()),
        Token::Uint(U256::zero()),
        Token::Address(Address::ZERO),
        Token::Address(Address::ZERO),
        Token::Uint(tx.nonce),
    ]))
}

/// Pre-image of the digest: `0x19 ‖ 0x01 ‖ domain ‖ structure`.
#[must_use]
pub fn encode_transaction_data(account: &SafeAccount, tx: &SafeTransaction) -> Vec<u8> {
    let mut out = Vec::with_capacity(66);
    out.extend_from_slice(&[0x19, 0x01]);
    out.extend_from_slice(domain_separator(account).as_bytes());
    out.extend_from_slice(safe_tx_struct_hash(tx).as_bytes());
    out
}

/// Canonical digest of `tx` against `account`.
#[must_use]
pub fn transaction_digest(account: &SafeAccount, tx: &SafeTransaction) -> Hash {
    keccak256(&encode_transaction_data(account, tx))
}

/// EIP-712 document for structured-data signing devices.
///
/// Numbers are rendered as decimal strings so that devices accept values
/// beyond 2^53.
#[must_use]
pub fn typed_data(account: &SafeAccount, tx: &SafeTransaction) -> Value {
    json!({
        "types": {
            "EIP712Domain": [
                { "name": "chainId", "type": "uint256" },
                { "name": "verifyingContract", "type": "address" }
            ],
            "SafeTx": [
                { "name": "to", "type": "address" },
                { "name": "value", "type": "uint256" },
                { "name": "data", "type": "bytes" },
                { "name": "operation", "type": "uint8" },
                { "name": "safeTxGas", "type": "uint256" },
                { "name": "baseGas", "type": "uint256" },
                { "name": "gasPrice", "type": "uint256" },
                { "name": "gasToken", "type": "address" },
                { "name": "refundReceiver", "type": "address" },
                { "name": "nonce", "type": "uint256" }
            ]
        },
        "primaryType": "SafeTx",
        "domain": {
            "chainId": account.chain_id.to_string(),
            "verifyingContract": account.address,
        },
        "message": {
            "to": tx.to,
            "value": tx.value.to_string(),
            "data": tx.data,
            "operation": tx.operation.as_u8(),
            "safeTxGas": "0",
            "baseGas": "0",
            "gasPrice": "0",
            "gasToken": Address::ZERO,
            "refundReceiver": Address::ZERO,
            "nonce": tx.nonce.to_string(),
        }
    })
}

// =============================================================================
// TESTS
// =============================================================================
