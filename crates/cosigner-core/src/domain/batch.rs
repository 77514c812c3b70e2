//! # Batch Encoder
//!
//! Packs sub-calls into one `multiSend(bytes)` payload. The account
//! delegate-calls the executor, so every sub-call runs with the account as
//! `msg.sender`.
//!
//! Packed entry layout:
//!
//! ```text
//! operation: uint8 (always 0) ‖ to: address (20) ‖ value: uint256 ‖ dataLength: uint256 ‖ data
//! ```

use super::abi::{decode, encode_call, strip_selector, uint_word, ParamKind, Token, MULTI_SEND_SELECTOR, WORD};
use crate::errors::{AbiError, OrchestratorError};
use cosigner_types::{Address, BatchCall, Bytes, Operation, SafeTransaction, U256};

/// Canonical `MultiSendCallOnly` v1.4.1 deployment.
pub const MULTI_SEND_CALL_ONLY: Address = Address::new([
    0x96, 0x41, 0xd7, 0x64, 0xfc, 0x13, 0xc8, 0xb6, 0x24, 0xc0, 0x44, 0x30, 0xc7, 0x35, 0x6c, 0x1c,
    0x7c, 0x81, 0x02, 0xe2,
]);

const ENTRY_HEADER: usize = 1 + 20 + WORD + WORD;

/// Encoded batch ready to be wrapped in a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchPayload {
    /// Batch executor the account delegate-calls.
    pub executor: Address,
    /// `multiSend(bytes)` call data.
    pub data: Bytes,
}

impl BatchPayload {
    /// The account transaction that runs this batch.
    #[must_use]
    pub fn to_transaction(&self, nonce: U256) -> SafeTransaction {
        SafeTransaction::call(self.executor, self.data.clone())
            .with_operation(Operation::DelegateCall)
            .with_nonce(nonce)
    }
}

/// Pairs targets with call data, rejecting lists of different length.
pub fn zip_calls(targets: &[Address], payloads: &[Bytes]) -> Result<Vec<BatchCall>, OrchestratorError> {
    if targets.len() != payloads.len() {
        return Err(OrchestratorError::ShapeMismatch {
            targets: targets.len(),
            payloads: payloads.len(),
        });
    }
    Ok(targets
        .iter()
        .zip(payloads)
        .map(|(to, data)| BatchCall::new(*to, data.clone()))
        .collect())
}

/// Packs sub-calls back to back.
#[must_use]
pub fn pack_calls(calls: &[BatchCall]) -> Vec<u8> {
    let size = calls.iter().map(|c| ENTRY_HEADER + c.data.len()).sum();
    let mut packed = Vec::with_capacity(size);
    for call in calls {
        packed.push(Operation::Call.as_u8());
        packed.extend_from_slice(call.to.as_bytes());
        packed.extend_from_slice(&uint_word(call.value));
        packed.extend_from_slice(&uint_word(U256::from(call.data.len())));
        packed.extend_from_slice(call.data.as_slice());
    }
    packed
}

/// Inverse of [`pack_calls`].
pub fn unpack_calls(packed: &[u8]) -> Result<Vec<BatchCall>, AbiError> {
    let mut calls = Vec::new();
    let mut cursor = 0;

    while cursor < packed.len() {
        let header = packed
            .get(cursor..cursor + ENTRY_HEADER)
            .ok_or(AbiError::Truncated {
                offset: cursor,
                needed: ENTRY_HEADER,
                available: packed.len() - cursor,
            })?;
        if header[0] != Operation::Call.as_u8() {
            return Err(AbiError::UnsupportedOperation(header[0]));
        }
        let mut to = [0u8; 20];
        to.copy_from_slice(&header[1..21]);
        let value = U256::from_big_endian(&header[21..21 + WORD]);
        let len_word = U256::from_big_endian(&header[21 + WORD..]);
        if len_word.bits() > 32 {
            return Err(AbiError::InvalidOffset(len_word));
        }
        let len = len_word.low_u64() as usize;

        let start = cursor + ENTRY_HEADER;
        let data = start
            .checked_add(len)
            .and_then(|end| packed.get(start..end))
            .ok_or(AbiError::Truncated {
                offset: start,
                needed: len,
                available: packed.len() - start,
            })?;

        calls.push(BatchCall {
            to: Address::new(to),
            value,
            data: Bytes::from_slice(data),
        });
        cursor = start + len;
    }

    Ok(calls)
}

/// Builds the batch payload for `executor`.
#[must_use]
pub fn encode_calls(executor: Address, calls: &[BatchCall]) -> BatchPayload {
    BatchPayload {
        executor,
        data: Bytes::from(encode_call(
            MULTI_SEND_SELECTOR,
            &[Token::Bytes(pack_calls(calls))],
        )),
    }
}

/// Builds the batch payload from parallel target and data lists.
pub fn encode_batch(
    executor: Address,
    targets: &[Address],
    payloads: &[Bytes],
) -> Result<BatchPayload, OrchestratorError> {
    let calls = zip_calls(targets, payloads)?;
    Ok(encode_calls(executor, &calls))
}

/// Recovers the sub-calls from `multiSend(bytes)` call data.
pub fn decode_batch(data: &[u8]) -> Result<Vec<BatchCall>, AbiError> {
    let args = strip_selector(MULTI_SEND_SELECTOR, data)?;
    let packed = decode(&[ParamKind::Bytes], args)?
        .pop()
        .and_then(Token::into_bytes)
        .unwrap_or_default();
    unpack_calls(&packed)
}

// =============================================================================
// TESTS
// =============================================================================
