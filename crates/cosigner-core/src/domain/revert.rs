//! # Revert Decoding
//!
//! Turns raw revert payloads into structured reasons.
//!
//! | Payload | Reason |
//! |---------|--------|
//! | empty | [`RevertReason::Empty`] |
//! | `Error(string)` | [`RevertReason::Error`] |
//! | `Panic(uint256)` | [`RevertReason::Panic`] |
//! | anything else | [`RevertReason::Raw`] |
//!
//! The account itself reports failures as short `GSxxx` codes; the ones in
//! [`VERIFIER_REJECTION_CODES`] mean the signatures were refused.

use super::abi::{decode, strip_selector, ParamKind, Token, ERROR_SELECTOR, PANIC_SELECTOR};
use cosigner_types::{Bytes, U256};
use serde::Serialize;
use std::fmt;

/// Account error codes raised by signature checking.
pub const VERIFIER_REJECTION_CODES: [&str; 7] =
    ["GS020", "GS021", "GS022", "GS023", "GS024", "GS025", "GS026"];

const ACCOUNT_CODES: &[(&str, &str)] = &[
    ("GS000", "could not finish initialization"),
    ("GS001", "threshold needs to be defined"),
    ("GS010", "not enough gas to execute the transaction"),
    ("GS011", "could not pay gas costs with ether"),
    ("GS012", "could not pay gas costs with token"),
    (
        "GS013",
        "inner transaction failed with safeTxGas and gasPrice both zero",
    ),
    ("GS020", "signatures data too short"),
    ("GS021", "invalid contract signature location: inside static part"),
    ("GS022", "invalid contract signature location: length not present"),
    ("GS023", "invalid contract signature location: data not complete"),
    ("GS024", "invalid contract signature provided"),
    ("GS025", "hash has not been approved"),
    ("GS026", "invalid owner provided (unknown, duplicate or out of order)"),
    ("GS030", "only owners can approve a hash"),
    ("GS031", "method can only be called from this contract"),
];

const PANIC_CODES: &[(u64, &str)] = &[
    (0x00, "generic compiler panic"),
    (0x01, "assertion failed"),
    (0x11, "arithmetic overflow or underflow"),
    (0x12, "division or modulo by zero"),
    (0x21, "invalid enum value"),
    (0x22, "invalid storage byte array encoding"),
    (0x31, "pop on empty array"),
    (0x32, "array index out of bounds"),
    (0x41, "out of memory"),
    (0x51, "call to uninitialized function reference"),
];

/// Why an execution did not succeed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum RevertReason {
    /// The account returned `false`: the inner call failed and was caught.
    ReturnedFalse,
    /// `Error(string)` revert.
    Error(String),
    /// `Panic(uint256)` revert.
    Panic(U256),
    /// Payload that matches no known shape.
    Raw(Bytes),
    /// Revert without data.
    Empty,
}

impl RevertReason {
    /// Decodes a revert payload. Never fails; unknown shapes become `Raw`.
    #[must_use]
    pub fn decode(data: &[u8]) -> Self {
        if data.is_empty() {
            return Self::Empty;
        }
        if let Ok(args) = strip_selector(ERROR_SELECTOR, data) {
            if let Some(Token::String(message)) = decode(&[ParamKind::String], args)
                .ok()
                .and_then(|mut tokens| tokens.pop())
            {
                return Self::Error(message);
            }
        }
        if let Ok(args) = strip_selector(PANIC_SELECTOR, data) {
            if let Some(Token::Uint(code)) = decode(&[ParamKind::Uint], args)
                .ok()
                .and_then(|mut tokens| tokens.pop())
            {
                return Self::Panic(code);
            }
        }
        Self::Raw(Bytes::from_slice(data))
    }

    /// The verifier rejection code, if this reason is one.
    #[must_use]
    pub fn verifier_rejection(&self) -> Option<&str> {
        match self {
            Self::Error(message) => VERIFIER_REJECTION_CODES
                .iter()
                .find(|code| **code == *message)
                .copied(),
            _ => None,
        }
    }

    /// Human-readable hint for known account codes and panic codes.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Error(message) => account_code_hint(message),
            Self::Panic(code) => panic_description(*code),
            Self::ReturnedFalse => Some(
                "inner call failed and was caught by the account; enable debug bypass to see the reason",
            ),
            Self::Raw(_) | Self::Empty => None,
        }
    }
}

impl fmt::Display for RevertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReturnedFalse => f.write_str("execution returned false"),
            Self::Error(message) => match account_code_hint(message) {
                Some(hint) => write!(f, "reverted: {message} ({hint})"),
                None => write!(f, "reverted: {message}"),
            },
            Self::Panic(code) => {
                let description = panic_description(*code).unwrap_or("unknown panic code");
                if code.bits() <= 64 {
                    write!(f, "panic 0x{:02x}: {description}", code.low_u64())
                } else {
                    write!(f, "panic {code}: {description}")
                }
            }
            Self::Raw(data) => write!(f, "reverted with undecodable data {data}"),
            Self::Empty => f.write_str("reverted without data"),
        }
    }
}

/// Description of an account `GSxxx` code.
#[must_use]
pub fn account_code_hint(code: &str) -> Option<&'static str> {
    ACCOUNT_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, hint)| *hint)
}

/// Description of a compiler panic code.
#[must_use]
pub fn panic_description(code: U256) -> Option<&'static str> {
    if code.bits() > 64 {
        return None;
    }
    let code = code.low_u64();
    PANIC_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, text)| *text)
}
