//! # Safe Transactions
//!
//! The transaction shape hashed and executed by the multisig verifier.

use crate::errors::ParseError;
use crate::value::{Address, Bytes, U256};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How the account dispatches the inner call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Operation {
    /// Regular `CALL`; the account is `msg.sender` of the target.
    #[default]
    Call,
    /// `DELEGATECALL`; target code runs in the account's own context.
    DelegateCall,
}

impl Operation {
    /// The verifier's `uint8` discriminant.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Call => 0,
            Self::DelegateCall => 1,
        }
    }

    /// Parses the verifier's `uint8` discriminant.
    pub fn from_u8(value: u8) -> Result<Self, ParseError> {
        match value {
            0 => Ok(Self::Call),
            1 => Ok(Self::DelegateCall),
            other => Err(ParseError::InvalidOperation(other)),
        }
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        Self::from_u8(raw).map_err(D::Error::custom)
    }
}

/// A transaction to be approved by the multisig account.
///
/// Gas parameters, gas token and refund receiver are always zero in this
/// system and therefore not carried here; the digest engine and the request
/// body fill them in.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SafeTransaction {
    /// Call target.
    pub to: Address,
    /// Native value forwarded with the call.
    pub value: U256,
    /// Call data.
    pub data: Bytes,
    /// Call or delegate call.
    pub operation: Operation,
    /// Account nonce this transaction consumes.
    pub nonce: U256,
}

impl SafeTransaction {
    /// A zero-value `Call` to `to` with nonce zero.
    #[must_use]
    pub fn call(to: Address, data: Bytes) -> Self {
        Self {
            to,
            value: U256::zero(),
            data,
            operation: Operation::Call,
            nonce: U256::zero(),
        }
    }

    /// Sets the forwarded value.
    #[must_use]
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Sets the operation kind.
    #[must_use]
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    /// Sets the nonce.
    #[must_use]
    pub fn with_nonce(mut self, nonce: U256) -> Self {
        self.nonce = nonce;
        self
    }
}

/// One sub-call of an atomic batch.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchCall {
    /// Sub-call target.
    pub to: Address,
    /// Native value forwarded with the sub-call.
    pub value: U256,
    /// Sub-call data.
    pub data: Bytes,
}

impl BatchCall {
    /// A zero-value sub-call.
    #[must_use]
    pub fn new(to: Address, data: Bytes) -> Self {
        Self {
            to,
            value: U256::zero(),
            data,
        }
    }
}
