//! # Error Types
//!
//! Parsing errors for the textual and binary forms of the value objects.

use thiserror::Error;

/// Errors raised while parsing a value object from text or bytes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The input is not valid hexadecimal.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// The decoded input has the wrong number of bytes.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required length in bytes.
        expected: usize,
        /// Length received.
        actual: usize,
    },

    /// Unknown operation discriminant.
    #[error("invalid operation: {0}")]
    InvalidOperation(u8),
}
