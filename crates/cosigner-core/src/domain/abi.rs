//! # ABI Codec
//!
//! The subset of the Solidity contract ABI this engine speaks: static words
//! (`address`, `uint256`, `bool`, `bytes32`) and dynamic `bytes`/`string`.
//!
//! Layout: a head of 32-byte slots, one per parameter; dynamic parameters
//! store an offset in the head and `length ‖ data ‖ padding` in the tail.

use crate::errors::AbiError;
use cosigner_types::{keccak256, Address, Hash, U256};

/// Size of one ABI word.
pub const WORD: usize = 32;

/// `execTransaction(address,uint256,bytes,uint8,uint256,uint256,uint256,address,address,bytes)`
pub const EXEC_TRANSACTION_SELECTOR: [u8; 4] = [0x6a, 0x76, 0x12, 0x02];

/// `multiSend(bytes)`
pub const MULTI_SEND_SELECTOR: [u8; 4] = [0x8d, 0x80, 0xff, 0x0a];

/// `Error(string)`
pub const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// `Panic(uint256)`
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// A single ABI value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// `address`
    Address(Address),
    /// `uint256` (also used for narrower unsigned ints)
    Uint(U256),
    /// `bool`
    Bool(bool),
    /// `bytes32`
    FixedBytes(Hash),
    /// `bytes`
    Bytes(Vec<u8>),
    /// `string`
    String(String),
}

impl Token {
    /// Unwraps an address token.
    #[must_use]
    pub fn into_address(self) -> Option<Address> {
        match self {
            Self::Address(a) => Some(a),
            _ => None,
        }
    }

    /// Unwraps a uint token.
    #[must_use]
    pub fn into_uint(self) -> Option<U256> {
        match self {
            Self::Uint(v) => Some(v),
            _ => None,
        }
    }

    /// Unwraps a bytes token.
    #[must_use]
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Unwraps a string token.
    #[must_use]
    pub fn into_string(self) -> Option<String> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Unwraps a bool token.
    #[must_use]
    pub fn into_bool(self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(b),
            _ => None,
        }
    }
}

/// Expected parameter kind for decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    /// `address`
    Address,
    /// `uint<N>`
    Uint,
    /// `bool`
    Bool,
    /// `bytes32`
    FixedBytes32,
    /// `bytes`
    Bytes,
    /// `string`
    String,
}

/// First four bytes of the Keccak-256 of a function signature.
#[must_use]
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash.0[0], hash.0[1], hash.0[2], hash.0[3]]
}

/// Big-endian word of a `U256`.
#[must_use]
pub fn uint_word(value: U256) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    value.to_big_endian(&mut word);
    word
}

/// Big-endian word of a `u64`.
#[must_use]
pub fn u64_word(value: u64) -> [u8; WORD] {
    uint_word(U256::from(value))
}

fn push_dynamic(head: &mut Vec<u8>, tail: &mut Vec<u8>, head_len: usize, payload: &[u8]) {
    head.extend_from_slice(&u64_word((head_len + tail.len()) as u64));
    tail.extend_from_slice(&u64_word(payload.len() as u64));
    tail.extend_from_slice(payload);
    let padding = (WORD - payload.len() % WORD) % WORD;
    tail.resize(tail.len() + padding, 0);
}

/// Encodes tokens as a tuple.
#[must_use]
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        match token {
            Token::Address(a) => head.extend_from_slice(&a.to_word()),
            Token::Uint(v) => head.extend_from_slice(&uint_word(*v)),
            Token::Bool(b) => head.extend_from_slice(&u64_word(u64::from(*b))),
            Token::FixedBytes(h) => head.extend_from_slice(&h.0),
            Token::Bytes(b) => push_dynamic(&mut head, &mut tail, head_len, b),
            Token::String(s) => push_dynamic(&mut head, &mut tail, head_len, s.as_bytes()),
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Encodes a function call: selector followed by the encoded arguments.
#[must_use]
pub fn encode_call(selector: [u8; 4], tokens: &[Token]) -> Vec<u8> {
    let mut out = selector.to_vec();
    out.extend_from_slice(&encode(tokens));
    out
}

/// Strips and checks the selector of `data`, returning the argument bytes.
pub fn strip_selector(selector: [u8; 4], data: &[u8]) -> Result<&[u8], AbiError> {
    let actual = data.get(..4).ok_or(AbiError::Truncated {
        offset: 0,
        needed: 4,
        available: data.len(),
    })?;
    if actual != selector {
        return Err(AbiError::SelectorMismatch {
            expected: selector,
            actual: [actual[0], actual[1], actual[2], actual[3]],
        });
    }
    Ok(&data[4..])
}

fn read_word(data: &[u8], offset: usize) -> Result<[u8; WORD], AbiError> {
    let slice = offset
        .checked_add(WORD)
        .and_then(|end| data.get(offset..end))
        .ok_or(AbiError::Truncated {
            offset,
            needed: WORD,
            available: data.len(),
        })?;
    let mut word = [0u8; WORD];
    word.copy_from_slice(slice);
    Ok(word)
}

fn word_to_usize(word: &[u8; WORD]) -> Result<usize, AbiError> {
    let value = U256::from_big_endian(word);
    if value.bits() > 32 {
        return Err(AbiError::InvalidOffset(value));
    }
    Ok(value.low_u64() as usize)
}

fn read_dynamic(data: &[u8], offset: usize) -> Result<Vec<u8>, AbiError> {
    let len = word_to_usize(&read_word(data, offset)?)?;
    let start = offset + WORD;
    start
        .checked_add(len)
        .and_then(|end| data.get(start..end))
        .map(<[u8]>::to_vec)
        .ok_or(AbiError::Truncated {
            offset: start,
            needed: len,
            available: data.len(),
        })
}

/// Decodes a tuple of the given kinds.
pub fn decode(kinds: &[ParamKind], data: &[u8]) -> Result<Vec<Token>, AbiError> {
    let mut tokens = Vec::with_capacity(kinds.len());

    for (i, kind) in kinds.iter().enumerate() {
        let word = read_word(data, i * WORD)?;
        let token = match kind {
            ParamKind::Address => Token::Address(Address::from_word(&word)),
            ParamKind::Uint => Token::Uint(U256::from_big_endian(&word)),
            ParamKind::Bool => {
                if word[..31] != [0u8; 31] || word[31] > 1 {
                    return Err(AbiError::InvalidBool);
                }
                Token::Bool(word[31] == 1)
            }
            ParamKind::FixedBytes32 => Token::FixedBytes(Hash(word)),
            ParamKind::Bytes => Token::Bytes(read_dynamic(data, word_to_usize(&word)?)?),
            ParamKind::String => {
                let raw = read_dynamic(data, word_to_usize(&word)?)?;
                Token::String(String::from_utf8(raw).map_err(|_| AbiError::InvalidUtf8)?)
            }
        };
        tokens.push(token);
    }

    Ok(tokens)
}

// =============================================================================
// TESTS
// =============================================================================
