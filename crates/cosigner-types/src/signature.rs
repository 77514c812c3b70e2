//! # Signatures
//!
//! Signatures as the multisig verifier reads them: 65 bytes `r ‖ s ‖ v`,
//! where `v` selects the verification scheme.
//!
//! | `v` | Meaning |
//! |-----|---------|
//! | 0 | contract signature (EIP-1271) |
//! | 1 | pre-approved hash; `r` holds the owner |
//! | 27, 28 | ECDSA over the digest |
//! | 31, 32 | ECDSA over the personal-message form of the digest |

use crate::errors::ParseError;
use crate::value::Address;
use serde::{Serialize, Serializer};
use std::fmt;

/// Wire length of one ECDSA-shaped signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// ECDSA-shaped signature (r, s, v).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EcdsaSignature {
    /// R component (32 bytes)
    pub r: [u8; 32],
    /// S component (32 bytes)
    pub s: [u8; 32],
    /// Recovery ID or scheme selector
    pub v: u8,
}

impl EcdsaSignature {
    /// Creates a new signature.
    #[must_use]
    pub const fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Self { r, s, v }
    }

    /// Parses 65 bytes `r ‖ s ‖ v` without touching `v`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(ParseError::InvalidLength {
                expected: SIGNATURE_LENGTH,
                actual: bytes.len(),
            });
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, v: bytes[64] })
    }

    /// Maps a raw recovery id (0 or 1) to the legacy 27/28 form.
    #[must_use]
    pub fn with_legacy_v(self) -> Self {
        if self.v < 2 {
            Self {
                v: self.v + 27,
                ..self
            }
        } else {
            self
        }
    }

    /// Wire form `r ‖ s ‖ v`.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    /// True for the pre-approved-hash scheme.
    #[must_use]
    pub const fn is_approved_hash(&self) -> bool {
        self.v == 1
    }

    /// Owner encoded in `r` for the pre-approved-hash scheme.
    #[must_use]
    pub fn approved_owner(&self) -> Option<Address> {
        self.is_approved_hash().then(|| Address::from_word(&self.r))
    }
}

impl fmt::Display for EcdsaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes()))
    }
}

impl Serialize for EcdsaSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
