//! # Cosigner Types
//!
//! Value objects shared by every Cosigner crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: addresses, hashes and transactions are
//!   defined once here and re-exported by `cosigner-core`.
//! - **Wire Fidelity**: every type serializes the way the multisig verifier
//!   and the coordination service expect (checksummed addresses, `0x` hex).

pub mod errors;
pub mod signature;
pub mod transaction;
pub mod value;

pub use errors::ParseError;
pub use signature::{EcdsaSignature, SIGNATURE_LENGTH};
pub use transaction::{BatchCall, Operation, SafeTransaction};
pub use value::{keccak256, Address, Bytes, Hash, U256};
