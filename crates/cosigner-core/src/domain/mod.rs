//! # Domain Layer (Inner Hexagon)
//!
//! Pure orchestration logic: hashing, encoding, signature handling and
//! revert decoding. No I/O, no async.
//!
//! Everything that must match the verifier byte for byte lives here, so it
//! can be tested without a host or a network.

pub mod abi;
pub mod batch;
pub mod deploy;
pub mod digest;
pub mod entities;
pub mod layout;
pub mod revert;
pub mod signature;

pub use batch::{decode_batch, encode_batch, encode_calls, BatchPayload, MULTI_SEND_CALL_ONLY};
pub use deploy::{create2_address, is_factory, FactoryCall, CREATE2_FACTORY};
pub use digest::{domain_separator, encode_transaction_data, transaction_digest, typed_data};
pub use entities::*;
pub use layout::{approved_hash_slot, StorageKey, StorageValue};
pub use revert::RevertReason;
pub use signature::{
    adjust_eth_sign_v, aggregate, recover_owner, synthetic_approval, synthetic_approvals,
};
