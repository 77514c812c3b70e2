//! # Account Storage Layout
//!
//! Storage positions the multisig verifier reads. This layout belongs to the
//! verifier contract and is treated as a fixed protocol constant; nothing
//! outside [`StateStore`](crate::ports::outbound::StateStore) and test
//! fixtures should compute slots directly.
//!
//! | Slot | Variable |
//! |------|----------|
//! | 2 | `mapping(address => address) owners` (linked list from [`SENTINEL_OWNER`]) |
//! | 3 | `uint256 ownerCount` |
//! | 4 | `uint256 threshold` |
//! | 5 | `uint256 nonce` |
//! | 8 | `mapping(address => mapping(bytes32 => uint256)) approvedHashes` |

use cosigner_types::{keccak256, Address, Hash, U256};
use serde::{Deserialize, Serialize};

/// Slot of the owners linked list.
pub const OWNERS_SLOT: u64 = 2;
/// Slot of the owner count.
pub const OWNER_COUNT_SLOT: u64 = 3;
/// Slot of the approval threshold.
pub const THRESHOLD_SLOT: u64 = 4;
/// Slot of the account nonce.
pub const NONCE_SLOT: u64 = 5;
/// Slot of the approved-hashes mapping.
pub const APPROVED_HASHES_SLOT: u64 = 8;

/// Head and tail marker of the owners linked list.
pub const SENTINEL_OWNER: Address = Address::new([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
]);

/// Storage slot key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StorageKey(pub [u8; 32]);

impl StorageKey {
    /// Slot at a plain index.
    #[must_use]
    pub fn at(index: u64) -> Self {
        let mut key = [0u8; 32];
        U256::from(index).to_big_endian(&mut key);
        Self(key)
    }

    /// Slot of `mapping[key]` where the mapping lives at `self`.
    #[must_use]
    pub fn mapping(self, key: [u8; 32]) -> Self {
        let mut preimage = [0u8; 64];
        preimage[..32].copy_from_slice(&key);
        preimage[32..].copy_from_slice(&self.0);
        Self(keccak256(&preimage).0)
    }
}

/// Storage slot value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageValue(pub [u8; 32]);

impl StorageValue {
    /// Zero value.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Value holding `1`.
    #[must_use]
    pub fn one() -> Self {
        Self::from_u256(U256::one())
    }

    /// From an unsigned integer.
    #[must_use]
    pub fn from_u256(value: U256) -> Self {
        let mut word = [0u8; 32];
        value.to_big_endian(&mut word);
        Self(word)
    }

    /// From an address, left-padded.
    #[must_use]
    pub fn from_address(address: Address) -> Self {
        Self(address.to_word())
    }

    /// As an unsigned integer.
    #[must_use]
    pub fn to_u256(&self) -> U256 {
        U256::from_big_endian(&self.0)
    }

    /// Low 20 bytes as an address.
    #[must_use]
    pub fn to_address(&self) -> Address {
        Address::from_word(&self.0)
    }

    /// True if every byte is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

/// Slot of `owners[owner]`.
#[must_use]
pub fn owner_slot(owner: Address) -> StorageKey {
    StorageKey::at(OWNERS_SLOT).mapping(owner.to_word())
}

/// Slot of `approvedHashes[owner][digest]`.
#[must_use]
pub fn approved_hash_slot(owner: Address, digest: Hash) -> StorageKey {
    StorageKey::at(APPROVED_HASHES_SLOT)
        .mapping(owner.to_word())
        .mapping(digest.0)
}
