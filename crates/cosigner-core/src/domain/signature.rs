//! # Signature Domain Logic
//!
//! Synthetic approvals, recovery-id adjustment, aggregation and recovery.
//!
//! ## Ordering
//!
//! The verifier walks concatenated signatures and requires each recovered
//! owner to be strictly greater than the previous one. [`aggregate`] sorts
//! by owner address and rejects duplicates, so input order never matters.

use crate::errors::{SignatureError, SigningError};
use cosigner_types::{keccak256, Address, Bytes, EcdsaSignature, Hash, SIGNATURE_LENGTH};
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
use std::collections::BTreeMap;

/// `v` sentinel of the pre-approved-hash scheme.
pub const APPROVED_HASH_V: u8 = 1;

/// Offset added to `v` for signatures over the personal-message form.
pub const ETH_SIGN_V_OFFSET: u8 = 4;

const ETH_SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Placeholder signature for `owner`: `r = owner`, `s = 0`, `v = 1`.
///
/// Only valid if the account sees an approval record for the digest or the
/// owner is the caller.
#[must_use]
pub fn synthetic_approval(owner: Address) -> EcdsaSignature {
    EcdsaSignature::new(owner.to_word(), [0u8; 32], APPROVED_HASH_V)
}

/// Marks a device signature over the prefixed digest (`v` 27/28 → 31/32).
#[must_use]
pub fn adjust_eth_sign_v(signature: EcdsaSignature) -> EcdsaSignature {
    let legacy = signature.with_legacy_v();
    EcdsaSignature::new(legacy.r, legacy.s, legacy.v + ETH_SIGN_V_OFFSET)
}

/// `keccak256("\x19Ethereum Signed Message:\n32" ‖ digest)`.
#[must_use]
pub fn eth_signed_message_hash(digest: Hash) -> Hash {
    let mut data = Vec::with_capacity(ETH_SIGNED_MESSAGE_PREFIX.len() + 32);
    data.extend_from_slice(ETH_SIGNED_MESSAGE_PREFIX);
    data.extend_from_slice(digest.as_bytes());
    keccak256(&data)
}

/// Concatenates signatures in strictly ascending owner order.
pub fn aggregate<I>(signatures: I) -> Result<Bytes, SignatureError>
where
    I: IntoIterator<Item = (Address, EcdsaSignature)>,
{
    let mut ordered = BTreeMap::new();
    for (owner, signature) in signatures {
        if ordered.insert(owner, signature).is_some() {
            return Err(SignatureError::DuplicateSigner(owner));
        }
    }
    if ordered.is_empty() {
        return Err(SignatureError::EmptyAggregation);
    }

    let mut blob = Vec::with_capacity(ordered.len() * SIGNATURE_LENGTH);
    for signature in ordered.values() {
        blob.extend_from_slice(&signature.to_bytes());
    }
    Ok(Bytes::from(blob))
}

/// Aggregated synthetic approvals for `owners`.
pub fn synthetic_approvals(owners: &[Address]) -> Result<Bytes, SignatureError> {
    aggregate(owners.iter().map(|owner| (*owner, synthetic_approval(*owner))))
}

/// Ethereum address of a public key.
#[must_use]
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let point = public_key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash.0[12..]);
    Address::new(address)
}

/// Signs `digest` directly; returns low-S with `v ∈ {27, 28}`.
pub fn sign_digest(key: &SigningKey, digest: Hash) -> Result<EcdsaSignature, SigningError> {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(digest.as_bytes())
        .map_err(|e| SigningError::Crypto(e.to_string()))?;

    let (signature, recovery_id) = match signature.normalize_s() {
        Some(normalized) => (
            normalized,
            RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
        ),
        None => (signature, recovery_id),
    };

    let bytes = signature.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..]);
    Ok(EcdsaSignature::new(r, s, recovery_id.to_byte() + 27))
}

/// Recovers the owner that produced an ECDSA signature over `digest`.
///
/// `v ∈ {27, 28}` signs the digest itself; `v ∈ {31, 32}` signs its
/// personal-message form. Other schemes carry no recoverable key.
pub fn recover_owner(digest: Hash, signature: &EcdsaSignature) -> Result<Address, SignatureError> {
    let (message, recovery) = match signature.v {
        27 | 28 => (digest, signature.v - 27),
        31 | 32 => (eth_signed_message_hash(digest), signature.v - 31),
        other => return Err(SignatureError::InvalidRecoveryId(other)),
    };
    let recovery_id = RecoveryId::try_from(recovery)
        .map_err(|_| SignatureError::InvalidRecoveryId(signature.v))?;

    let mut raw = [0u8; 64];
    raw[..32].copy_from_slice(&signature.r);
    raw[32..].copy_from_slice(&signature.s);
    let parsed = K256Signature::from_slice(&raw)
        .map_err(|_| SignatureError::InvalidFormat("r or s out of range".into()))?;

    let key = VerifyingKey::recover_from_prehash(message.as_bytes(), &parsed, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;
    Ok(address_from_pubkey(&key))
}

// =============================================================================
// TESTS
// =============================================================================
