//! # Driven Ports (SPI - Outbound)
//!
//! Collaborators the orchestrator depends on:
//!
//! | Trait | Collaborator |
//! |-------|--------------|
//! | [`StateStore`] | storage slots and code of the local state snapshot |
//! | [`CallHost`] | impersonated contract calls against that snapshot |
//! | [`ExternalSigner`] | device-backed signing process |
//! | [`ProposalTransport`] | coordination service HTTP endpoint |
//! | [`ModeProbe`] | run-mode context flag or its override |

use crate::config::SignerConfig;
use crate::domain::entities::RunMode;
use crate::domain::layout::{
    approved_hash_slot, StorageKey, StorageValue, NONCE_SLOT, THRESHOLD_SLOT,
};
use crate::errors::{HostError, SigningError, TransportError};
use async_trait::async_trait;
use cosigner_types::{Address, Bytes, EcdsaSignature, Hash, U256};

// =============================================================================
// STATE STORE
// =============================================================================

/// Read/write access to contract storage and code.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Value at `slot` of `address` (zero if never written).
    async fn storage(&self, address: Address, slot: StorageKey) -> Result<StorageValue, HostError>;

    /// Overwrites `slot` of `address`.
    async fn set_storage(
        &self,
        address: Address,
        slot: StorageKey,
        value: StorageValue,
    ) -> Result<(), HostError>;

    /// Deployed code at `address` (empty for none).
    async fn code(&self, address: Address) -> Result<Bytes, HostError>;

    /// True if `address` has code.
    async fn has_code(&self, address: Address) -> Result<bool, HostError> {
        Ok(!self.code(address).await?.is_empty())
    }

    /// Records that `owner` approved `digest` on `account`.
    ///
    /// The verifier then accepts a `v = 1` signature for `owner` without a
    /// cryptographic check.
    async fn write_approval(
        &self,
        account: Address,
        digest: Hash,
        owner: Address,
    ) -> Result<(), HostError> {
        self.set_storage(account, approved_hash_slot(owner, digest), StorageValue::one())
            .await
    }

    /// Removes an approval written by [`write_approval`](Self::write_approval).
    async fn clear_approval(
        &self,
        account: Address,
        digest: Hash,
        owner: Address,
    ) -> Result<(), HostError> {
        self.set_storage(account, approved_hash_slot(owner, digest), StorageValue::ZERO)
            .await
    }

    /// Current nonce of `account`.
    async fn account_nonce(&self, account: Address) -> Result<U256, HostError> {
        Ok(self.storage(account, StorageKey::at(NONCE_SLOT)).await?.to_u256())
    }

    /// Approval threshold of `account`.
    async fn threshold(&self, account: Address) -> Result<U256, HostError> {
        Ok(self
            .storage(account, StorageKey::at(THRESHOLD_SLOT))
            .await?
            .to_u256())
    }
}

// =============================================================================
// CALL HOST
// =============================================================================

/// A single call made with an impersonated sender.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRequest {
    /// Impersonated `msg.sender`.
    pub caller: Address,
    /// Called contract.
    pub to: Address,
    /// Forwarded value.
    pub value: U256,
    /// Call data.
    pub data: Bytes,
}

/// How a call ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallOutcome {
    /// Normal return with data.
    Returned(Bytes),
    /// Revert with payload.
    Reverted(Bytes),
}

impl CallOutcome {
    /// True for [`CallOutcome::Returned`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Returned(_))
    }
}

/// Executes calls against the state snapshot.
#[async_trait]
pub trait CallHost: Send + Sync {
    /// Runs one call as `request.caller`. Impersonation ends with the call.
    async fn call_as(&self, request: CallRequest) -> Result<CallOutcome, HostError>;
}

/// A host offering both state access and calls.
pub trait ChainHost: StateStore + CallHost {}

impl<T: StateStore + CallHost> ChainHost for T {}

// =============================================================================
// EXTERNAL SIGNER
// =============================================================================

/// Device-backed signing process.
///
/// Every invocation may prompt the user on hardware; callers never retry.
#[async_trait]
pub trait ExternalSigner: Send + Sync {
    /// Signs `digest` as a personal message.
    async fn sign_hash(
        &self,
        digest: Hash,
        config: &SignerConfig,
    ) -> Result<EcdsaSignature, SigningError>;

    /// Signs an EIP-712 document.
    async fn sign_typed_data(
        &self,
        document: &serde_json::Value,
        config: &SignerConfig,
    ) -> Result<EcdsaSignature, SigningError>;
}

// =============================================================================
// PROPOSAL TRANSPORT
// =============================================================================

/// Raw HTTP response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl TransportResponse {
    /// True for 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Posts JSON documents to the coordination service.
#[async_trait]
pub trait ProposalTransport: Send + Sync {
    /// Sends `body` to `url`. Non-2xx statuses are returned, not raised.
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<TransportResponse, TransportError>;
}

// =============================================================================
// MODE PROBE
// =============================================================================

/// One source of the run mode.
pub trait ModeProbe: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// The mode, or `None` if this source cannot tell.
    fn probe(&self) -> Option<RunMode>;

    /// True if this source overrides the native context flag.
    fn is_override(&self) -> bool {
        false
    }
}
