//! # Proposal Submitter
//!
//! Posts a signed transaction to the chain's coordination service. One
//! request per call; a failed proposal is never re-sent automatically.

use crate::domain::entities::SafeAccount;
use crate::errors::{OrchestratorError, Result};
use crate::ports::outbound::ProposalTransport;
use cosigner_types::{Address, EcdsaSignature, Hash, SafeTransaction};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Value of the `origin` field on every proposal.
pub const PROPOSAL_ORIGIN: &str = "cosigner";

/// Proposal document accepted by the coordination service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRequest {
    /// Checksummed target.
    pub to: String,
    /// Wei value as a decimal string.
    pub value: String,
    /// `0x`-prefixed call data.
    pub data: String,
    /// 0 = call, 1 = delegate call.
    pub operation: u8,
    /// Always 0.
    pub safe_tx_gas: u64,
    /// Always 0.
    pub base_gas: u64,
    /// Always 0.
    pub gas_price: u64,
    /// Always the zero address.
    pub gas_token: String,
    /// Always the zero address.
    pub refund_receiver: String,
    /// Nonce as a decimal string.
    pub nonce: String,
    /// EIP-712 digest the signature covers.
    pub contract_transaction_hash: String,
    /// Checksummed signer address.
    pub sender: String,
    /// `0x`-prefixed 65-byte signature.
    pub signature: String,
    /// Free-form origin tag.
    pub origin: String,
}

impl ProposalRequest {
    /// Builds the document for `tx` signed by `sender`.
    #[must_use]
    pub fn new(tx: &SafeTransaction, digest: Hash, sender: Address, signature: &EcdsaSignature) -> Self {
        Self {
            to: tx.to.to_checksum(),
            value: tx.value.to_string(),
            data: format!("0x{}", hex::encode(tx.data.as_slice())),
            operation: tx.operation.as_u8(),
            safe_tx_gas: 0,
            base_gas: 0,
            gas_price: 0,
            gas_token: Address::ZERO.to_checksum(),
            refund_receiver: Address::ZERO.to_checksum(),
            nonce: tx.nonce.to_string(),
            contract_transaction_hash: digest.to_string(),
            sender: sender.to_checksum(),
            signature: signature.to_string(),
            origin: PROPOSAL_ORIGIN.to_string(),
        }
    }
}

/// Endpoint for proposals on `account`.
#[must_use]
pub fn proposal_url(service_url: &str, account: &SafeAccount) -> String {
    format!(
        "{}/api/v1/safes/{}/multisig-transactions/",
        service_url.trim_end_matches('/'),
        account.address.to_checksum()
    )
}

/// Sends proposals through a [`ProposalTransport`].
pub struct ProposalSubmitter<T: ProposalTransport + ?Sized> {
    transport: Arc<T>,
}

impl<T: ProposalTransport + ?Sized> ProposalSubmitter<T> {
    /// Create a submitter over `transport`.
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Posts `request`; non-2xx answers become [`OrchestratorError::ProposalRejected`].
    #[instrument(skip_all, fields(url = %url, nonce = %request.nonce))]
    pub async fn submit(&self, url: &str, request: &ProposalRequest) -> Result<()> {
        let body = serde_json::to_value(request)?;

        let response = self.transport.post_json(url, &body).await?;
        if !response.is_success() {
            warn!(status = response.status, body = %response.body, "proposal rejected");
            return Err(OrchestratorError::ProposalRejected {
                status: response.status,
                body: response.body,
            });
        }

        info!(
            status = response.status,
            digest = %request.contract_transaction_hash,
            "proposal accepted"
        );
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
