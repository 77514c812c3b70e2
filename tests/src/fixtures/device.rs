//! # Device Stand-in
//!
//! [`ExternalSigner`] backed by an in-process key that behaves like a
//! hardware wallet: raw hashes are signed as personal messages, typed data
//! is hashed from the document it receives.

use async_trait::async_trait;
use cosigner_core::config::SignerConfig;
use cosigner_core::domain::digest::transaction_digest;
use cosigner_core::domain::entities::SafeAccount;
use cosigner_core::domain::signature::{address_from_pubkey, eth_signed_message_hash, sign_digest};
use cosigner_core::errors::SigningError;
use cosigner_core::ports::outbound::ExternalSigner;
use cosigner_types::{Address, Bytes, EcdsaSignature, Hash, Operation, SafeTransaction, U256};
use k256::ecdsa::SigningKey;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

/// What the device was asked to sign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceRequest {
    /// Raw digest.
    Hash(Hash),
    /// EIP-712 document.
    TypedData(Value),
}

/// Shared log of device requests.
pub type RequestLog = Arc<Mutex<Vec<DeviceRequest>>>;

/// Software key posing as a hardware device.
pub struct KeyDevice {
    key: SigningKey,
    requests: RequestLog,
}

impl KeyDevice {
    /// Device holding the secret `[0; 31] ‖ [scalar]`.
    pub fn with_scalar(scalar: u8) -> Self {
        let mut secret = [0u8; 32];
        secret[31] = scalar;
        Self {
            key: SigningKey::from_slice(&secret).expect("valid scalar"),
            requests: RequestLog::default(),
        }
    }

    /// Address of the device key.
    pub fn address(&self) -> Address {
        address_from_pubkey(self.key.verifying_key())
    }

    /// Handle on the request log; stays valid after the device is moved
    /// into a signer.
    pub fn request_log(&self) -> RequestLog {
        Arc::clone(&self.requests)
    }
}

fn field<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T, SigningError> {
    serde_json::from_value(value.clone()).map_err(|e| SigningError::MalformedOutput(e.to_string()))
}

fn decimal(value: &Value) -> Result<U256, SigningError> {
    value
        .as_str()
        .and_then(|s| U256::from_dec_str(s).ok())
        .ok_or_else(|| SigningError::MalformedOutput(format!("not a decimal string: {value}")))
}

/// Digest of an EIP-712 `SafeTx` document.
pub fn typed_data_digest(document: &Value) -> Result<Hash, SigningError> {
    let domain = &document["domain"];
    let message = &document["message"];
    let chain_id = decimal(&domain["chainId"])?.low_u64();
    let account = SafeAccount::new(chain_id, field(&domain["verifyingContract"])?);
    let operation = message["operation"]
        .as_u64()
        .and_then(|op| u8::try_from(op).ok())
        .and_then(|op| Operation::from_u8(op).ok())
        .ok_or_else(|| SigningError::MalformedOutput("bad operation".into()))?;
    let tx = SafeTransaction {
        to: field(&message["to"])?,
        value: decimal(&message["value"])?,
        data: field::<Bytes>(&message["data"])?,
        operation,
        nonce: decimal(&message["nonce"])?,
    };
    Ok(transaction_digest(&account, &tx))
}

#[async_trait]
impl ExternalSigner for KeyDevice {
    async fn sign_hash(
        &self,
        digest: Hash,
        _config: &SignerConfig,
    ) -> Result<EcdsaSignature, SigningError> {
        self.requests.lock().push(DeviceRequest::Hash(digest));
        sign_digest(&self.key, eth_signed_message_hash(digest))
    }

    async fn sign_typed_data(
        &self,
        document: &Value,
        _config: &SignerConfig,
    ) -> Result<EcdsaSignature, SigningError> {
        self.requests
            .lock()
            .push(DeviceRequest::TypedData(document.clone()));
        sign_digest(&self.key, typed_data_digest(document)?)
    }
}
