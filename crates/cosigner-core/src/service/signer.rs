//! # Signer Strategies
//!
//! | Strategy | Key material | Output `v` |
//! |----------|--------------|------------|
//! | [`LocalKeySigner`] | in-process secp256k1 key | 27 / 28 |
//! | [`DeviceSigner`] (raw hash) | hardware device | 31 / 32 |
//! | [`DeviceSigner`] (typed data) | hardware device | 27 / 28 |
//! | [`SyntheticSigner`] | none | 1 |
//!
//! The strategy is chosen by the caller at construction; it is never
//! auto-detected.

use crate::config::{DeviceProtocol, SignerConfig};
use crate::domain::digest::{transaction_digest, typed_data};
use crate::domain::entities::SafeAccount;
use crate::domain::signature::{address_from_pubkey, adjust_eth_sign_v, sign_digest, synthetic_approval};
use crate::errors::SigningError;
use crate::ports::outbound::ExternalSigner;
use async_trait::async_trait;
use cosigner_types::{Address, EcdsaSignature, SafeTransaction};
use k256::ecdsa::SigningKey;
use tracing::{debug, instrument};
use zeroize::{Zeroize, Zeroizing};

/// Produces a signature over a transaction for one signer.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Strategy name for logs and errors.
    fn strategy(&self) -> &'static str;

    /// True if the output is a placeholder that only works in simulation.
    fn is_synthetic(&self) -> bool {
        false
    }

    /// Signs `tx` against `account` on behalf of `signer`.
    async fn sign(
        &self,
        account: &SafeAccount,
        tx: &SafeTransaction,
        signer: Address,
    ) -> Result<EcdsaSignature, SigningError>;
}

// =============================================================================
// LOCAL KEY
// =============================================================================

/// Signs with an in-process private key.
pub struct LocalKeySigner {
    key: SigningKey,
    address: Address,
}

impl std::fmt::Debug for LocalKeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKeySigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl LocalKeySigner {
    /// Builds a signer from a 32-byte secret; the input is wiped.
    pub fn from_secret(mut secret: [u8; 32]) -> Result<Self, SigningError> {
        let key = SigningKey::from_slice(&secret);
        secret.zeroize();
        let key = key.map_err(|e| SigningError::InvalidKey(e.to_string()))?;
        let address = address_from_pubkey(key.verifying_key());
        Ok(Self { key, address })
    }

    /// Builds a signer from a hex secret, with or without `0x`.
    pub fn from_hex(secret: &str) -> Result<Self, SigningError> {
        let trimmed = secret.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = Zeroizing::new(
            hex::decode(digits).map_err(|_| SigningError::InvalidKey("secret is not hex".into()))?,
        );
        let secret: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| SigningError::InvalidKey(format!("expected 32 bytes, got {}", bytes.len())))?;
        Self::from_secret(secret)
    }

    /// Address controlled by the key.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }
}

#[async_trait]
impl TransactionSigner for LocalKeySigner {
    fn strategy(&self) -> &'static str {
        "local-key"
    }

    async fn sign(
        &self,
        account: &SafeAccount,
        tx: &SafeTransaction,
        signer: Address,
    ) -> Result<EcdsaSignature, SigningError> {
        if signer != self.address {
            return Err(SigningError::InvalidKey(format!(
                "key controls {}, not signer {signer}",
                self.address
            )));
        }
        sign_digest(&self.key, transaction_digest(account, tx))
    }
}

// =============================================================================
// DEVICE
// =============================================================================

/// Signs through an external device process.
pub struct DeviceSigner<E: ExternalSigner> {
    external: E,
    config: SignerConfig,
}

impl<E: ExternalSigner> DeviceSigner<E> {
    /// Builds a device signer; the configuration is fixed from here on.
    pub fn new(external: E, config: SignerConfig) -> Result<Self, crate::errors::ConfigError> {
        config.validate()?;
        Ok(Self { external, config })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &SignerConfig {
        &self.config
    }
}

#[async_trait]
impl<E: ExternalSigner> TransactionSigner for DeviceSigner<E> {
    fn strategy(&self) -> &'static str {
        match self.config.protocol {
            DeviceProtocol::RawHash => "device-raw-hash",
            DeviceProtocol::TypedData => "device-typed-data",
        }
    }

    #[instrument(skip_all, fields(signer = %signer, device = ?self.config.device))]
    async fn sign(
        &self,
        account: &SafeAccount,
        tx: &SafeTransaction,
        signer: Address,
    ) -> Result<EcdsaSignature, SigningError> {
        match self.config.protocol {
            DeviceProtocol::RawHash => {
                let digest = transaction_digest(account, tx);
                debug!(%digest, "requesting raw hash signature");
                let signature = self.external.sign_hash(digest, &self.config).await?;
                Ok(adjust_eth_sign_v(signature))
            }
            DeviceProtocol::TypedData => {
                let document = typed_data(account, tx);
                debug!("requesting typed data signature");
                self.external.sign_typed_data(&document, &self.config).await
            }
        }
    }
}

// =============================================================================
// SYNTHETIC
// =============================================================================

/// Placeholder approvals for local simulation.
///
/// The signature is only accepted once the matching approval record has
/// been written into the account's state.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyntheticSigner;

#[async_trait]
impl TransactionSigner for SyntheticSigner {
    fn strategy(&self) -> &'static str {
        "synthetic"
    }

    fn is_synthetic(&self) -> bool {
        true
    }

    async fn sign(
        &self,
        _account: &SafeAccount,
        _tx: &SafeTransaction,
        signer: Address,
    ) -> Result<EcdsaSignature, SigningError> {
        Ok(synthetic_approval(signer))
    }
}

// =============================================================================
// TESTS
// =============================================================================
