//! # Device Signing Process
//!
//! [`ExternalSigner`] backed by an external program, by default
//! `cast wallet sign`:
//!
//! ```text
//! cast wallet sign --ledger --mnemonic-derivation-path "m/44'/60'/0'/0/0" 0x<digest>
//! cast wallet sign --ledger --mnemonic-derivation-path "m/44'/60'/0'/0/0" --data '<eip712 json>'
//! ```
//!
//! The program must print the 65-byte signature as hex on stdout. Any
//! failure is reported once; the process is never re-invoked.

use crate::config::SignerConfig;
use crate::errors::SigningError;
use crate::ports::outbound::ExternalSigner;
use async_trait::async_trait;
use cosigner_types::{EcdsaSignature, Hash};
use tokio::process::Command;
use tracing::{debug, info};

/// Signs by spawning an external program.
#[derive(Clone, Debug)]
pub struct ProcessSigner {
    program: String,
    base_args: Vec<String>,
}

impl Default for ProcessSigner {
    fn default() -> Self {
        Self::new("cast", ["wallet", "sign"])
    }
}

impl ProcessSigner {
    /// Signer running `program base_args... <device args>`.
    pub fn new<I, S>(program: impl Into<String>, base_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            base_args: base_args.into_iter().map(Into::into).collect(),
        }
    }

    fn device_args(&self, config: &SignerConfig) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.push(config.device.flag().to_string());
        args.push("--mnemonic-derivation-path".to_string());
        args.push(config.derivation_path.clone());
        args
    }

    /// Arguments for signing a digest.
    #[must_use]
    pub fn hash_args(&self, digest: Hash, config: &SignerConfig) -> Vec<String> {
        let mut args = self.device_args(config);
        args.push(digest.to_string());
        args
    }

    /// Arguments for signing an EIP-712 document.
    #[must_use]
    pub fn typed_data_args(&self, document: &serde_json::Value, config: &SignerConfig) -> Vec<String> {
        let mut args = self.device_args(config);
        args.push("--data".to_string());
        args.push(document.to_string());
        args
    }

    async fn run(&self, args: Vec<String>) -> Result<EcdsaSignature, SigningError> {
        debug!(program = %self.program, ?args, "invoking signer process");
        info!("waiting for device confirmation");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| SigningError::Spawn {
                program: self.program.clone(),
                error: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(SigningError::Device {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_signature_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parses the signer's stdout: `0x`-prefixed or bare hex of 65 bytes.
pub fn parse_signature_output(stdout: &str) -> Result<EcdsaSignature, SigningError> {
    let line = stdout
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .ok_or_else(|| SigningError::MalformedOutput("empty output".into()))?;
    let hex_part = line.strip_prefix("0x").unwrap_or(line);
    let bytes = hex::decode(hex_part).map_err(|e| SigningError::MalformedOutput(e.to_string()))?;
    let signature = EcdsaSignature::from_slice(&bytes)
        .map_err(|e| SigningError::MalformedOutput(e.to_string()))?;
    Ok(signature.with_legacy_v())
}

#[async_trait]
impl ExternalSigner for ProcessSigner {
    async fn sign_hash(
        &self,
        digest: Hash,
        config: &SignerConfig,
    ) -> Result<EcdsaSignature, SigningError> {
        self.run(self.hash_args(digest, config)).await
    }

    async fn sign_typed_data(
        &self,
        document: &serde_json::Value,
        config: &SignerConfig,
    ) -> Result<EcdsaSignature, SigningError> {
        self.run(self.typed_data_args(document, config)).await
    }
}

// =============================================================================
// TESTS
// =============================================================================
