//! # Configuration
//!
//! Chain Registry, run toggles and signer configuration. Everything is an
//! explicit value passed into the components that need it; nothing is read
//! from process-wide state after construction.

use crate::domain::batch::MULTI_SEND_CALL_ONLY;
use crate::errors::ConfigError;
use cosigner_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

/// Environment variable that enables the debug bypass.
pub const DEBUG_BYPASS_VAR: &str = "COSIGNER_DEBUG_BYPASS";

/// Environment variable that forces the run mode when the context flag is
/// unavailable (`true` → simulation, `false` → proposal).
pub const DRY_RUN_VAR: &str = "COSIGNER_DRY_RUN";

/// Default BIP-44 path of the first Ethereum account.
pub const DEFAULT_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

const BUILTIN_SERVICES: &[(u64, &str)] = &[
    (1, "https://safe-transaction-mainnet.safe.global"),
    (10, "https://safe-transaction-optimism.safe.global"),
    (56, "https://safe-transaction-bsc.safe.global"),
    (100, "https://safe-transaction-gnosis-chain.safe.global"),
    (137, "https://safe-transaction-polygon.safe.global"),
    (8453, "https://safe-transaction-base.safe.global"),
    (42161, "https://safe-transaction-arbitrum.safe.global"),
    (43114, "https://safe-transaction-avalanche.safe.global"),
    (59144, "https://safe-transaction-linea.safe.global"),
    (11_155_111, "https://safe-transaction-sepolia.safe.global"),
    (84532, "https://safe-transaction-base-sepolia.safe.global"),
];

// =============================================================================
// CHAIN REGISTRY
// =============================================================================

/// Per-network collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEntry {
    /// Base URL of the coordination service.
    pub service_url: String,
    /// Batch executor contract.
    #[serde(default = "default_multisend")]
    pub multisend: Address,
}

fn default_multisend() -> Address {
    MULTI_SEND_CALL_ONLY
}

impl ChainEntry {
    /// Entry with the canonical batch executor.
    #[must_use]
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into(),
            multisend: MULTI_SEND_CALL_ONLY,
        }
    }
}

/// Static per-network configuration keyed by network id.
///
/// # Config File Format
///
/// ```toml
/// # keep the built-in networks (default: true)
/// include_defaults = true
///
/// [chains.31337]
/// service_url = "http://localhost:8000"
/// multisend = "0x9641d764fc13c8B624c04430C7356C1C7C8102e2"  # optional
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainRegistry {
    chains: BTreeMap<u64, ChainEntry>,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default = "default_true")]
    include_defaults: bool,
    #[serde(default)]
    chains: BTreeMap<String, ChainEntry>,
}

fn default_true() -> bool {
    true
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self {
            chains: BUILTIN_SERVICES
                .iter()
                .map(|(id, url)| (*id, ChainEntry::new(*url)))
                .collect(),
        }
    }
}

impl ChainRegistry {
    /// Registry with no networks.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            chains: BTreeMap::new(),
        }
    }

    /// Adds or replaces a network.
    #[must_use]
    pub fn with_chain(mut self, chain_id: u64, entry: ChainEntry) -> Self {
        self.chains.insert(chain_id, entry);
        self
    }

    /// Parses a registry from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: RegistryFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut registry = if file.include_defaults {
            Self::default()
        } else {
            Self::empty()
        };
        for (key, entry) in file.chains {
            let chain_id = key
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid(format!("network id {key:?} is not a number")))?;
            registry.chains.insert(chain_id, entry);
        }

        registry.validate()?;
        Ok(registry)
    }

    /// Loads a registry from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Checks every entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (chain_id, entry) in &self.chains {
            if !(entry.service_url.starts_with("http://") || entry.service_url.starts_with("https://"))
            {
                return Err(ConfigError::Invalid(format!(
                    "network {chain_id}: service_url must be an http(s) URL, got {:?}",
                    entry.service_url
                )));
            }
            if entry.multisend.is_zero() {
                return Err(ConfigError::Invalid(format!(
                    "network {chain_id}: multisend must not be the zero address"
                )));
            }
        }
        Ok(())
    }

    /// Entry for `chain_id`; unknown networks are an error.
    pub fn entry(&self, chain_id: u64) -> Result<&ChainEntry, ConfigError> {
        self.chains
            .get(&chain_id)
            .ok_or(ConfigError::UnknownNetwork(chain_id))
    }

    /// Coordination service base URL for `chain_id`.
    pub fn service_url(&self, chain_id: u64) -> Result<&str, ConfigError> {
        self.entry(chain_id).map(|e| e.service_url.trim_end_matches('/'))
    }

    /// Batch executor for `chain_id`.
    pub fn multisend(&self, chain_id: u64) -> Result<Address, ConfigError> {
        self.entry(chain_id).map(|e| e.multisend)
    }

    /// Configured network ids, ascending.
    pub fn chain_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.chains.keys().copied()
    }
}

// =============================================================================
// RUN TOGGLES
// =============================================================================

/// Environment-level switches consumed by the orchestrator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunToggles {
    /// Call targets directly as the account to surface inner revert reasons.
    pub debug_bypass: bool,
    /// Mode override for when the context flag is unavailable.
    pub dry_run: Option<bool>,
}

impl RunToggles {
    /// Reads toggles from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `COSIGNER_DEBUG_BYPASS`: enable debug bypass (default: false)
    /// - `COSIGNER_DRY_RUN`: `true` forces simulation, `false` forces proposal (default: unset)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads toggles through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            debug_bypass: lookup(DEBUG_BYPASS_VAR)
                .and_then(|v| parse_flag(&v))
                .unwrap_or(false),
            dry_run: lookup(DRY_RUN_VAR).and_then(|v| parse_flag(&v)),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// =============================================================================
// SIGNER CONFIGURATION
// =============================================================================

/// Hardware wallet family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Ledger device.
    #[default]
    Ledger,
    /// Trezor device.
    Trezor,
}

impl DeviceKind {
    /// Command-line flag selecting this device.
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Ledger => "--ledger",
            Self::Trezor => "--trezor",
        }
    }
}

/// What the device is asked to sign.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceProtocol {
    /// The digest as a personal message; `v` is shifted by 4.
    #[default]
    RawHash,
    /// The full EIP-712 document; signature used as returned.
    TypedData,
}

/// Device signing configuration, fixed at signer construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerConfig {
    /// BIP-32 derivation path of the signing key.
    #[serde(default = "default_derivation_path")]
    pub derivation_path: String,
    /// Device family.
    #[serde(default)]
    pub device: DeviceKind,
    /// Signing protocol.
    #[serde(default)]
    pub protocol: DeviceProtocol,
}

fn default_derivation_path() -> String {
    DEFAULT_DERIVATION_PATH.to_string()
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            derivation_path: default_derivation_path(),
            device: DeviceKind::default(),
            protocol: DeviceProtocol::default(),
        }
    }
}

impl SignerConfig {
    /// Checks the derivation path shape.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let path = self.derivation_path.as_str();
        let valid = path.strip_prefix("m/").is_some_and(|rest| {
            rest.split('/').all(|part| {
                let index = part.strip_suffix('\'').unwrap_or(part);
                !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit())
            })
        });
        if valid {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "derivation path {path:?} is not of the form m/44'/60'/0'/0/0"
            )))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
