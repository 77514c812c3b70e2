//! # Cosigner - Multisig Transaction Orchestration
//!
//! Builds, signs, simulates and proposes transactions for Safe-style
//! multisig accounts.
//!
//! ## Purpose
//!
//! Reproduces the account's EIP-712 hashing and signature encoding byte for
//! byte, synthesizes the approval state the verifier accepts in place of
//! real signatures when simulating, and gives callers one interface over two
//! very different execution paths: local state mutation and a remote
//! proposal API.
//!
//! ## Flow
//!
//! ```text
//! request ─▶ mode ─┬─ simulation ─▶ digest ─▶ synthetic signatures ─▶ aggregate ─▶ simulate
//!                  └─ proposal ───▶ digest ─▶ signer ─▶ recover check ─▶ submit
//!                                             (optional) deployment verification ◀─┘
//! ```
//!
//! ## Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Digest is a pure function of account, chain and transaction | `domain/digest.rs` |
//! | Aggregated signatures are strictly ascending by owner | `domain/signature.rs` - `aggregate()` |
//! | Synthetic signatures never reach the coordination service | `service/client.rs` - `propose()` |
//! | Approval records never outlive a simulated attempt | `service/simulator.rs` - `simulate()` |
//! | Debug bypass never applies to delegate calls | `service/simulator.rs` |
//! | Existing code short-circuits a deployment | `service/verifier.rs` - `precheck()` |
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Adapter |
//! |--------------|-------|---------|
//! | Chain state | `StateStore` + `CallHost` | `InMemoryChain` |
//! | Coordination service | `ProposalTransport` | `ReqwestTransport` |
//! | Hardware device | `ExternalSigner` | `ProcessSigner` |
//! | Run context | `ModeProbe` | `NativeDetector`, `EnvOverrideDetector` |
//!
//! ## Environment
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `COSIGNER_DRY_RUN` | mode override when no context flag exists (`true` = simulation) |
//! | `COSIGNER_DEBUG_BYPASS` | call the target directly as the account when simulating |
//! | `COSIGNER_LOG_LEVEL` / `RUST_LOG` | log filter |
//! | `COSIGNER_JSON_LOGS` | JSON log output |
//!
//! ## Usage Example
//!
//! ```ignore
//! use cosigner_core::prelude::*;
//!
//! let mut client = Client::new(host, Arc::new(ReqwestTransport::new()?), Box::new(signer));
//! client.init(SafeAccount::new(1, safe), SignerSet::single(owner));
//! let result = client.propose_transaction(target, U256::zero(), data, Operation::Call).await?;
//! println!("digest {}", result.digest());
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;
pub mod telemetry;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Shared types
    pub use cosigner_types::{
        keccak256, Address, BatchCall, Bytes, EcdsaSignature, Hash, Operation, SafeTransaction,
        U256,
    };

    // Domain
    pub use crate::domain::entities::{
        DeploymentReport, DeploymentStatus, RunMode, RunResult, SafeAccount, SignerSet,
        SimulationOutcome, TransactionRequest,
    };
    pub use crate::domain::{
        create2_address, decode_batch, encode_batch, transaction_digest, typed_data,
        RevertReason, CREATE2_FACTORY, MULTI_SEND_CALL_ONLY,
    };

    // Ports
    pub use crate::ports::inbound::OrchestratorApi;
    pub use crate::ports::outbound::{
        CallHost, CallOutcome, CallRequest, ChainHost, ExternalSigner, ProposalTransport,
        StateStore,
    };

    // Adapters
    pub use crate::adapters::{
        ContractHandler, EnvOverrideDetector, InMemoryChain, ModeDetector, NativeDetector,
        ProcessSigner, ReqwestTransport,
    };

    // Service
    pub use crate::service::{
        Client, DeviceSigner, LocalKeySigner, ProposalRequest, SyntheticSigner, TransactionSigner,
    };

    // Configuration
    pub use crate::config::{
        ChainEntry, ChainRegistry, DeviceKind, DeviceProtocol, RunToggles, SignerConfig,
    };

    // Errors
    pub use crate::errors::{
        ConfigError, OrchestratorError, Result, SignatureError, SigningError,
    };

    // Telemetry
    pub use crate::telemetry::{init_tracing, LogConfig};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
