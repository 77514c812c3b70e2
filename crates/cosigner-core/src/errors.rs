//! # Error Types
//!
//! All error types for transaction orchestration.
//!
//! | Class | Type | Disposition |
//! |-------|------|-------------|
//! | Configuration | [`ConfigError`] | fatal, no fallback |
//! | Shape | [`OrchestratorError::ShapeMismatch`] | fatal |
//! | Signing | [`SigningError`] | fatal, never retried |
//! | Simulation rejected | `SimulationOutcome` | structured result, not an error |
//! | Proposal rejected | [`OrchestratorError::ProposalRejected`] | fatal, status and body attached |
//! | Verification failed | [`OrchestratorError::VerificationFailed`] | fatal |

use cosigner_types::{Address, Hash, ParseError, U256};
use thiserror::Error;

// =============================================================================
// ABI ERRORS
// =============================================================================

/// Errors from ABI decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// Input ended before a complete value could be read.
    #[error("truncated input: need {needed} bytes at offset {offset}, have {available}")]
    Truncated {
        /// Position the read started at.
        offset: usize,
        /// Bytes the value requires.
        needed: usize,
        /// Bytes left in the input.
        available: usize,
    },

    /// Offset or length word does not fit the input.
    #[error("invalid offset or length: {0}")]
    InvalidOffset(U256),

    /// Bool word other than 0 or 1.
    #[error("invalid bool encoding")]
    InvalidBool,

    /// String payload is not UTF-8.
    #[error("string is not valid utf-8")]
    InvalidUtf8,

    /// Call data starts with a different function selector.
    #[error("selector mismatch: expected 0x{}, got 0x{}", hex::encode(.expected), hex::encode(.actual))]
    SelectorMismatch {
        /// Selector the decoder was asked for.
        expected: [u8; 4],
        /// Leading four bytes of the input.
        actual: [u8; 4],
    },

    /// Packed batch entry carries an operation the executor does not accept.
    #[error("unsupported packed operation {0}")]
    UnsupportedOperation(u8),
}

// =============================================================================
// CONFIGURATION ERRORS
// =============================================================================

/// Errors from loading or querying configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No Chain Registry entry for this network.
    #[error("unknown network id {0}: no coordination service or batch executor configured")]
    UnknownNetwork(u64),

    /// Config file could not be read.
    #[error("failed to read {path}: {error}")]
    Io {
        /// File that failed.
        path: String,
        /// Underlying I/O error.
        error: String,
    },

    /// Config file could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Config parsed but violates a constraint.
    #[error("invalid config: {0}")]
    Invalid(String),

    /// Neither mode detector produced an answer.
    #[error("run mode undetermined: context flag unavailable and {override_var} not set")]
    ModeUndetermined {
        /// Environment variable consulted as the fallback.
        override_var: String,
    },

    /// A signer set must name at least one signer.
    #[error("signer set is empty")]
    EmptySignerSet,
}

// =============================================================================
// SIGNATURE ERRORS
// =============================================================================

/// Errors from signature encoding, aggregation and recovery.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// Two signatures for the same owner; the verifier requires strictly ascending owners.
    #[error("duplicate signer {0}")]
    DuplicateSigner(Address),

    /// Aggregation needs at least one signature.
    #[error("cannot aggregate an empty signature set")]
    EmptyAggregation,

    /// Signature length or encoding is wrong.
    #[error("invalid signature format: {0}")]
    InvalidFormat(String),

    /// `v` does not select an ECDSA scheme.
    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// Public key recovery failed.
    #[error("failed to recover signer")]
    RecoveryFailed,

    /// Signature recovers to someone other than the claimed signer.
    #[error("signature from {actual} does not match signer {expected}")]
    SignerMismatch {
        /// Signer the signature was requested from.
        expected: Address,
        /// Address the signature recovers to.
        actual: Address,
    },
}

impl From<ParseError> for SignatureError {
    fn from(err: ParseError) -> Self {
        Self::InvalidFormat(err.to_string())
    }
}

// =============================================================================
// SIGNING ERRORS
// =============================================================================

/// Errors from obtaining a signature. Always fatal; signing is never retried.
#[derive(Debug, Error, Clone)]
pub enum SigningError {
    /// The external signing process could not be started.
    #[error("failed to spawn signer process {program}: {error}")]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// Operating system error.
        error: String,
    },

    /// The external signing process exited unsuccessfully.
    #[error("signer process {program} exited with {status}: {stderr}")]
    Device {
        /// Program that was invoked.
        program: String,
        /// Exit status as reported by the OS.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The external signing process printed something that is not a signature.
    #[error("malformed signer output: {0}")]
    MalformedOutput(String),

    /// Local key material is unusable.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    /// The underlying ECDSA operation failed.
    #[error("signing failed: {0}")]
    Crypto(String),

    /// This strategy cannot serve the requested mode.
    #[error("signer strategy {strategy} cannot produce {purpose} signatures")]
    UnsupportedStrategy {
        /// Name of the strategy asked to sign.
        strategy: &'static str,
        /// What the signature was needed for.
        purpose: &'static str,
    },
}

// =============================================================================
// HOST ERRORS
// =============================================================================

/// Errors from the chain-state host.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host cannot be reached.
    #[error("state host unavailable: {0}")]
    Unavailable(String),

    /// The host refused the operation.
    #[error("state host rejected operation: {0}")]
    Rejected(String),
}

// =============================================================================
// TRANSPORT ERRORS
// =============================================================================

/// Errors below the HTTP status level.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the response not read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the coordination service failed.
    #[error("connection failed: {0}")]
    Connection(String),
}

// =============================================================================
// ORCHESTRATOR ERRORS
// =============================================================================

/// Top-level error surfaced to callers of the orchestrator.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Batch target and data lists differ in length.
    #[error("batch shape mismatch: {targets} targets but {payloads} data entries")]
    ShapeMismatch {
        /// Number of call targets.
        targets: usize,
        /// Number of call data entries.
        payloads: usize,
    },

    /// Signature acquisition failed.
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// Signature encoding or aggregation failed.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// Coordination service answered with a non-2xx status.
    #[error("proposal rejected with HTTP {status}: {body}")]
    ProposalRejected {
        /// HTTP status code.
        status: u16,
        /// Response body as returned.
        body: String,
    },

    /// Deployment post-condition failed after a successful execution.
    #[error(
        "deployment verification failed: no code at {expected} after transaction {digest} \
         reported success (check salt, init code hash, or inner reverts masked by the account)"
    )]
    VerificationFailed {
        /// Address that should now hold code.
        expected: Address,
        /// Digest of the executed transaction.
        digest: Hash,
    },

    /// Chain-state host failure.
    #[error(transparent)]
    Host(#[from] HostError),

    /// Transport failure before an HTTP status was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// ABI encoding or decoding failure.
    #[error(transparent)]
    Abi(#[from] AbiError),

    /// Proposal document could not be serialized.
    #[error("proposal encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// No account instance has been initialized on the client.
    #[error("no account instance initialized")]
    NoInstance,
}

impl OrchestratorError {
    /// Returns true if the failure came from the remote coordination service.
    #[must_use]
    pub fn is_proposal_rejection(&self) -> bool {
        matches!(self, Self::ProposalRejected { .. })
    }
}

/// Result alias for orchestrator operations.
pub type Result<T, E = OrchestratorError> = std::result::Result<T, E>;
