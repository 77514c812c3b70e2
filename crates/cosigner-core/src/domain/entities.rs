//! # Domain Entities
//!
//! Accounts, signer sets, requests and the results handed back to callers.

use super::revert::RevertReason;
use crate::errors::ConfigError;
use cosigner_types::{Address, BatchCall, Bytes, Hash, Operation, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ACCOUNT
// =============================================================================

/// A multisig account on one network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SafeAccount {
    /// Network identifier.
    pub chain_id: u64,
    /// Account (verifying contract) address.
    pub address: Address,
}

impl SafeAccount {
    /// Creates a new account handle.
    #[must_use]
    pub const fn new(chain_id: u64, address: Address) -> Self {
        Self { chain_id, address }
    }
}

impl fmt::Display for SafeAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.address, self.chain_id)
    }
}

// =============================================================================
// SIGNER SET
// =============================================================================

/// Ordered, non-empty list of signer addresses.
///
/// Index 0 is the primary signer: it signs and proposes in live runs and is
/// the impersonated caller in simulations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignerSet {
    signers: Vec<Address>,
}

impl SignerSet {
    /// Creates a signer set, rejecting an empty list.
    pub fn new(signers: Vec<Address>) -> Result<Self, ConfigError> {
        if signers.is_empty() {
            return Err(ConfigError::EmptySignerSet);
        }
        Ok(Self { signers })
    }

    /// Single-signer set.
    #[must_use]
    pub fn single(signer: Address) -> Self {
        Self {
            signers: vec![signer],
        }
    }

    /// The primary signer.
    #[must_use]
    pub fn primary(&self) -> Address {
        self.signers[0]
    }

    /// All signers in configured order.
    #[must_use]
    pub fn as_slice(&self) -> &[Address] {
        &self.signers
    }

    /// Number of signers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.signers.len()
    }

    /// Always false; kept for API symmetry with collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }

    /// True when more than one signer is configured.
    #[must_use]
    pub fn is_multi(&self) -> bool {
        self.signers.len() > 1
    }
}

// =============================================================================
// RUN MODE
// =============================================================================

/// Whether a run executes locally or proposes to the coordination service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Local execution against a state snapshot with synthetic approvals.
    Simulation,
    /// Real signature posted to the coordination service.
    Proposal,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulation => f.write_str("simulation"),
            Self::Proposal => f.write_str("proposal"),
        }
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// What the caller wants the account to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionRequest {
    /// One call from the account.
    Single {
        /// Call target.
        to: Address,
        /// Forwarded value.
        value: U256,
        /// Call data.
        data: Bytes,
        /// Call or delegate call.
        operation: Operation,
    },
    /// Several calls replayed atomically through the batch executor.
    Batch(Vec<BatchCall>),
}

impl TransactionRequest {
    /// A zero-value call.
    #[must_use]
    pub fn call(to: Address, data: Bytes) -> Self {
        Self::Single {
            to,
            value: U256::zero(),
            data,
            operation: Operation::Call,
        }
    }

    /// A batch of zero-value calls.
    #[must_use]
    pub fn batch(calls: Vec<BatchCall>) -> Self {
        Self::Batch(calls)
    }

    /// Addresses that receive a call, in execution order.
    #[must_use]
    pub fn targets(&self) -> Vec<Address> {
        match self {
            Self::Single { to, .. } => vec![*to],
            Self::Batch(calls) => calls.iter().map(|c| c.to).collect(),
        }
    }
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// Result of one simulated execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationOutcome {
    /// The account (or, in bypass, the target) returned normally.
    Success {
        /// Raw return data.
        return_data: Bytes,
    },
    /// Execution failed with a reason other than signature rejection.
    Reverted {
        /// Decoded reason.
        reason: RevertReason,
    },
    /// The account refused the presented signatures.
    VerifierRejected {
        /// Verifier error code, e.g. `GS026`.
        code: String,
    },
}

impl SimulationOutcome {
    /// True for [`SimulationOutcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Result of a deterministic-deployment check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeploymentStatus {
    /// Code already present before the attempt; nothing executed.
    Skipped {
        /// Length of the existing code.
        code_len: usize,
    },
    /// Code present after a successful simulated execution.
    Verified {
        /// Length of the deployed code.
        code_len: usize,
    },
    /// No local execution happened to check against (proposal mode or a
    /// failed simulation).
    Unconfirmed,
}

/// Uniform result of one orchestrated attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RunResult {
    /// Local execution result.
    Simulated {
        /// Transaction digest.
        digest: Hash,
        /// Nonce the attempt used.
        nonce: U256,
        /// Execution outcome.
        outcome: SimulationOutcome,
    },
    /// Accepted by the coordination service.
    Proposed {
        /// Transaction digest.
        digest: Hash,
        /// Nonce the attempt used.
        nonce: U256,
        /// Proposing signer.
        sender: Address,
    },
}

impl RunResult {
    /// Digest of the attempt.
    #[must_use]
    pub fn digest(&self) -> Hash {
        match self {
            Self::Simulated { digest, .. } | Self::Proposed { digest, .. } => *digest,
        }
    }

    /// Nonce of the attempt.
    #[must_use]
    pub fn nonce(&self) -> U256 {
        match self {
            Self::Simulated { nonce, .. } | Self::Proposed { nonce, .. } => *nonce,
        }
    }

    /// Simulation outcome, if this was a simulated attempt.
    #[must_use]
    pub fn outcome(&self) -> Option<&SimulationOutcome> {
        match self {
            Self::Simulated { outcome, .. } => Some(outcome),
            Self::Proposed { .. } => None,
        }
    }
}

/// Result of [`deploy`](crate::ports::OrchestratorApi::deploy).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeploymentReport {
    /// Address the deployment targets.
    pub expected: Address,
    /// Post-condition status.
    pub status: DeploymentStatus,
    /// The attempt, unless it was skipped.
    pub run: Option<RunResult>,
}
