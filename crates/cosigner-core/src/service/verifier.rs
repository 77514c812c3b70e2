//! # Deployment Verifier
//!
//! Idempotent deployments: skip when code already exists at the expected
//! address, and after a successful execution require that code appeared.

use crate::domain::entities::DeploymentStatus;
use crate::errors::{OrchestratorError, Result};
use crate::ports::outbound::StateStore;
use cosigner_types::{Address, Hash};
use std::sync::Arc;
use tracing::{error, info};

/// Checks code presence at expected deployment addresses.
pub struct DeploymentVerifier<S: StateStore + ?Sized> {
    state: Arc<S>,
}

impl<S: StateStore + ?Sized> DeploymentVerifier<S> {
    /// Create a verifier over `state`.
    pub fn new(state: Arc<S>) -> Self {
        Self { state }
    }

    /// `Some(Skipped)` if `expected` already has code.
    pub async fn precheck(&self, expected: Address) -> Result<Option<DeploymentStatus>> {
        let code = self.state.code(expected).await?;
        if code.is_empty() {
            return Ok(None);
        }
        info!(%expected, code_len = code.len(), "code already deployed, skipping");
        Ok(Some(DeploymentStatus::Skipped {
            code_len: code.len(),
        }))
    }

    /// Requires code at `expected` after transaction `digest` succeeded.
    pub async fn confirm(&self, expected: Address, digest: Hash) -> Result<DeploymentStatus> {
        let code = self.state.code(expected).await?;
        if code.is_empty() {
            error!(%expected, %digest, "no code after successful execution");
            return Err(OrchestratorError::VerificationFailed { expected, digest });
        }
        info!(%expected, code_len = code.len(), "deployment verified");
        Ok(DeploymentStatus::Verified {
            code_len: code.len(),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
