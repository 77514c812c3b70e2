//! # Driving Ports (API - Inbound)
//!
//! The orchestration API tooling code programs against.

use crate::domain::entities::{
    DeploymentReport, RunMode, RunResult, SafeAccount, SignerSet, TransactionRequest,
};
use crate::errors::Result;
use async_trait::async_trait;
use cosigner_types::{Address, Bytes, Operation, U256};

/// Uniform entry point for both run modes.
///
/// Operations act on the most recently initialized account. Calls must not
/// overlap: every attempt reads and mutates shared account state.
#[async_trait]
pub trait OrchestratorApi: Send + Sync {
    /// Binds a new account on top of the instance stack.
    fn init(&mut self, account: SafeAccount, signers: SignerSet);

    /// The active account, if any.
    fn current_account(&self) -> Option<SafeAccount>;

    /// Resolves the run mode; detected once, then cached.
    fn mode(&self) -> Result<RunMode>;

    /// Runs one attempt of `request` in the active mode.
    async fn run(&mut self, request: TransactionRequest) -> Result<RunResult>;

    /// Runs a single call.
    async fn propose_transaction(
        &mut self,
        to: Address,
        value: U256,
        data: Bytes,
        operation: Operation,
    ) -> Result<RunResult> {
        self.run(TransactionRequest::Single {
            to,
            value,
            data,
            operation,
        })
        .await
    }

    /// Runs a batch given as parallel target and data lists.
    async fn propose_transactions(
        &mut self,
        targets: Vec<Address>,
        payloads: Vec<Bytes>,
    ) -> Result<RunResult>;

    /// Runs `request` unless code already exists at `expected`, then checks
    /// that the simulated execution produced code there.
    async fn deploy(
        &mut self,
        expected: Address,
        request: TransactionRequest,
    ) -> Result<DeploymentReport>;
}
