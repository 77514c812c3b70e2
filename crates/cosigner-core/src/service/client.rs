//! # Orchestrator Client
//!
//! Single entry point for tooling code. Resolves the run mode once, builds
//! the account transaction (batching through the executor when needed),
//! then either simulates it with synthetic approvals or signs and proposes
//! it to the coordination service.
//!
//! ## Instance stack
//!
//! `init` pushes a new [`Instance`]; every operation acts on the top one.
//! Nothing pops the stack.
//!
//! ## Nonces
//!
//! | Mode | Nonce used |
//! |------|------------|
//! | Simulation | on-chain nonce, read fresh per attempt |
//! | Proposal | on-chain nonce + instance attempt counter |
//!
//! The attempt counter increments after every attempt, whatever its outcome.

use super::signer::{SyntheticSigner, TransactionSigner};
use super::simulator::ExecutionSimulator;
use super::submitter::{proposal_url, ProposalRequest, ProposalSubmitter};
use super::verifier::DeploymentVerifier;
use crate::adapters::ModeDetector;
use crate::config::{ChainRegistry, RunToggles};
use crate::domain::batch::{encode_calls, zip_calls};
use crate::domain::digest::transaction_digest;
use crate::domain::entities::{
    DeploymentReport, DeploymentStatus, RunMode, RunResult, SafeAccount, SignerSet,
    TransactionRequest,
};
use crate::domain::signature::{aggregate, recover_owner};
use crate::errors::{OrchestratorError, Result, SignatureError, SigningError};
use crate::ports::inbound::OrchestratorApi;
use crate::ports::outbound::{ChainHost, ProposalTransport};
use async_trait::async_trait;
use cosigner_types::{Address, Bytes, Hash, SafeTransaction, U256};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, info_span, instrument, warn, Instrument};
use uuid::Uuid;

/// One account binding with its run-local state.
#[derive(Clone, Debug)]
pub struct Instance {
    account: SafeAccount,
    signers: SignerSet,
    attempts: u64,
    pending_request: Option<ProposalRequest>,
}

impl Instance {
    fn new(account: SafeAccount, signers: SignerSet) -> Self {
        Self {
            account,
            signers,
            attempts: 0,
            pending_request: None,
        }
    }

    /// Bound account.
    #[must_use]
    pub fn account(&self) -> SafeAccount {
        self.account
    }

    /// Configured signers.
    #[must_use]
    pub fn signers(&self) -> &SignerSet {
        &self.signers
    }

    /// Attempts made on this instance.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Last proposal body built, kept for diagnostics.
    #[must_use]
    pub fn pending_request(&self) -> Option<&ProposalRequest> {
        self.pending_request.as_ref()
    }
}

/// The orchestrator.
pub struct Client<H: ChainHost + ?Sized, T: ProposalTransport + ?Sized> {
    /// Per-network service URLs and batch executors.
    registry: ChainRegistry,
    /// Chain state.
    host: Arc<H>,
    simulator: ExecutionSimulator<H>,
    submitter: ProposalSubmitter<T>,
    verifier: DeploymentVerifier<H>,
    /// Signer used for proposals.
    signer: Box<dyn TransactionSigner>,
    detector: ModeDetector,
    toggles: RunToggles,
    /// Detected once, then reused.
    mode: Mutex<Option<RunMode>>,
    /// Push-only instance stack.
    stack: Vec<Instance>,
}

impl<H: ChainHost + ?Sized, T: ProposalTransport + ?Sized> Client<H, T> {
    /// Client with built-in networks and toggles read from the environment.
    pub fn new(host: Arc<H>, transport: Arc<T>, signer: Box<dyn TransactionSigner>) -> Self {
        let toggles = RunToggles::from_env();
        Self {
            registry: ChainRegistry::default(),
            simulator: ExecutionSimulator::new(Arc::clone(&host)),
            submitter: ProposalSubmitter::new(transport),
            verifier: DeploymentVerifier::new(Arc::clone(&host)),
            host,
            signer,
            detector: ModeDetector::from_toggles(&toggles),
            toggles,
            mode: Mutex::new(None),
            stack: Vec::new(),
        }
    }

    /// Replaces the chain registry.
    #[must_use]
    pub fn with_registry(mut self, registry: ChainRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replaces the run toggles and rebuilds the mode detector from them.
    #[must_use]
    pub fn with_toggles(mut self, toggles: RunToggles) -> Self {
        self.detector = ModeDetector::from_toggles(&toggles);
        self.toggles = toggles;
        *self.mode.get_mut() = None;
        self
    }

    /// Replaces the mode detector.
    #[must_use]
    pub fn with_detector(mut self, detector: ModeDetector) -> Self {
        self.detector = detector;
        *self.mode.get_mut() = None;
        self
    }

    /// Chain registry in use.
    #[must_use]
    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    /// Top of the instance stack.
    #[must_use]
    pub fn instance(&self) -> Option<&Instance> {
        self.stack.last()
    }

    /// Number of instances pushed so far.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn top(&self) -> Result<&Instance> {
        self.stack.last().ok_or(OrchestratorError::NoInstance)
    }

    fn build_transaction(
        &self,
        account: &SafeAccount,
        request: TransactionRequest,
        nonce: U256,
    ) -> Result<SafeTransaction> {
        match request {
            TransactionRequest::Single {
                to,
                value,
                data,
                operation,
            } => Ok(SafeTransaction {
                to,
                value,
                data,
                operation,
                nonce,
            }),
            TransactionRequest::Batch(calls) => {
                let executor = self.registry.multisend(account.chain_id)?;
                debug!(%executor, calls = calls.len(), "encoding batch");
                Ok(encode_calls(executor, &calls).to_transaction(nonce))
            }
        }
    }

    async fn attempt(&mut self, request: TransactionRequest) -> Result<RunResult> {
        let mode = self.mode()?;
        let (account, signers, attempts) = {
            let top = self.top()?;
            (top.account, top.signers.clone(), top.attempts)
        };

        debug!(targets = ?request.targets(), attempts, "attempt requested");
        // Configuration errors must not consume a proposal nonce.
        let url = match mode {
            RunMode::Simulation => None,
            RunMode::Proposal => Some(proposal_url(
                self.registry.service_url(account.chain_id)?,
                &account,
            )),
        };
        let on_chain = self.host.account_nonce(account.address).await?;
        let nonce = match mode {
            RunMode::Simulation => on_chain,
            RunMode::Proposal => on_chain.saturating_add(U256::from(attempts)),
        };
        let tx = self.build_transaction(&account, request, nonce)?;
        let digest = transaction_digest(&account, &tx);
        info!(%account, %mode, %nonce, %digest, operation = ?tx.operation, "transaction built");

        let result = match url {
            None => self.simulate(&account, &signers, &tx, digest).await,
            Some(url) => self.propose(&url, &account, &signers, &tx, digest).await,
        };

        if let Some(top) = self.stack.last_mut() {
            top.attempts += 1;
        }
        result
    }

    async fn simulate(
        &self,
        account: &SafeAccount,
        signers: &SignerSet,
        tx: &SafeTransaction,
        digest: Hash,
    ) -> Result<RunResult> {
        let threshold = self.host.threshold(account.address).await?;
        if U256::from(signers.len()) < threshold {
            warn!(signers = signers.len(), %threshold, "fewer signers than the account threshold");
        }
        let synthetic = SyntheticSigner;
        let mut signatures = Vec::with_capacity(signers.len());
        for signer in signers.as_slice() {
            signatures.push((*signer, synthetic.sign(account, tx, *signer).await?));
        }
        let blob = aggregate(signatures)?;

        let outcome = self
            .simulator
            .simulate(account, tx, &blob, signers.primary(), self.toggles.debug_bypass)
            .await?;
        Ok(RunResult::Simulated {
            digest,
            nonce: tx.nonce,
            outcome,
        })
    }

    async fn propose(
        &mut self,
        url: &str,
        account: &SafeAccount,
        signers: &SignerSet,
        tx: &SafeTransaction,
        digest: Hash,
    ) -> Result<RunResult> {
        if self.signer.is_synthetic() {
            return Err(SigningError::UnsupportedStrategy {
                strategy: self.signer.strategy(),
                purpose: "proposal",
            }
            .into());
        }
        let sender = signers.primary();
        info!(%sender, strategy = self.signer.strategy(), "requesting signature");
        let signature = self.signer.sign(account, tx, sender).await?;
        let recovered = recover_owner(digest, &signature)?;
        if recovered != sender {
            return Err(SignatureError::SignerMismatch {
                expected: sender,
                actual: recovered,
            }
            .into());
        }

        let request = ProposalRequest::new(tx, digest, sender, &signature);
        if let Some(top) = self.stack.last_mut() {
            top.pending_request = Some(request.clone());
        }
        self.submitter.submit(url, &request).await?;
        Ok(RunResult::Proposed {
            digest,
            nonce: tx.nonce,
            sender,
        })
    }
}

#[async_trait]
impl<H, T> OrchestratorApi for Client<H, T>
where
    H: ChainHost + ?Sized,
    T: ProposalTransport + ?Sized,
{
    fn init(&mut self, account: SafeAccount, signers: SignerSet) {
        info!(%account, signers = signers.len(), depth = self.stack.len() + 1, "account bound");
        self.stack.push(Instance::new(account, signers));
    }

    fn current_account(&self) -> Option<SafeAccount> {
        self.stack.last().map(Instance::account)
    }

    fn mode(&self) -> Result<RunMode> {
        let mut cached = self.mode.lock();
        if let Some(mode) = *cached {
            return Ok(mode);
        }
        let mode = self.detector.detect()?;
        *cached = Some(mode);
        Ok(mode)
    }

    async fn run(&mut self, request: TransactionRequest) -> Result<RunResult> {
        let run_id = Uuid::new_v4();
        self.attempt(request)
            .instrument(info_span!("run", %run_id))
            .await
    }

    async fn propose_transactions(
        &mut self,
        targets: Vec<Address>,
        payloads: Vec<Bytes>,
    ) -> Result<RunResult> {
        let calls = zip_calls(&targets, &payloads)?;
        self.run(TransactionRequest::Batch(calls)).await
    }

    #[instrument(skip_all, fields(expected = %expected))]
    async fn deploy(
        &mut self,
        expected: Address,
        request: TransactionRequest,
    ) -> Result<DeploymentReport> {
        self.top()?;
        if let Some(status) = self.verifier.precheck(expected).await? {
            return Ok(DeploymentReport {
                expected,
                status,
                run: None,
            });
        }

        let run = self.run(request).await?;
        let status = match run.outcome() {
            Some(outcome) if outcome.is_success() => {
                self.verifier.confirm(expected, run.digest()).await?
            }
            Some(_) => {
                warn!("simulation did not succeed, deployment not checked");
                DeploymentStatus::Unconfirmed
            }
            None => DeploymentStatus::Unconfirmed,
        };
        Ok(DeploymentReport {
            expected,
            status,
            run: Some(run),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
