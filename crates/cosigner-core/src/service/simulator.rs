//! # Execution Simulator
//!
//! Drives the account's `execTransaction` against a local state snapshot.
//!
//! ## Procedure
//!
//! 1. Log any deterministic-deployment factory calls (direct or batched).
//! 2. Write an approval record for every `v = 1` signature presented.
//! 3. Call `execTransaction` as the presenting signer.
//! 4. Clear the approval records.
//! 5. Classify the result as success, revert or verifier rejection.
//!
//! With the debug bypass, a plain `Call` skips the account and is sent to
//! the target directly as the account, exposing the unwrapped revert reason.

use crate::domain::abi::{
    decode, encode_call, ParamKind, Token, EXEC_TRANSACTION_SELECTOR, MULTI_SEND_SELECTOR,
};
use crate::domain::batch::decode_batch;
use crate::domain::deploy::{is_factory, FactoryCall};
use crate::domain::digest::transaction_digest;
use crate::domain::entities::{SafeAccount, SimulationOutcome};
use crate::domain::revert::RevertReason;
use crate::errors::Result;
use crate::ports::outbound::{CallOutcome, CallRequest, ChainHost};
use cosigner_types::{Address, Bytes, EcdsaSignature, Hash, Operation, SafeTransaction, U256, SIGNATURE_LENGTH};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// `execTransaction` call data with zeroed gas parameters.
#[must_use]
pub fn encode_exec_transaction(tx: &SafeTransaction, signatures: &Bytes) -> Bytes {
    Bytes::from(encode_call(
        EXEC_TRANSACTION_SELECTOR,
        &[
            Token::Address(tx.to),
            Token::Uint(tx.value),
            Token::Bytes(tx.data.as_slice().to_vec()),
            Token::Uint(U256::from(tx.operation.as_u8())),
            Token::Uint(U256::zero()),
            Token::Uint(U256::zero()),
            Token::Uint(U256::zero()),
            Token::Address(Address::ZERO),
            Token::Address(Address::ZERO),
            Token::Bytes(signatures.as_slice().to_vec()),
        ],
    ))
}

/// Owners whose approval records a signature blob relies on.
#[must_use]
pub fn approval_owners(signatures: &Bytes) -> Vec<Address> {
    signatures
        .as_slice()
        .chunks_exact(SIGNATURE_LENGTH)
        .filter_map(|chunk| EcdsaSignature::from_slice(chunk).ok())
        .filter_map(|sig| sig.approved_owner())
        .collect()
}

/// Runs transactions against a local account snapshot.
pub struct ExecutionSimulator<H: ChainHost + ?Sized> {
    host: Arc<H>,
}

impl<H: ChainHost + ?Sized> ExecutionSimulator<H> {
    /// Create a simulator over `host`.
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    /// Simulates `tx` on `account` with the given signature blob, called by
    /// `caller`.
    #[instrument(skip_all, fields(account = %account, nonce = %tx.nonce, caller = %caller))]
    pub async fn simulate(
        &self,
        account: &SafeAccount,
        tx: &SafeTransaction,
        signatures: &Bytes,
        caller: Address,
        debug_bypass: bool,
    ) -> Result<SimulationOutcome> {
        log_deployments(tx);

        if debug_bypass {
            if tx.operation == Operation::Call {
                return self.bypass(account, tx).await;
            }
            warn!("debug bypass ignored: delegate calls cannot run outside the account");
        }

        let digest = transaction_digest(account, tx);
        let owners = approval_owners(signatures);
        let mut written = Vec::with_capacity(owners.len());
        for owner in owners {
            if let Err(error) = self.host.write_approval(account.address, digest, owner).await {
                warn!(%owner, %error, "approval record not written, rolling back");
                // Clear failures are logged there; the write failure is reported.
                let _ = self.clear_approvals(account.address, digest, &written).await;
                return Err(error.into());
            }
            written.push(owner);
        }
        debug!(%digest, approvals = written.len(), "approval records written");

        let call = self
            .host
            .call_as(CallRequest {
                caller,
                to: account.address,
                value: U256::zero(),
                data: encode_exec_transaction(tx, signatures),
            })
            .await;

        self.clear_approvals(account.address, digest, &written).await?;

        let outcome = classify(call?);
        match &outcome {
            SimulationOutcome::Success { .. } => info!(%digest, "simulated execution succeeded"),
            SimulationOutcome::Reverted { reason } => {
                warn!(%digest, %reason, hint = reason.hint(), "simulated execution failed");
            }
            SimulationOutcome::VerifierRejected { code } => {
                warn!(%digest, code, "account rejected the signatures");
            }
        }
        Ok(outcome)
    }

    /// Clears every record in `owners`, even past a failure; the first
    /// failure is returned.
    async fn clear_approvals(&self, account: Address, digest: Hash, owners: &[Address]) -> Result<()> {
        let mut first_error = None;
        for owner in owners {
            if let Err(error) = self.host.clear_approval(account, digest, *owner).await {
                warn!(%owner, %error, "approval record not cleared");
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), |error| Err(error.into()))
    }

    async fn bypass(&self, account: &SafeAccount, tx: &SafeTransaction) -> Result<SimulationOutcome> {
        info!(target_address = %tx.to, "debug bypass: calling target as the account");
        let outcome = self
            .host
            .call_as(CallRequest {
                caller: account.address,
                to: tx.to,
                value: tx.value,
                data: tx.data.clone(),
            })
            .await?;
        Ok(match outcome {
            CallOutcome::Returned(return_data) => SimulationOutcome::Success { return_data },
            CallOutcome::Reverted(data) => {
                let reason = RevertReason::decode(data.as_slice());
                warn!(%reason, "target reverted");
                SimulationOutcome::Reverted { reason }
            }
        })
    }
}

fn classify(outcome: CallOutcome) -> SimulationOutcome {
    match outcome {
        CallOutcome::Returned(return_data) => {
            match decode(&[ParamKind::Bool], return_data.as_slice())
                .ok()
                .and_then(|mut tokens| tokens.pop())
                .and_then(Token::into_bool)
            {
                Some(false) => SimulationOutcome::Reverted {
                    reason: RevertReason::ReturnedFalse,
                },
                _ => SimulationOutcome::Success { return_data },
            }
        }
        CallOutcome::Reverted(data) => {
            let reason = RevertReason::decode(data.as_slice());
            match reason.verifier_rejection() {
                Some(code) => SimulationOutcome::VerifierRejected {
                    code: code.to_string(),
                },
                None => SimulationOutcome::Reverted { reason },
            }
        }
    }
}

fn log_deployments(tx: &SafeTransaction) {
    if is_factory(tx.to) {
        log_factory_call(tx.data.as_slice());
        return;
    }
    if tx.operation == Operation::DelegateCall && tx.data.selector() == Some(MULTI_SEND_SELECTOR) {
        if let Ok(calls) = decode_batch(tx.data.as_slice()) {
            for call in calls.iter().filter(|c| is_factory(c.to)) {
                log_factory_call(call.data.as_slice());
            }
        }
    }
}

fn log_factory_call(data: &[u8]) {
    match FactoryCall::parse(data) {
        Some(call) => info!(
            selector = %hex::encode(call.selector()),
            salt = %call.salt,
            predicted = %call.predicted_address(),
            "deterministic deployment call"
        ),
        None => warn!(len = data.len(), "factory call shorter than a salt"),
    }
}

// =============================================================================
// TESTS
// =============================================================================
