//! # Service Layer
//!
//! Application services wiring the domain to the ports.
//!
//! | Service | Role |
//! |---------|------|
//! | [`Client`] | orchestrator, implements `OrchestratorApi` |
//! | [`ExecutionSimulator`] | local `execTransaction` with approval records |
//! | [`ProposalSubmitter`] | posts signed proposals |
//! | [`DeploymentVerifier`] | code presence before and after a deployment |
//! | [`TransactionSigner`] impls | local key, device, synthetic |

pub mod client;
pub mod signer;
pub mod simulator;
pub mod submitter;
pub mod verifier;

pub use client::{Client, Instance};
pub use signer::{DeviceSigner, LocalKeySigner, SyntheticSigner, TransactionSigner};
pub use simulator::{approval_owners, encode_exec_transaction, ExecutionSimulator};
pub use submitter::{proposal_url, ProposalRequest, ProposalSubmitter, PROPOSAL_ORIGIN};
pub use verifier::DeploymentVerifier;
