//! # End-to-End Flows
//!
//! | Module | Covers |
//! |--------|--------|
//! | `simulation_flows` | synthetic approvals, verifier rejection, revert decoding, batches |
//! | `proposal_flows` | real signatures, request bodies, rejection and nonce accounting |
//! | `deployment_flows` | skip-if-deployed, post-execution verification |
//! | `account_emulation` | the emulator accepts what the engine produces |
//! | `properties` | digest golden value, duplicate signers, digest binding |

pub mod properties;
pub mod proposal_flows;
pub mod simulation_flows;
