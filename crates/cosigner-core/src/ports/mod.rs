//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions between the orchestration logic and the outside world.
//!
//! - **Driving Ports (Inbound)**: [`OrchestratorApi`]
//! - **Driven Ports (Outbound)**: [`StateStore`], [`CallHost`], [`ExternalSigner`],
//!   [`ProposalTransport`], [`ModeProbe`]

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
