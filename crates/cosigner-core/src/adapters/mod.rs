//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the driven ports.
//!
//! | Adapter | Port |
//! |---------|------|
//! | [`InMemoryChain`] | `StateStore` + `CallHost` |
//! | [`ReqwestTransport`] | `ProposalTransport` |
//! | [`ProcessSigner`] | `ExternalSigner` |
//! | [`NativeDetector`], [`EnvOverrideDetector`] | `ModeProbe` |

pub mod device;
pub mod http;
pub mod in_memory;
pub mod mode;

pub use device::ProcessSigner;
pub use http::ReqwestTransport;
pub use in_memory::{ContractHandler, InMemoryChain};
pub use mode::{EnvOverrideDetector, ModeDetector, NativeDetector};
