//! # Cosigner Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures/         # Account emulator, target contracts, device and service stand-ins
//! │   ├── safe.rs
//! │   ├── contracts.rs
//! │   ├── device.rs
//! │   └── transport.rs
//! │
//! └── integration/      # End-to-end flows through the client
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p cosigner-tests
//!
//! # By category
//! cargo test -p cosigner-tests integration::simulation_flows::
//! cargo test -p cosigner-tests integration::proposal_flows::
//!
//! # Benchmarks
//! cargo bench -p cosigner-tests
//! ```

#![allow(clippy::missing_panics_doc)]

pub mod integration;
