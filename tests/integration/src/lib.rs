//! Integration test utilities for the rank bot
//!
//! In-memory implementations of every port, a harness that wires them into
//! a `ServiceContext`, and a helper that serves the gateway router on an
//! ephemeral port.

pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
