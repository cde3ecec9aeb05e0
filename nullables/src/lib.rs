//! Nullable infrastructure for deterministic testing.
//!
//! The registry never reads ambient time or talks to a real ledger; both are
//! passed in. This crate provides stand-ins that return deterministic values
//! and can be steered programmatically from tests and the scenario runner.

pub mod clock;
pub mod custody;

pub use clock::NullClock;
pub use custody::NullCustody;
