//! Nullable infrastructure for deterministic wallet testing.
//!
//! Inspired by the "A-frame architecture" pattern: every external dependency
//! of the wallet engine (ledger, faucet, clock) sits behind a trait, and this
//! crate provides in-memory implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the network
//!
//! Usage: build a [`NullLedgerNetwork`], hand it (and a [`NullFaucet`] over
//! it) to the engine in place of Horizon and Friendbot.

pub mod clock;
pub mod faucet;
pub mod ledger;

pub use clock::NullClock;
pub use faucet::NullFaucet;
pub use ledger::{NullLedger, NullLedgerNetwork, SubmissionRecord};
