//! Shared utilities for the Stellar wallet engine.

pub mod logging;

pub use logging::{init_logging, LogFormat};
